//! XML printer that outputs node trees.
//!
//! The compact form writes the tree back exactly, text included, and is what
//! the normalizer compares. Pretty printing indents one element or text run per
//! line and leaves out whitespace-only text.

use std::io::Write;

use crate::constants::ROOT_TAG;
use crate::node::{NodeRef, XmlContent, XmlElement};

/// Options for XML printing.
#[derive(Debug, Clone, Default)]
pub struct XmlPrinterOptions {
    /// Whether to pretty-print with indentation.
    pub pretty_print: bool,
    /// Whether to emit the `<?xml ...?>` declaration.
    pub declaration: bool,
}

/// XML printer that outputs node trees.
pub struct XmlPrinter<W: Write> {
    writer: W,
    options: XmlPrinterOptions,
}

impl<W: Write> XmlPrinter<W> {
    /// Creates a new compact XML printer.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, XmlPrinterOptions::default())
    }

    /// Creates a new XML printer with the given options.
    pub fn with_options(writer: W, options: XmlPrinterOptions) -> Self {
        XmlPrinter { writer, options }
    }

    /// Prints a node tree to the output.
    ///
    /// A `$ROOT$` node is transparent: only its children are printed.
    pub fn print(&mut self, root: &NodeRef) -> std::io::Result<()> {
        if self.options.declaration {
            write!(self.writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
            self.newline()?;
        }
        self.print_node(root, 0)?;
        self.writer.flush()
    }

    fn print_node(&mut self, node: &NodeRef, depth: usize) -> std::io::Result<()> {
        let borrowed = node.borrow();

        match borrowed.content() {
            Some(XmlContent::Text(text)) if self.options.pretty_print => {
                if !text.is_blank() {
                    self.indent(depth)?;
                    write!(self.writer, "{}", escape_text(text.text().trim()))?;
                    self.newline()?;
                }
            }
            Some(XmlContent::Text(text)) => {
                write!(self.writer, "{}", escape_text(text.text()))?;
            }
            Some(XmlContent::Element(element)) if element.qname() == ROOT_TAG => {
                for child in borrowed.children() {
                    self.print_node(child, depth)?;
                }
            }
            Some(XmlContent::Element(element)) => {
                self.indent(depth)?;
                self.open_tag(element)?;
                if borrowed.child_count() == 0 {
                    write!(self.writer, " />")?;
                    self.newline()?;
                } else {
                    write!(self.writer, ">")?;
                    self.newline()?;
                    for child in borrowed.children() {
                        self.print_node(child, depth + 1)?;
                    }
                    self.indent(depth)?;
                    write!(self.writer, "</{}>", element.qname())?;
                    self.newline()?;
                }
            }
            None => {}
        }

        Ok(())
    }

    fn open_tag(&mut self, element: &XmlElement) -> std::io::Result<()> {
        write!(self.writer, "<{}", element.qname())?;
        for (name, value) in element.attributes() {
            write!(self.writer, " {}=\"{}\"", name, escape_attribute(value))?;
        }
        Ok(())
    }

    fn indent(&mut self, depth: usize) -> std::io::Result<()> {
        if self.options.pretty_print {
            write!(self.writer, "{}", "  ".repeat(depth))?;
        }
        Ok(())
    }

    fn newline(&mut self) -> std::io::Result<()> {
        if self.options.pretty_print {
            writeln!(self.writer)?;
        }
        Ok(())
    }
}

/// Escapes markup characters in text content.
fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escapes an attribute value for a double-quoted attribute.
///
/// Line breaks and tabs are written as character references so they survive
/// a re-parse.
fn escape_attribute(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\n' => result.push_str("&#10;"),
            '\r' => result.push_str("&#13;"),
            '\t' => result.push_str("&#09;"),
            _ => result.push(c),
        }
    }
    result
}

/// Prints a node tree to a compact string.
pub fn print_to_string(root: &NodeRef) -> std::io::Result<String> {
    print_with_options(root, XmlPrinterOptions::default())
}

/// Prints a node tree to a string with declaration and indentation.
pub fn print_to_string_pretty(root: &NodeRef) -> std::io::Result<String> {
    print_with_options(
        root,
        XmlPrinterOptions {
            pretty_print: true,
            declaration: true,
        },
    )
}

fn print_with_options(root: &NodeRef, options: XmlPrinterOptions) -> std::io::Result<String> {
    let mut output = Vec::new();
    XmlPrinter::with_options(&mut output, options).print(root)?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}
