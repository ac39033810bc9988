//! XML parser that builds node trees.
//!
//! This parser uses quick-xml's streaming API. Text is kept verbatim,
//! including whitespace-only runs between elements; adjacent text, CDATA and
//! references merge into one text node. Comments, processing instructions, the
//! document type and anything outside the document element are dropped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::node::{
    new_document_root, new_node, NodeInner, NodeRef, XmlContent, XmlElement, XmlText,
};

/// XML parser that builds node trees under a synthetic `$ROOT$` node.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlParser;

impl XmlParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        XmlParser
    }

    /// Parses XML from a string.
    pub fn parse_str(&self, xml: &str) -> Result<NodeRef> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        self.parse_reader(&mut reader)
    }

    /// Parses XML from a file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<NodeRef> {
        let file = File::open(path)?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        self.parse_reader(&mut reader)
    }

    fn parse_reader<R: BufRead>(&self, reader: &mut Reader<R>) -> Result<NodeRef> {
        let mut builder = TreeBuilder::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let element = self.parse_element(e, reader)?;
                    builder.open(element);
                }
                Ok(Event::End(ref e)) => {
                    let name = reader
                        .decoder()
                        .decode(e.name().as_ref())
                        .map_err(|e| Error::Parse(e.to_string()))?
                        .to_string();
                    builder.close(&name)?;
                }
                Ok(Event::Empty(ref e)) => {
                    let element = self.parse_element(e, reader)?;
                    builder.open(element);
                    builder.close_current();
                }
                Ok(Event::Text(e)) => {
                    let raw =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    let text = unescape(raw).map_err(quick_xml::Error::from)?;
                    builder.text(&text);
                }
                Ok(Event::CData(ref e)) => {
                    let text =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    builder.text(text);
                }
                Ok(Event::GeneralRef(e)) => {
                    let name =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    builder.text(&resolve_reference(name)?);
                }
                Ok(Event::Eof) => break,
                Ok(Event::Comment(_)) | Ok(Event::Decl(_)) | Ok(Event::PI(_)) => {}
                Ok(Event::DocType(_)) => {}
                Err(e) => return Err(Error::Xml(e)),
            }
            buf.clear();
        }

        builder.finish()
    }

    /// Parses an element's name and attributes.
    fn parse_element<R: BufRead>(&self, e: &BytesStart, reader: &Reader<R>) -> Result<XmlElement> {
        let name = reader
            .decoder()
            .decode(e.name().as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();

        let mut attributes = Vec::new();
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(quick_xml::Error::from)?;
            let key = reader
                .decoder()
                .decode(attr.key.as_ref())
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            let raw = std::str::from_utf8(&attr.value).map_err(|e| Error::Parse(e.to_string()))?;
            let value = unescape(&normalize_attribute_whitespace(raw))
                .map_err(quick_xml::Error::from)?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(XmlElement::new(name, attributes))
    }
}

/// Replaces literal line breaks and tabs in a raw attribute value with spaces.
///
/// Character references such as `&#10;` are resolved afterwards and survive.
fn normalize_attribute_whitespace(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace(['\t', '\n', '\r'], " ")
}

/// Resolves `&name;` (predefined entity) or `&#...;` (character reference).
fn resolve_reference(name: &str) -> Result<String> {
    if let Some(value) = resolve_predefined_entity(name) {
        return Ok(value.to_string());
    }
    let code = if let Some(hex) = name.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    code.and_then(char::from_u32)
        .map(String::from)
        .ok_or_else(|| Error::Parse(format!("Unknown entity reference &{};", name)))
}

/// Accumulates parse events into a node tree.
struct TreeBuilder {
    root: NodeRef,
    stack: Vec<NodeRef>,
    pending_text: String,
}

impl TreeBuilder {
    fn new() -> Self {
        let root = new_document_root();
        TreeBuilder {
            stack: vec![root.clone()],
            root,
            pending_text: String::new(),
        }
    }

    fn text(&mut self, text: &str) {
        self.pending_text.push_str(text);
    }

    /// Attaches accumulated text to the current element.
    ///
    /// Text outside the document element is discarded.
    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);
        if self.stack.len() < 2 {
            return;
        }
        if let Some(parent) = self.stack.last() {
            let node = new_node(Some(XmlContent::Text(XmlText::new(text))));
            NodeInner::add_child_to_ref(parent, node);
        }
    }

    fn open(&mut self, element: XmlElement) {
        self.flush_text();
        let node = new_node(Some(XmlContent::Element(element)));
        if let Some(parent) = self.stack.last() {
            NodeInner::add_child_to_ref(parent, node.clone());
        }
        self.stack.push(node);
    }

    fn close_current(&mut self) {
        self.flush_text();
        self.stack.pop();
    }

    fn close(&mut self, name: &str) -> Result<()> {
        let open = match self.stack.last() {
            Some(node) if self.stack.len() > 1 => node.borrow().tag().map(str::to_string),
            _ => None,
        };
        match open {
            Some(open) if open == name => {
                self.close_current();
                Ok(())
            }
            Some(open) => Err(Error::Parse(format!(
                "Mismatched end tag: expected </{}>, found </{}>",
                open, name
            ))),
            None => Err(Error::Parse(format!("Unexpected end tag </{}>", name))),
        }
    }

    fn finish(mut self) -> Result<NodeRef> {
        self.flush_text();
        if self.stack.len() > 1 {
            let open = self
                .stack
                .last()
                .and_then(|node| node.borrow().tag().map(str::to_string))
                .unwrap_or_default();
            return Err(Error::Parse(format!("Unclosed element <{}>", open)));
        }
        Ok(self.root)
    }
}

/// Parses XML from a file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<NodeRef> {
    XmlParser::new().parse_file(path)
}

/// Parses XML from a string.
pub fn parse_str(xml: &str) -> Result<NodeRef> {
    XmlParser::new().parse_str(xml)
}

/// Parses a document and returns its document element.
pub fn parse_document_element<P: AsRef<Path>>(path: P) -> Result<NodeRef> {
    let root = parse_file(path)?;
    NodeInner::document_element_of_ref(&root)
        .ok_or_else(|| Error::Parse("Document has no root element".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_element(xml: &str) -> NodeRef {
        let root = parse_str(xml).unwrap();
        NodeInner::document_element_of_ref(&root).unwrap()
    }

    #[test]
    fn test_parse_simple_xml() {
        let root = parse_str(r#"<root><child>text</child></root>"#).unwrap();

        let root_borrowed = root.borrow();
        assert_eq!(root_borrowed.child_count(), 1);
        assert_eq!(root_borrowed.tag(), Some("$ROOT$"));

        let root_elem = root_borrowed.children()[0].clone();
        assert_eq!(root_elem.borrow().tag(), Some("root"));
    }

    #[test]
    fn test_parse_with_attributes() {
        let elem = document_element(r#"<root id="foo" class="a &amp; b">content</root>"#);
        let borrowed = elem.borrow();
        let element = borrowed.content().and_then(XmlContent::as_element).unwrap();
        assert_eq!(element.attribute("id"), Some("foo"));
        assert_eq!(element.attribute("class"), Some("a & b"));
    }

    #[test]
    fn test_attribute_order_kept() {
        let elem = document_element(r#"<root z="1" a="2" m="3"/>"#);
        let borrowed = elem.borrow();
        let element = borrowed.content().and_then(XmlContent::as_element).unwrap();
        let names: Vec<&str> = element.attributes().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_attribute_line_breaks_become_spaces() {
        let elem = document_element("<root a=\"x\ny\tz\" b=\"p&#10;q\"/>");
        let borrowed = elem.borrow();
        let element = borrowed.content().and_then(XmlContent::as_element).unwrap();
        assert_eq!(element.attribute("a"), Some("x y z"));
        assert_eq!(element.attribute("b"), Some("p\nq"));
    }

    #[test]
    fn test_text_kept_verbatim() {
        let elem = document_element("<root>  hello \n\t  world  </root>");
        assert_eq!(elem.borrow().child_count(), 1);
        assert_eq!(
            elem.borrow().leading_text().as_deref(),
            Some("  hello \n\t  world  ")
        );
    }

    #[test]
    fn test_whitespace_only_text_kept() {
        let elem = document_element("<root>\n  <a/>\n  <b/>\n</root>");
        let borrowed = elem.borrow();
        assert_eq!(borrowed.child_count(), 5);
        assert_eq!(borrowed.leading_text().as_deref(), Some("\n  "));
        assert_eq!(borrowed.child(1).unwrap().borrow().tag(), Some("a"));
    }

    #[test]
    fn test_text_outside_document_element_dropped() {
        let root = parse_str("\n<root/>\n").unwrap();
        assert_eq!(root.borrow().child_count(), 1);
    }

    #[test]
    fn test_entity_and_char_references() {
        let elem = document_element("<root>a &amp; b &#65;&#x42; &lt;c&gt;</root>");
        assert_eq!(elem.borrow().leading_text().as_deref(), Some("a & b AB <c>"));
    }

    #[test]
    fn test_cdata_is_text() {
        let elem = document_element("<root>a<![CDATA[ x < y ]]></root>");
        assert_eq!(elem.borrow().child_count(), 1);
        assert_eq!(elem.borrow().leading_text().as_deref(), Some("a x < y "));
    }

    #[test]
    fn test_comments_and_declaration_ignored() {
        let elem =
            document_element("<?xml version=\"1.0\"?><!-- generated --><root><!-- c -->t</root>");
        assert_eq!(elem.borrow().child_count(), 1);
        assert_eq!(elem.borrow().leading_text().as_deref(), Some("t"));
    }

    #[test]
    fn test_text_around_comment_merges() {
        let elem = document_element("<root>a<!-- c -->b</root>");
        assert_eq!(elem.borrow().child_count(), 1);
        assert_eq!(elem.borrow().leading_text().as_deref(), Some("ab"));
    }

    #[test]
    fn test_empty_element() {
        let elem = document_element(r#"<root><empty /></root>"#);
        let borrowed = elem.borrow();
        assert_eq!(borrowed.child_count(), 1);
        let empty = borrowed.children()[0].borrow();
        assert_eq!(empty.tag(), Some("empty"));
        assert_eq!(empty.child_count(), 0);
    }

    #[test]
    fn test_mismatched_end_tag_is_error() {
        assert!(matches!(
            parse_str("<a><b></a>"),
            Err(Error::Xml(_) | Error::Parse(_))
        ));
    }

    #[test]
    fn test_unclosed_element_is_error() {
        assert!(matches!(
            parse_str("<a><b>text</b>"),
            Err(Error::Xml(_) | Error::Parse(_))
        ));
    }

    #[test]
    fn test_malformed_attribute_is_xml_error() {
        assert!(matches!(parse_str(r#"<a b="1" b="2"/>"#), Err(Error::Xml(_))));
    }

    #[test]
    fn test_no_document_element() {
        let root = parse_str("").unwrap();
        assert!(NodeInner::document_element_of_ref(&root).is_none());
    }
}
