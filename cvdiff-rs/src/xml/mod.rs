//! XML parsing and output.

mod parser;
mod printer;

pub use parser::{parse_document_element, parse_file, parse_str, XmlParser};
pub use printer::{print_to_string, print_to_string_pretty, XmlPrinter, XmlPrinterOptions};
