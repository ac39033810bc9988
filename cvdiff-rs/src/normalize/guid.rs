//! Masking of GUID-valued `Value` elements.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{GUID_PATTERN, GUID_PLACEHOLDER, VALUE_TAG};
use crate::node::{NodeInner, NodeRef, XmlContent};

static GUID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(GUID_PATTERN).expect("GUID pattern is a valid regex"));

/// Returns true if `text`, trimmed, is exactly one canonical UUID.
pub fn is_guid(text: &str) -> bool {
    GUID_REGEX.is_match(text.trim())
}

/// Replaces the leading text of every GUID-valued `Value` element with
/// [`GUID_PLACEHOLDER`]. Returns the number of elements masked.
pub fn mask_guid_values(root: &NodeRef) -> usize {
    let mut masked = 0;
    NodeInner::walk_ref(root, &mut |node| {
        let text_node = {
            let borrowed = node.borrow();
            if borrowed.tag() != Some(VALUE_TAG) {
                return;
            }
            match borrowed.child(0) {
                Some(child) => child.clone(),
                None => return,
            }
        };

        let mut text_node = text_node.borrow_mut();
        if let Some(text) = text_node.content_mut().and_then(XmlContent::as_text_mut) {
            if is_guid(text.text()) {
                text.set_text(GUID_PLACEHOLDER);
                masked += 1;
            }
        }
    });
    masked
}
