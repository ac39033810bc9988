//! Semantic normalization of XML documents.
//!
//! Two snapshot files describe the same entity state when their canonical
//! strings are equal. The canonical string is produced by:
//!
//! 1. masking the text of `Value` elements that hold a bare GUID,
//! 2. rebuilding the tree without the subtrees a [`TreeFilter`] excludes
//!    (by default anything rooted at `Id` or `Link`),
//! 3. printing the result compactly and collapsing whitespace runs.
//!
//! Any parse failure makes a comparison [`Comparison::Different`].

mod filter;
mod guid;

pub use filter::{filter_tree, IgnoredTags, TagPredicate, TreeFilter};
pub use guid::{is_guid, mask_guid_values};

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::node::{NodeInner, NodeRef};
use crate::xml::{parse_file, parse_str, print_to_string, print_to_string_pretty};

/// Outcome of comparing two snapshot files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// Canonical strings are identical.
    Same,
    /// Canonical strings differ, or either side failed to parse.
    Different,
}

/// Compares the snapshot files of one entity.
pub trait Comparator {
    /// Compares an old and a new version of an entity file.
    fn compare(&self, old: &Path, new: &Path) -> Comparison;
}

/// Produces canonical comparison strings for XML documents.
#[derive(Debug, Clone)]
pub struct Normalizer<F: TreeFilter = IgnoredTags> {
    filter: F,
}

impl Normalizer {
    /// Creates a normalizer that drops `Id` and `Link` subtrees.
    pub fn new() -> Self {
        Self::with_filter(IgnoredTags::default())
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: TreeFilter> Normalizer<F> {
    /// Creates a normalizer with a custom subtree filter.
    pub fn with_filter(filter: F) -> Self {
        Normalizer { filter }
    }

    /// Masks GUIDs in place and returns a filtered copy of the tree.
    ///
    /// Fails if the document has no element, or its document element is
    /// itself excluded by the filter.
    pub fn normalize_tree(&self, root: &NodeRef) -> Result<NodeRef> {
        if NodeInner::document_element_of_ref(root).is_none() {
            return Err(Error::Parse("Document has no root element".to_string()));
        }
        let masked = mask_guid_values(root);
        if masked > 0 {
            debug!("Masked {} GUID value(s)", masked);
        }

        let filtered = filter_tree(root, &self.filter)
            .ok_or_else(|| Error::Parse("Document root was filtered out".to_string()))?;
        if NodeInner::document_element_of_ref(&filtered).is_none() {
            return Err(Error::Parse("Document element was filtered out".to_string()));
        }
        Ok(filtered)
    }

    /// Returns the canonical comparison string of a parsed tree.
    pub fn canonical_tree(&self, root: &NodeRef) -> Result<String> {
        let filtered = self.normalize_tree(root)?;
        let printed = print_to_string(&filtered)?;
        Ok(collapse_whitespace(&printed))
    }

    /// Returns the canonical comparison string of an XML string.
    pub fn canonical_str(&self, xml: &str) -> Result<String> {
        self.canonical_tree(&parse_str(xml)?)
    }

    /// Returns the canonical comparison string of an XML file.
    pub fn canonical_file<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        self.canonical_tree(&parse_file(path)?)
    }

    /// Returns the normalized document of a file as indented XML.
    pub fn pretty_file<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let filtered = self.normalize_tree(&parse_file(path)?)?;
        Ok(print_to_string_pretty(&filtered)?)
    }

    /// Returns the canonical string of a file, or `None` if it cannot be parsed.
    pub fn normalize<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        let path = path.as_ref();
        match self.canonical_file(path) {
            Ok(canonical) => Some(canonical),
            Err(e) => {
                warn!("Cannot normalize {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Compares two XML strings.
    pub fn compare_str(&self, old: &str, new: &str) -> Comparison {
        match (self.canonical_str(old), self.canonical_str(new)) {
            (Ok(old), Ok(new)) if old == new => Comparison::Same,
            _ => Comparison::Different,
        }
    }
}

impl<F: TreeFilter> Comparator for Normalizer<F> {
    fn compare(&self, old: &Path, new: &Path) -> Comparison {
        match (self.normalize(old), self.normalize(new)) {
            (Some(old), Some(new)) if old == new => Comparison::Same,
            _ => Comparison::Different,
        }
    }
}

/// Collapses every whitespace run into one space and trims both ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
