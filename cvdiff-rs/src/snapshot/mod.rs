//! Indexing of one dated snapshot folder by entity name.

use std::collections::btree_map::{self, BTreeMap};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::constants::{EXCLUDED_NAME_MARKERS, HEADER_TAG, NAME_TAG, XML_EXTENSION};
use crate::error::Result;
use crate::node::NodeRef;
use crate::xml::parse_document_element;

/// One entity file found in a snapshot folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    entity_name: String,
    source_path: PathBuf,
}

impl SnapshotEntry {
    /// Creates an entry.
    pub fn new(entity_name: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        SnapshotEntry {
            entity_name: entity_name.into(),
            source_path: source_path.into(),
        }
    }

    /// Returns the entity name from the file's header.
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Returns the path of the XML file.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}

/// Entities of one snapshot folder keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotIndex {
    entries: BTreeMap<String, SnapshotEntry>,
}

impl SnapshotIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, returning the entry it replaced, if any.
    pub fn insert(&mut self, entry: SnapshotEntry) -> Option<SnapshotEntry> {
        self.entries.insert(entry.entity_name.clone(), entry)
    }

    /// Returns the entry for an entity.
    pub fn get(&self, entity_name: &str) -> Option<&SnapshotEntry> {
        self.entries.get(entity_name)
    }

    /// Returns true if the entity is present.
    pub fn contains(&self, entity_name: &str) -> bool {
        self.entries.contains_key(entity_name)
    }

    /// Returns the number of entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in entity name order.
    pub fn iter(&self) -> btree_map::Values<'_, String, SnapshotEntry> {
        self.entries.values()
    }

    /// Iterates entity names in order.
    pub fn names(&self) -> btree_map::Keys<'_, String, SnapshotEntry> {
        self.entries.keys()
    }
}

impl FromIterator<SnapshotEntry> for SnapshotIndex {
    fn from_iter<I: IntoIterator<Item = SnapshotEntry>>(iter: I) -> Self {
        let mut index = SnapshotIndex::new();
        for entry in iter {
            index.insert(entry);
        }
        index
    }
}

impl<'a> IntoIterator for &'a SnapshotIndex {
    type Item = &'a SnapshotEntry;
    type IntoIter = btree_map::Values<'a, String, SnapshotEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Returns true if a name is a temporary or wildcard placeholder.
pub fn is_placeholder_name(name: &str) -> bool {
    EXCLUDED_NAME_MARKERS
        .iter()
        .any(|marker| name.contains(marker))
}

/// Extracts the entity name from a document element: the text of `Header/Name`.
///
/// Returns `None` when the header or name is missing or empty, or when the
/// name is a placeholder.
pub fn entity_name_of(document_element: &NodeRef) -> Option<String> {
    let header = document_element.borrow().find_child(HEADER_TAG)?;
    let name_node = header.borrow().find_child(NAME_TAG)?;
    let name = name_node.borrow().leading_text()?;
    let name = name.trim();
    if name.is_empty() || is_placeholder_name(name) {
        return None;
    }
    Some(name.to_string())
}

/// Parses an XML file and extracts its entity name.
pub fn entity_name<P: AsRef<Path>>(path: P) -> Result<Option<String>> {
    let document_element = parse_document_element(path)?;
    Ok(entity_name_of(&document_element))
}

/// Builds the index of all named XML files directly inside `folder`.
///
/// A missing folder yields an empty index. Unreadable or unnamed files are
/// skipped. When two files carry the same name the one seen last wins; the
/// order in which the directory is listed is not defined.
pub fn index_folder<P: AsRef<Path>>(folder: P) -> SnapshotIndex {
    let folder = folder.as_ref();
    let mut index = SnapshotIndex::new();
    if !folder.is_dir() {
        return index;
    }

    for entry in WalkDir::new(folder)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot list entry in {}: {}", folder.display(), e);
                continue;
            }
        };
        let is_xml = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(XML_EXTENSION));
        if !entry.file_type().is_file() || !is_xml {
            continue;
        }

        let path = entry.path();
        match entity_name(path) {
            Ok(Some(name)) => {
                if let Some(previous) = index.insert(SnapshotEntry::new(name, path)) {
                    warn!(
                        "Duplicate entity {:?}: {} replaces {}",
                        previous.entity_name(),
                        path.display(),
                        previous.source_path().display()
                    );
                }
            }
            Ok(None) => debug!("Skipping {}: no usable header name", path.display()),
            Err(e) => warn!("Cannot read {}: {}", path.display(), e),
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeInner;
    use crate::xml::parse_str;
    use std::fs;

    fn name_of(xml: &str) -> Option<String> {
        let root = parse_str(xml).unwrap();
        let doc = NodeInner::document_element_of_ref(&root).unwrap();
        entity_name_of(&doc)
    }

    #[test]
    fn test_entity_name_rules() {
        assert_eq!(
            name_of("<P><Header><Name>  PIC_A </Name></Header></P>").as_deref(),
            Some("PIC_A")
        );
        assert_eq!(name_of("<P><Header><Name>TEMP_A</Name></Header></P>"), None);
        assert_eq!(name_of("<P><Header><Name>A*</Name></Header></P>"), None);
        assert_eq!(name_of("<P><Header><Name>  </Name></Header></P>"), None);
        assert_eq!(name_of("<P><Header><Name/></Header></P>"), None);
        assert_eq!(name_of("<P><Header/></P>"), None);
        assert_eq!(name_of("<P><Name>A</Name></P>"), None);
        // Header must be a direct child of the document element
        assert_eq!(name_of("<P><Body><Header><Name>A</Name></Header></Body></P>"), None);
    }

    #[test]
    fn test_placeholder_names() {
        assert!(is_placeholder_name("TEMP_X"));
        assert!(is_placeholder_name("X_TEMP_"));
        assert!(is_placeholder_name("*"));
        assert!(!is_placeholder_name("TEMP"));
        assert!(!is_placeholder_name("temp_x"));
    }

    #[test]
    fn test_index_missing_folder_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(index_folder(dir.path().join("absent")).is_empty());
    }

    #[test]
    fn test_index_folder() {
        let dir = tempfile::tempdir().unwrap();
        let write = |file: &str, body: &str| fs::write(dir.path().join(file), body).unwrap();
        write("a.xml", "<P><Header><Name>A</Name></Header></P>");
        write("b.xml", "<P><Header><Name>B</Name></Header></P>");
        write("temp.xml", "<P><Header><Name>TEMP_C</Name></Header></P>");
        write("broken.xml", "<P><Header>");
        write("notes.txt", "<P><Header><Name>D</Name></Header></P>");
        write("upper.XML", "<P><Header><Name>E</Name></Header></P>");
        fs::create_dir(dir.path().join("nested.xml")).unwrap();

        let index = index_folder(dir.path());
        assert_eq!(index.names().cloned().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(index.get("A").unwrap().source_path(), dir.path().join("a.xml"));
    }

    #[cfg(unix)]
    #[test]
    fn test_index_follows_symlinked_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("shared.xml");
        fs::write(&target, "<P><Header><Name>S</Name></Header></P>").unwrap();
        let folder = dir.path().join("Composite");
        fs::create_dir(&folder).unwrap();
        std::os::unix::fs::symlink(&target, folder.join("linked.xml")).unwrap();

        let index = index_folder(&folder);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("S").unwrap().source_path(), folder.join("linked.xml"));
    }

    #[test]
    fn test_duplicate_names_keep_one_file() {
        // Last-write-wins in directory order, which is undefined: only assert
        // that exactly one of the candidates is kept.
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one.xml"), "<P><Header><Name>X</Name></Header></P>").unwrap();
        fs::write(dir.path().join("two.xml"), "<P><Header><Name>X</Name></Header></P>").unwrap();

        let index = index_folder(dir.path());
        assert_eq!(index.len(), 1);
        let kept = index.get("X").unwrap().source_path().to_path_buf();
        assert!(kept == dir.path().join("one.xml") || kept == dir.path().join("two.xml"));
    }

    #[test]
    fn test_from_iterator_last_wins() {
        let index: SnapshotIndex = vec![
            SnapshotEntry::new("X", "/a.xml"),
            SnapshotEntry::new("X", "/b.xml"),
            SnapshotEntry::new("Y", "/c.xml"),
        ]
        .into_iter()
        .collect();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("X").unwrap().source_path(), Path::new("/b.xml"));
        assert!(index.contains("Y"));
    }
}
