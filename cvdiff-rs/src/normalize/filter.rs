//! Tag-based subtree filtering.

use std::collections::HashSet;

use crate::constants::IGNORED_TAGS;
use crate::node::{new_node, NodeInner, NodeRef};

/// Decides which element subtrees are dropped when a tree is rebuilt.
pub trait TreeFilter {
    /// Returns true if the element with this tag, and everything below it, is dropped.
    fn excludes(&self, tag: &str) -> bool;
}

/// Drops subtrees rooted at any tag in a fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredTags {
    tags: HashSet<String>,
}

impl IgnoredTags {
    /// Creates a filter for the given tag names.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IgnoredTags {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

}

impl Default for IgnoredTags {
    /// The volatile `Id` and `Link` subtrees.
    fn default() -> Self {
        Self::new(IGNORED_TAGS)
    }
}

impl TreeFilter for IgnoredTags {
    fn excludes(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Adapts a closure over tag names into a [`TreeFilter`].
pub struct TagPredicate<F>(pub F);

impl<F: Fn(&str) -> bool> TreeFilter for TagPredicate<F> {
    fn excludes(&self, tag: &str) -> bool {
        (self.0)(tag)
    }
}

/// Builds a copy of `node` without the subtrees the filter excludes.
///
/// Filtering is top-down: once an element is excluded its descendants are
/// never visited. The text directly following an excluded element goes with
/// it. Returns `None` if `node` itself is excluded. The source tree is left
/// untouched.
pub fn filter_tree<F: TreeFilter + ?Sized>(node: &NodeRef, filter: &F) -> Option<NodeRef> {
    let borrowed = node.borrow();
    if borrowed.tag().is_some_and(|tag| filter.excludes(tag)) {
        return None;
    }

    let copy = new_node(borrowed.content().cloned());
    let mut after_excluded = false;
    for child in borrowed.children() {
        let is_text = child.borrow().tag().is_none();
        if is_text && after_excluded {
            after_excluded = false;
            continue;
        }
        match filter_tree(child, filter) {
            Some(kept) => {
                NodeInner::add_child_to_ref(&copy, kept);
                after_excluded = false;
            }
            None => after_excluded = true,
        }
    }
    Some(copy)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{parse_str, print_to_string};

    #[test]
    fn test_default_ignores_id_and_link() {
        let filter = IgnoredTags::default();
        assert!(filter.excludes("Id"));
        assert!(filter.excludes("Link"));
        assert!(!filter.excludes("id"));
        assert!(!filter.excludes("Name"));
    }

    #[test]
    fn test_nested_subtrees_dropped() {
        let root = parse_str(
            "<Doc><Id>1</Id><Body><Link><Target>x</Target></Link><Text>keep</Text></Body></Doc>",
        )
        .unwrap();
        let filtered = filter_tree(&root, &IgnoredTags::default()).unwrap();
        assert_eq!(
            print_to_string(&filtered).unwrap(),
            "<Doc><Body><Text>keep</Text></Body></Doc>"
        );
    }

    #[test]
    fn test_trailing_text_dropped_with_subtree() {
        let root = parse_str("<Doc>a<Id>1</Id>tail<Keep/>\n<Link/>\n</Doc>").unwrap();
        let filtered = filter_tree(&root, &IgnoredTags::default()).unwrap();
        assert_eq!(print_to_string(&filtered).unwrap(), "<Doc>a<Keep />\n</Doc>");
    }

    #[test]
    fn test_source_tree_untouched() {
        let root = parse_str("<Doc><Id>1</Id></Doc>").unwrap();
        let _ = filter_tree(&root, &IgnoredTags::default());
        assert_eq!(print_to_string(&root).unwrap(), "<Doc><Id>1</Id></Doc>");
    }

    #[test]
    fn test_excluded_root() {
        let root = parse_str("<Link><a/></Link>").unwrap();
        let doc = NodeInner::document_element_of_ref(&root).unwrap();
        assert!(filter_tree(&doc, &IgnoredTags::default()).is_none());
    }

    #[test]
    fn test_closure_predicate() {
        let root = parse_str("<Doc><TmpA/><TmpB/><Keep/></Doc>").unwrap();
        let filter = TagPredicate(|tag: &str| tag.starts_with("Tmp"));
        let filtered = filter_tree(&root, &filter).unwrap();
        assert_eq!(print_to_string(&filtered).unwrap(), "<Doc><Keep /></Doc>");
    }
}
