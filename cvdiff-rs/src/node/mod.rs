//! Node structures for XML tree representation.
//!
//! Documents are held as trees of reference-counted nodes. Each node owns its
//! children, so subtrees can be shared while the normalizer rebuilds a
//! filtered copy of a tree.

mod xml_content;

pub use xml_content::{XmlContent, XmlElement, XmlText};

use std::cell::RefCell;
use std::rc::Rc;

use crate::constants::ROOT_TAG;

/// A reference-counted pointer to a node.
pub type NodeRef = Rc<RefCell<NodeInner>>;

/// Creates a new node reference holding the given content.
pub fn new_node(content: Option<XmlContent>) -> NodeRef {
    Rc::new(RefCell::new(NodeInner::new(content)))
}

/// Creates the synthetic `$ROOT$` node that owns a parsed document.
pub fn new_document_root() -> NodeRef {
    new_node(Some(XmlContent::Element(XmlElement::new(ROOT_TAG, Vec::new()))))
}

/// The inner data of a node in the parse tree.
#[derive(Debug)]
pub struct NodeInner {
    /// Child nodes.
    children: Vec<NodeRef>,
    /// XML content of this node.
    content: Option<XmlContent>,
}

impl NodeInner {
    /// Creates a detached node with the given content.
    pub fn new(content: Option<XmlContent>) -> Self {
        NodeInner {
            children: Vec::new(),
            content,
        }
    }

    /// Returns the content of this node.
    pub fn content(&self) -> Option<&XmlContent> {
        self.content.as_ref()
    }

    /// Returns a mutable reference to the content.
    pub fn content_mut(&mut self) -> Option<&mut XmlContent> {
        self.content.as_mut()
    }

    /// Returns the element tag name, if this node is an element.
    pub fn tag(&self) -> Option<&str> {
        self.content
            .as_ref()
            .and_then(XmlContent::as_element)
            .map(XmlElement::qname)
    }

    /// Returns the number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns a reference to the child at the given index.
    pub fn child(&self, index: usize) -> Option<&NodeRef> {
        self.children.get(index)
    }

    /// Returns the children as a slice.
    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    /// Returns the leading text of an element, i.e. a text node in first position.
    pub fn leading_text(&self) -> Option<String> {
        let first = self.children.first()?.borrow();
        first
            .content()
            .and_then(XmlContent::as_text)
            .map(|t| t.text().to_string())
    }

    /// Returns the first child element with the given tag.
    pub fn find_child(&self, tag: &str) -> Option<NodeRef> {
        self.children
            .iter()
            .find(|child| child.borrow().tag() == Some(tag))
            .cloned()
    }
}

/// Helper functions that work with NodeRef.
impl NodeInner {
    /// Appends a child node. Must be called on the NodeRef wrapper.
    pub fn add_child_to_ref(parent_ref: &NodeRef, child_ref: NodeRef) {
        parent_ref.borrow_mut().children.push(child_ref);
    }

    /// Returns the document element below a `$ROOT$` node: its first element child.
    pub fn document_element_of_ref(root_ref: &NodeRef) -> Option<NodeRef> {
        root_ref
            .borrow()
            .children
            .iter()
            .find(|child| child.borrow().tag().is_some())
            .cloned()
    }

    /// Visits a node and all its descendants in document order.
    pub fn walk_ref<F: FnMut(&NodeRef)>(node_ref: &NodeRef, visit: &mut F) {
        visit(node_ref);
        let children = node_ref.borrow().children.clone();
        for child in &children {
            Self::walk_ref(child, visit);
        }
    }
}
