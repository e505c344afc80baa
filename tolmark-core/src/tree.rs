//! Node tree built by the reducer.
//!
//! The tree uses an index-based arena so nodes can point back at their parent
//! without reference cycles. A `Document` owns the arena, the list of root
//! nodes and the step log the nodes were built from.
//!
//! # Example
//!
//! ```
//! use tolmark_core::location::Cursor;
//! use tolmark_core::reduce::build;
//! use tolmark_core::step::{NodeType, Step, StepKind};
//!
//! let doc = build(
//!     vec![
//!         Step::node_start(NodeType::Element, Cursor::new(1, 1, 0)),
//!         Step::text(StepKind::NodeNameEnd, "br", Cursor::new(1, 4, 3)),
//!         Step::new(StepKind::NodeEnd, Cursor::new(1, 5, 4)),
//!     ],
//!     None,
//! );
//!
//! for node in doc.roots() {
//!     println!("{}: {:?}", node.node_type(), node.name());
//! }
//! ```

use crate::history::{StepLog, StepRuns};
use crate::location::{Cursor, LocationInfo};
use crate::step::{CloseType, NodeNature, NodeType, Step};

// ============================================================================
// Core Types
// ============================================================================

/// Index into the document's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Internal node storage.
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) attrs: Vec<NodeId>,
    pub(crate) node_type: NodeType,
    pub(crate) close_type: Option<CloseType>,
    pub(crate) nature: Option<NodeNature>,
    pub(crate) name: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) location: LocationInfo,
    pub(crate) equal_count: u32,
    /// Left boundary followed by right boundary, e.g. `""`.
    pub(crate) boundary_char: String,
    pub(crate) steps: StepRuns,
}

// ============================================================================
// Document
// ============================================================================

/// A node forest plus the steps it was reduced from.
#[derive(Debug, Default, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    roots: Vec<NodeId>,
    log: StepLog,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate over root-level nodes.
    pub fn roots(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        self.roots.iter().map(move |&id| Node { doc: self, id })
    }

    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        if id.index() < self.nodes.len() {
            Some(Node { doc: self, id })
        } else {
            None
        }
    }

    /// Total number of nodes, attributes included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn log(&self) -> &StepLog {
        &self.log
    }

    pub(crate) fn log_mut(&mut self) -> &mut StepLog {
        &mut self.log
    }

    fn node_data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.index())
    }

    /// Allocate a node and attach it under `parent` (as an attribute when its
    /// type is `Attr`), or as a root when there is no parent.
    pub(crate) fn attach(
        &mut self,
        node_type: NodeType,
        cursor: Cursor,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData {
            parent,
            children: Vec::new(),
            attrs: Vec::new(),
            node_type,
            close_type: None,
            nature: None,
            name: None,
            content: None,
            location: LocationInfo::new(cursor),
            equal_count: 0,
            boundary_char: String::new(),
            steps: StepRuns::default(),
        });
        match parent.and_then(|parent| self.nodes.get_mut(parent.index())) {
            Some(parent) if node_type == NodeType::Attr => parent.attrs.push(id),
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }
        id
    }
}

// ============================================================================
// Node (navigation handle)
// ============================================================================

/// A handle for navigating the document tree.
///
/// This is a lightweight reference that borrows from the document.
#[derive(Clone, Copy)]
pub struct Node<'doc> {
    doc: &'doc Document,
    id: NodeId,
}

impl<'doc> Node<'doc> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn data(&self) -> &'doc NodeData {
        self.doc.node_data(self.id)
    }

    pub fn node_type(&self) -> NodeType {
        self.data().node_type
    }

    /// Close type, once a step has resolved one.
    pub fn close_type(&self) -> Option<CloseType> {
        self.data().close_type
    }

    pub fn nature(&self) -> Option<NodeNature> {
        self.data().nature
    }

    pub fn name(&self) -> Option<&'doc str> {
        self.data().name.as_deref()
    }

    pub fn content(&self) -> Option<&'doc str> {
        self.data().content.as_deref()
    }

    pub fn location(&self) -> &'doc LocationInfo {
        &self.data().location
    }

    /// Number of `=` seen while scanning this attribute.
    pub fn equal_count(&self) -> u32 {
        self.data().equal_count
    }

    /// Boundary characters framing an attribute value, left then right.
    pub fn boundary_char(&self) -> &'doc str {
        &self.data().boundary_char
    }

    /// Get the parent node, if any.
    pub fn parent(&self) -> Option<Node<'doc>> {
        self.data().parent.map(|id| Node { doc: self.doc, id })
    }

    /// Iterate over child nodes.
    pub fn children(&self) -> impl Iterator<Item = Node<'doc>> + 'doc {
        let doc = self.doc;
        self.data().children.iter().map(move |&id| Node { doc, id })
    }

    /// Iterate over attribute nodes.
    pub fn attrs(&self) -> impl Iterator<Item = Node<'doc>> + 'doc {
        let doc = self.doc;
        self.data().attrs.iter().map(move |&id| Node { doc, id })
    }

    /// Location records of the attributes, in attribute order.
    pub fn attr_locations(&self) -> impl Iterator<Item = &'doc LocationInfo> + 'doc {
        self.attrs().map(|attr| attr.location())
    }

    /// First attribute with the given name.
    pub fn attr(&self, name: &str) -> Option<Node<'doc>> {
        self.attrs().find(|attr| attr.name() == Some(name))
    }

    /// Get the first child node.
    pub fn first_child(&self) -> Option<Node<'doc>> {
        self.data().children.first().map(|&id| Node { doc: self.doc, id })
    }

    /// Get the last child node.
    pub fn last_child(&self) -> Option<Node<'doc>> {
        self.data().children.last().map(|&id| Node { doc: self.doc, id })
    }

    /// Sibling list this node belongs to: the roots, or its parent's children
    /// or attributes.
    fn siblings(&self) -> &'doc [NodeId] {
        match self.data().parent {
            None => &self.doc.roots,
            Some(parent) => {
                let parent = self.doc.node_data(parent);
                if self.node_type() == NodeType::Attr {
                    &parent.attrs
                } else {
                    &parent.children
                }
            }
        }
    }

    /// Get the next sibling node.
    pub fn next_sibling(&self) -> Option<Node<'doc>> {
        let siblings = self.siblings();
        let pos = siblings.iter().position(|&id| id == self.id)?;
        siblings.get(pos + 1).map(|&id| Node { doc: self.doc, id })
    }

    /// Get the previous sibling node.
    pub fn prev_sibling(&self) -> Option<Node<'doc>> {
        let siblings = self.siblings();
        let pos = siblings.iter().position(|&id| id == self.id)?;
        if pos > 0 {
            Some(Node { doc: self.doc, id: siblings[pos - 1] })
        } else {
            None
        }
    }

    /// Steps that built this node, in order.
    pub fn steps(&self) -> impl Iterator<Item = &'doc Step> + 'doc {
        let log = &self.doc.log;
        self.data().steps.indices().filter_map(move |index| log.get(index))
    }

    pub fn step_runs(&self) -> &'doc StepRuns {
        &self.data().steps
    }

    pub fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type() == NodeType::Text
    }

    /// Recursively collect the content of text nodes under this node.
    pub fn all_text(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    fn collect_text(&self, buf: &mut String) {
        if self.is_text() {
            buf.push_str(self.content().unwrap_or_default());
            return;
        }
        for child in self.children() {
            child.collect_text(buf);
        }
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("type", &self.node_type())
            .field("name", &self.name())
            .field("close_type", &self.close_type())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset: usize) -> Cursor {
        Cursor::new(1, offset as u32 + 1, offset)
    }

    fn named(doc: &mut Document, id: NodeId, name: &str) {
        if let Some(data) = doc.data_mut(id) {
            data.name = Some(name.to_string());
        }
    }

    #[test]
    fn test_attach_roots_children_attrs() {
        let mut doc = Document::new();
        let div = doc.attach(NodeType::Element, at(0), None);
        let class = doc.attach(NodeType::Attr, at(5), Some(div));
        let text = doc.attach(NodeType::Text, at(15), Some(div));
        named(&mut doc, class, "class");

        assert_eq!(doc.root_ids(), &[div]);
        assert_eq!(doc.len(), 3);

        let div_node = doc.get(div).unwrap();
        assert_eq!(div_node.attrs().map(|n| n.id()).collect::<Vec<_>>(), vec![class]);
        assert_eq!(div_node.children().map(|n| n.id()).collect::<Vec<_>>(), vec![text]);
        assert_eq!(div_node.attr("class").map(|n| n.id()), Some(class));
        assert!(div_node.attr("id").is_none());
        assert_eq!(doc.get(class).unwrap().parent().unwrap().id(), div);
        assert_eq!(
            div_node.attr_locations().map(|l| l.start()).collect::<Vec<_>>(),
            vec![at(5)]
        );
    }

    #[test]
    fn test_siblings() {
        let mut doc = Document::new();
        let a = doc.attach(NodeType::Element, at(0), None);
        let b = doc.attach(NodeType::Comment, at(3), None);
        let c = doc.attach(NodeType::Element, at(6), None);

        let a = doc.get(a).unwrap();
        let b_node = a.next_sibling().unwrap();
        assert_eq!(b_node.id(), b);
        assert_eq!(b_node.next_sibling().unwrap().id(), c);
        assert!(doc.get(c).unwrap().next_sibling().is_none());
        assert_eq!(b_node.prev_sibling().unwrap().id(), a.id());
        assert!(a.prev_sibling().is_none());
    }

    #[test]
    fn test_all_text() {
        let mut doc = Document::new();
        let p = doc.attach(NodeType::Element, at(0), None);
        let hello = doc.attach(NodeType::Text, at(3), Some(p));
        let em = doc.attach(NodeType::Element, at(9), Some(p));
        let world = doc.attach(NodeType::Text, at(13), Some(em));
        for (id, text) in [(hello, "Hello "), (world, "world")] {
            if let Some(data) = doc.data_mut(id) {
                data.content = Some(text.to_string());
            }
        }
        assert_eq!(doc.get(p).unwrap().all_text(), "Hello world");
    }

    #[test]
    fn test_get_out_of_range() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert!(doc.get(NodeId::new(0)).is_none());
    }
}
