//! Document tree vocabulary: arena storage, node variants, accessors.
//!
//! Nodes live in a single growable store owned by their [`Tree`] and refer to
//! each other by [`NodeId`] handle, so parent back-references cannot form an
//! ownership cycle. A tree is built once by a parse call and is read-only
//! afterward; [`NodeRef`] is the cheap borrowed view callers navigate with.

use std::collections::HashMap;

use super::filter::Filter;

/// The fixed entity table. Only these six are ever decoded; unknown entities
/// pass through untouched.
const ESCAPES: [(&str, char); 6] = [
    ("&nbsp;", ' '),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&amp;", '&'),
    ("&quot;", '"'),
    ("&apos;", '\''),
];

/// Replace the six named character entities with their literal characters.
///
/// Single left-to-right scan; replacement output is never rescanned, so
/// double-escaped input loses exactly one level of escaping per pass.
#[must_use]
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ESCAPES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, literal)) => {
                out.push(*literal);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Handle to a node inside one [`Tree`]. Only meaningful together with the
/// tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The closed set of node variants a parse can produce.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The sentinel the whole tree hangs off. Exactly one per tree.
    Root,
    /// Character data, raw as it appeared in the source (entities still
    /// escaped).
    Text {
        /// Raw, un-decoded content.
        content: String,
    },
    /// A tagged element.
    Element {
        /// Element name, case as first observed.
        tag: String,
        /// Attribute map; a repeated name keeps its last value.
        attributes: HashMap<String, String>,
    },
}

/// Discriminant of [`NodeKind`], used by the `node_type` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// The root sentinel.
    Root,
    /// A text leaf.
    Text,
    /// A tagged element.
    Element,
}

#[derive(Debug)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// The hierarchy produced by one parse call, rooted at a single sentinel.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Handle of the root sentinel, valid for every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// An empty tree: just the root sentinel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Root,
            }],
        }
    }

    /// Borrowed view of the root sentinel.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: Self::ROOT,
        }
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub(crate) fn children_of(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub(crate) fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.last().copied()
    }

    pub(crate) fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Text { .. })
    }

    pub(crate) fn element_tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(NodeData {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub(crate) fn append_element(
        &mut self,
        parent: NodeId,
        tag: String,
        attributes: HashMap<String, String>,
    ) -> NodeId {
        self.push(parent, NodeKind::Element { tag, attributes })
    }

    pub(crate) fn append_text(&mut self, parent: NodeId, content: String) -> NodeId {
        self.push(parent, NodeKind::Text { content })
    }

    pub(crate) fn extend_text(&mut self, id: NodeId, more: &str) {
        if let NodeKind::Text { content } = &mut self.nodes[id.index()].kind {
            content.push_str(more);
        }
    }

    /// Remove an element from its parent's children and reparent its own
    /// children onto that parent, inserted at the position it occupied.
    /// Document order of the surviving nodes is preserved.
    pub(crate) fn splice_out(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[id.index()].children);
        for &child in &children {
            self.nodes[child.index()].parent = Some(parent);
        }
        let siblings = &mut self.nodes[parent.index()].children;
        match siblings.iter().position(|&s| s == id) {
            Some(pos) => {
                siblings.splice(pos..=pos, children);
            }
            None => siblings.extend(children),
        }
        self.nodes[id.index()].parent = None;
    }
}

/// Borrowed view of one node: the tree plus a handle into it.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(tree: &'a Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// Arena handle of this node.
    #[must_use]
    pub fn node_id(self) -> NodeId {
        self.id
    }

    /// The node's payload.
    #[must_use]
    pub fn kind(self) -> &'a NodeKind {
        &self.tree.node(self.id).kind
    }

    /// Which variant this node is.
    #[must_use]
    pub fn node_type(self) -> NodeType {
        match self.kind() {
            NodeKind::Root => NodeType::Root,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::Element { .. } => NodeType::Element,
        }
    }

    /// The owning node, or `None` for the root.
    #[must_use]
    pub fn parent(self) -> Option<NodeRef<'a>> {
        self.tree
            .node(self.id)
            .parent
            .map(|id| NodeRef::new(self.tree, id))
    }

    /// Child nodes in document order.
    pub fn children(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        tree.children_of(self.id)
            .iter()
            .map(move |&id| NodeRef::new(tree, id))
    }

    /// Number of direct children.
    #[must_use]
    pub fn child_count(self) -> usize {
        self.tree.children_of(self.id).len()
    }

    /// Child at `index`, if any.
    #[must_use]
    pub fn child(self, index: usize) -> Option<NodeRef<'a>> {
        self.tree
            .children_of(self.id)
            .get(index)
            .map(|&id| NodeRef::new(self.tree, id))
    }

    /// Wrap this node as a single-element query view.
    #[must_use]
    pub fn filter(self) -> Filter<'a> {
        Filter::new(self.tree, vec![self.id])
    }

    /// Element name, or `None` for non-elements.
    #[must_use]
    pub fn tag(self) -> Option<&'a str> {
        self.tree.element_tag(self.id)
    }

    /// Attribute map, or `None` for non-elements.
    #[must_use]
    pub fn attributes(self) -> Option<&'a HashMap<String, String>> {
        match self.kind() {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Value of one attribute.
    #[must_use]
    pub fn attr(self, name: &str) -> Option<&'a str> {
        self.attributes()?.get(name).map(String::as_str)
    }

    /// The `id` attribute.
    #[must_use]
    pub fn id(self) -> Option<&'a str> {
        self.attr("id")
    }

    /// The `class` attribute split on whitespace, in order. Empty when the
    /// attribute is absent.
    #[must_use]
    pub fn classes(self) -> Vec<&'a str> {
        self.attr("class")
            .map(|classes| classes.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Whether the `class` attribute contains `name` as a token.
    #[must_use]
    pub fn has_class(self, name: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|token| token == name))
    }

    /// Raw character data, or `None` for non-text nodes.
    #[must_use]
    pub fn content(self) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Text { content } => Some(content),
            _ => None,
        }
    }

    /// Decoded character data, or `None` for non-text nodes.
    #[must_use]
    pub fn text(self) -> Option<String> {
        self.content().map(unescape)
    }
}
