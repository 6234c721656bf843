//! Query/filter engine.
//!
//! A [`Filter`] wraps an ordered result set of nodes and supports chained,
//! order-preserving narrowing operations. Every operation returns a fresh
//! `Filter` and reads the tree without touching it, so chains mirror a
//! selector path: descend by class, take a child, require exactly one.

use crate::error::{Error, Result};

use super::node::{NodeId, NodeRef, NodeType, Tree};

/// An ordered result set of nodes over one tree.
#[derive(Debug, Clone)]
pub struct Filter<'a> {
    tree: &'a Tree,
    nodes: Vec<NodeId>,
}

impl<'a> Filter<'a> {
    pub(crate) fn new(tree: &'a Tree, nodes: Vec<NodeId>) -> Self {
        Self { tree, nodes }
    }

    /// Number of nodes in the current set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the current set is empty (a "no match" result).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at `index` of the current set.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<NodeRef<'a>> {
        self.nodes.get(index).map(|&id| NodeRef::new(self.tree, id))
    }

    /// First node of the current set.
    #[must_use]
    pub fn first(&self) -> Option<NodeRef<'a>> {
        self.get(0)
    }

    /// Last node of the current set.
    #[must_use]
    pub fn last(&self) -> Option<NodeRef<'a>> {
        self.nodes.last().map(|&id| NodeRef::new(self.tree, id))
    }

    /// The nodes of the current set, in set order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'a>> + '_ {
        self.nodes.iter().map(|&id| NodeRef::new(self.tree, id))
    }

    /// Lazy depth-first pre-order walk over the current set: each set node
    /// is yielded before its descendants, children left to right, matching
    /// document order within each subtree.
    #[must_use]
    pub fn traverse(&self) -> Traverse<'a> {
        Traverse {
            tree: self.tree,
            stack: self.nodes.iter().rev().copied().collect(),
        }
    }

    /// The sole node of a one-element set.
    ///
    /// `Ok(None)` when the set is empty; [`Error::MultipleNodes`] when it
    /// holds more than one node. This is how a caller asserts "exactly one
    /// match here."
    pub fn node(&self) -> Result<Option<NodeRef<'a>>> {
        if self.nodes.len() > 1 {
            return Err(Error::MultipleNodes(self.nodes.len()));
        }
        Ok(self.first())
    }

    fn collect(&self, predicate: impl Fn(NodeRef<'a>) -> bool) -> Filter<'a> {
        let nodes = self
            .traverse()
            .filter(|node| predicate(*node))
            .map(NodeRef::node_id)
            .collect();
        Filter::new(self.tree, nodes)
    }

    /// Elements carrying attribute `name` with exactly the value `value`,
    /// in traversal order.
    #[must_use]
    pub fn attr(&self, name: &str, value: &str) -> Filter<'a> {
        self.collect(|node| node.attr(name) == Some(value))
    }

    /// The first element (in traversal order) whose `id` attribute equals
    /// `idv`, as a single-node set. First match only, unlike the other
    /// filters.
    #[must_use]
    pub fn id(&self, idv: &str) -> Filter<'a> {
        let nodes = self
            .traverse()
            .find(|node| node.id() == Some(idv))
            .map(NodeRef::node_id)
            .into_iter()
            .collect();
        Filter::new(self.tree, nodes)
    }

    /// Elements whose class tokens contain `name`.
    #[must_use]
    pub fn cls(&self, name: &str) -> Filter<'a> {
        self.collect(|node| node.has_class(name))
    }

    /// Elements whose tag equals `name` exactly (case-sensitive against the
    /// stored tag text).
    #[must_use]
    pub fn tag(&self, name: &str) -> Filter<'a> {
        self.collect(|node| node.tag() == Some(name))
    }

    /// Nodes of the requested variant.
    #[must_use]
    pub fn node_type(&self, node_type: NodeType) -> Filter<'a> {
        self.collect(|node| node.node_type() == node_type)
    }

    /// For each node of the current set (no descent), its child at ordinal
    /// `nth`; negative `nth` counts from the end (`-1` = last). Nodes
    /// lacking such a child are skipped.
    #[must_use]
    pub fn child(&self, nth: isize) -> Filter<'a> {
        let mut nodes = Vec::new();
        for node in self.iter() {
            let count = node.child_count();
            let index = if nth < 0 {
                count.checked_sub(nth.unsigned_abs())
            } else {
                Some(nth.unsigned_abs()).filter(|&index| index < count)
            };
            if let Some(child) = index.and_then(|index| node.child(index)) {
                nodes.push(child.node_id());
            }
        }
        Filter::new(self.tree, nodes)
    }
}

/// Iterator behind [`Filter::traverse`]: finite, non-restartable,
/// depth-first pre-order. An explicit stack pushes children in reverse so
/// the leftmost pops first.
#[derive(Debug)]
pub struct Traverse<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children_of(id).iter().rev());
        Some(NodeRef::new(self.tree, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::Parser;
    use crate::dom::NodeType;

    fn parse(content: &str) -> Tree {
        Parser::new(false).parse(content)
    }

    fn tags(filter: &Filter<'_>) -> Vec<String> {
        filter
            .iter()
            .filter_map(|node| node.tag().map(str::to_string))
            .collect()
    }

    #[test]
    fn traverse_visits_depth_first_in_document_order() {
        let tree = parse("<a><a1></a1></a><b></b>");
        let walked: Vec<String> = tree
            .root()
            .filter()
            .traverse()
            .skip(1) // the root sentinel itself
            .filter_map(|node| node.tag().map(str::to_string))
            .collect();
        assert_eq!(walked, vec!["a", "a1", "b"]);
    }

    #[test]
    fn traverse_keeps_set_order_before_descendants() {
        let tree = parse(r#"<d class="x"><e></e></d><f class="x"></f>"#);
        let set = tree.root().filter().cls("x");
        let walked: Vec<String> = set
            .traverse()
            .filter_map(|node| node.tag().map(str::to_string))
            .collect();
        assert_eq!(walked, vec!["d", "e", "f"]);
    }

    #[test]
    fn node_on_empty_set_is_absent() {
        let tree = parse("<p></p>");
        let result = tree.root().filter().cls("missing").node();
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn node_on_singleton_returns_it() {
        let tree = parse(r#"<p class="x"></p>"#);
        let node = tree.root().filter().cls("x").node();
        assert!(matches!(node, Ok(Some(n)) if n.tag() == Some("p")));
    }

    #[test]
    fn node_on_two_elements_is_ambiguous() {
        let tree = parse(r#"<p class="x"></p><q class="x"></q>"#);
        let result = tree.root().filter().cls("x").node();
        assert!(matches!(result, Err(Error::MultipleNodes(2))));
    }

    #[test]
    fn attr_matches_exact_value_in_traversal_order() {
        let tree = parse(r#"<a href="1"></a><b><c href="2"></c></b><d href="1"></d>"#);
        let matched = tree.root().filter().attr("href", "1");
        assert_eq!(tags(&matched), vec!["a", "d"]);
        assert!(tree.root().filter().attr("href", "3").is_empty());
    }

    #[test]
    fn id_returns_first_match_only() {
        let tree = parse(r#"<p id="k"></p><q id="k"></q>"#);
        let matched = tree.root().filter().id("k");
        assert_eq!(matched.len(), 1);
        assert_eq!(tags(&matched), vec!["p"]);
        assert!(tree.root().filter().id("missing").is_empty());
    }

    #[test]
    fn cls_matches_token_not_substring() {
        let tree = parse(r#"<a class="item wide"></a><b class="item-wide"></b>"#);
        assert_eq!(tags(&tree.root().filter().cls("item")), vec!["a"]);
    }

    #[test]
    fn tag_is_case_sensitive_against_stored_text() {
        let tree = parse("<DIV></DIV><div></div>");
        assert_eq!(tree.root().filter().tag("div").len(), 1);
        assert_eq!(tree.root().filter().tag("DIV").len(), 1);
    }

    #[test]
    fn node_type_selects_variant() {
        let tree = parse("<p>one</p><q>two</q>");
        let texts = tree.root().filter().node_type(NodeType::Text);
        let contents: Vec<_> = texts.iter().filter_map(NodeRef::text).collect();
        assert_eq!(contents, vec!["one", "two"]);
        assert_eq!(tree.root().filter().node_type(NodeType::Element).len(), 2);
    }

    #[test]
    fn child_selects_by_ordinal() {
        let tree = parse("<u><x></x><y></y><z></z></u>");
        let u = tree.root().filter().tag("u");
        assert_eq!(tags(&u.child(0)), vec!["x"]);
        assert_eq!(tags(&u.child(2)), vec!["z"]);
        assert!(u.child(3).is_empty());
    }

    #[test]
    fn child_negative_counts_from_end() {
        let tree = parse("<u><x></x><y></y><z></z></u><v><w></w></v>");
        let set = tree.root().filter().tag("u");
        assert_eq!(tags(&set.child(-1)), vec!["z"]);
        // one child, child(-2): out of range is a skip, not an error
        let v = tree.root().filter().tag("v");
        assert!(v.child(-2).is_empty());
    }

    #[test]
    fn filters_chain_without_mutating_their_input() {
        let tree = parse(r#"<div class="c"><p>a</p><p>b</p></div>"#);
        let div = tree.root().filter().cls("c");
        let first = div.child(0);
        let all = div.node_type(NodeType::Element);
        assert_eq!(tags(&first), vec!["p"]);
        assert_eq!(all.len(), 3); // div itself plus both paragraphs
        assert_eq!(div.len(), 1);
    }

    #[test]
    fn end_to_end_heading_lookup() {
        let tree = parse(r#"<h1 class="t">Hi</h1>"#);
        let text = tree
            .root()
            .filter()
            .cls("t")
            .child(0)
            .node()
            .ok()
            .flatten()
            .and_then(|node| node.text());
        assert_eq!(text.as_deref(), Some("Hi"));
    }
}
