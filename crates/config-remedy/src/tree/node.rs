//! Arena tree node storage and structural mutations

use crate::host::Host;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Index of a node inside its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

/// The root node of every tree
pub const ROOT: NodeId = NodeId(0);

/// One configuration line and its relations
#[derive(Debug, Clone)]
pub(crate) struct Node {
    /// Canonical command text, whitespace-trimmed
    pub(crate) text: String,
    /// Back-reference; `None` only for the root
    pub(crate) parent: Option<NodeId>,
    /// Insertion-ordered children
    pub(crate) children: Vec<NodeId>,
    /// Text-to-child lookup; first same-text child wins
    pub(crate) children_index: HashMap<String, NodeId>,
    /// Tags set directly on this node
    pub(crate) tags: BTreeSet<String>,
    /// Trailing comments emitted on render
    pub(crate) comments: BTreeSet<String>,
    /// Sort weight; lower serializes earlier
    pub(crate) order_weight: i32,
    /// Marks lines introduced by the delta engine
    pub(crate) new_in_config: bool,
    /// Prior text values recorded by duplicate adds and overwrites
    pub(crate) instances: Vec<String>,
}

/// Default sort weight of a freshly created line
pub(crate) const DEFAULT_ORDER_WEIGHT: i32 = 500;

/// Weight assigned to negations that no ordering rule overrides
pub(crate) const NEGATION_ORDER_WEIGHT: i32 = 700;

impl Node {
    fn new(text: &str, parent: Option<NodeId>) -> Self {
        Self {
            text: text.to_string(),
            parent,
            children: Vec::new(),
            children_index: HashMap::new(),
            tags: BTreeSet::new(),
            comments: BTreeSet::new(),
            order_weight: DEFAULT_ORDER_WEIGHT,
            new_in_config: false,
            instances: Vec::new(),
        }
    }
}

/// A hierarchical configuration bound to a [`Host`]
#[derive(Debug, Clone)]
pub struct ConfigTree {
    pub(crate) host: Arc<Host>,
    pub(crate) nodes: Vec<Node>,
}

impl ConfigTree {
    /// Create an empty tree for a host.
    #[must_use]
    pub fn new(host: Arc<Host>) -> Self {
        Self {
            host,
            nodes: vec![Node::new("", None)],
        }
    }

    /// The host this tree belongs to
    #[must_use]
    pub fn host(&self) -> &Host {
        &self.host
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Command text of a node
    #[must_use]
    pub fn text(&self, id: NodeId) -> &str {
        &self.node(id).text
    }

    /// Parent of a node; `None` only for the root
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Direct children, insertion-ordered
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Whether a node has any children
    #[must_use]
    pub fn has_children(&self, id: NodeId) -> bool {
        !self.node(id).children.is_empty()
    }

    /// Number of ancestors strictly above the root; the root is depth 0.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Tags set directly on a node (effective tags fold over the subtree)
    #[must_use]
    pub fn self_tags(&self, id: NodeId) -> &BTreeSet<String> {
        &self.node(id).tags
    }

    /// Comments attached to a node
    #[must_use]
    pub fn comments(&self, id: NodeId) -> &BTreeSet<String> {
        &self.node(id).comments
    }

    /// Attach a trailing comment.
    pub fn add_comment(&mut self, id: NodeId, comment: impl Into<String>) {
        self.node_mut(id).comments.insert(comment.into());
    }

    /// Sort weight of a node
    #[must_use]
    pub fn order_weight(&self, id: NodeId) -> i32 {
        self.node(id).order_weight
    }

    /// Override the sort weight of a node.
    pub fn set_weight(&mut self, id: NodeId, weight: i32) {
        self.node_mut(id).order_weight = weight;
    }

    /// Whether the delta engine introduced this line
    #[must_use]
    pub fn new_in_config(&self, id: NodeId) -> bool {
        self.node(id).new_in_config
    }

    /// Mark or clear the delta-introduced flag.
    pub fn set_new_in_config(&mut self, id: NodeId, value: bool) {
        self.node_mut(id).new_in_config = value;
    }

    /// Prior text values recorded for a node
    #[must_use]
    pub fn instances(&self, id: NodeId) -> &[String] {
        &self.node(id).instances
    }

    /// Add a tag to a node itself.
    pub fn append_tag(&mut self, id: NodeId, tag: impl Into<String>) {
        self.node_mut(id).tags.insert(tag.into());
    }

    /// Add several tags to a node itself.
    pub fn append_tags<I, S>(&mut self, id: NodeId, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self.append_tag(id, tag);
        }
    }

    /// Remove a tag from a node itself.
    pub fn remove_tag(&mut self, id: NodeId, tag: &str) {
        self.node_mut(id).tags.remove(tag);
    }

    /// Remove several tags from a node itself.
    pub fn remove_tags<'a, I>(&mut self, id: NodeId, tags: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for tag in tags {
            self.remove_tag(id, tag);
        }
    }

    /// O(1) lookup of a direct child by exact text.
    pub(crate) fn child_by_text(&self, parent: NodeId, text: &str) -> Option<NodeId> {
        self.node(parent).children_index.get(text).copied()
    }

    /// Append a child line, returning the existing child on a text collision
    /// unless a `parent_allows_duplicate_child` rule matches the parent.
    pub fn add_child(&mut self, parent: NodeId, text: &str) -> NodeId {
        let text = text.trim();
        if let Some(existing) = self.child_by_text(parent, text) {
            if !self.allows_duplicate_child(parent) {
                self.node_mut(existing).instances.push(text.to_string());
                return existing;
            }
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(text, Some(parent)));
        let pnode = self.node_mut(parent);
        pnode.children.push(id);
        pnode.children_index.entry(text.to_string()).or_insert(id);
        id
    }

    /// Append several child lines. A single `&str` is one child: pass it to
    /// [`ConfigTree::add_child`] instead (string types do not iterate here).
    pub fn add_children<I, S>(&mut self, parent: NodeId, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for text in texts {
            self.add_child(parent, text.as_ref());
        }
    }

    fn allows_duplicate_child(&self, parent: NodeId) -> bool {
        if parent == ROOT {
            return false;
        }
        self.host
            .options
            .parent_allows_duplicate_child
            .iter()
            .any(|rule| self.lineage_test(parent, &rule.lineage, false))
    }

    /// Unlink a node from its parent; a root argument is a no-op.
    pub fn del_child(&mut self, child: NodeId) {
        if let Some(parent) = self.node(child).parent {
            self.unlink(parent, child);
        }
    }

    /// Unlink the direct child with the given text; absent text is a no-op.
    pub fn del_child_by_text(&mut self, parent: NodeId, text: &str) {
        if let Some(child) = self.child_by_text(parent, text) {
            self.unlink(parent, child);
        }
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        let text = self.node(child).text.clone();
        let replacement = self
            .node(parent)
            .children
            .iter()
            .copied()
            .find(|&c| c != child && self.node(c).text == text);
        let pnode = self.node_mut(parent);
        pnode.children.retain(|&c| c != child);
        if pnode.children_index.get(&text) == Some(&child) {
            pnode.children_index.remove(&text);
            if let Some(other) = replacement {
                pnode.children_index.insert(text, other);
            }
        }
        self.node_mut(child).parent = None;
    }

    /// Relink a node under a new parent within the same tree.
    pub fn move_node(&mut self, node: NodeId, new_parent: NodeId) {
        debug_assert!(
            new_parent != node && !self.descendants(node).any(|d| d == new_parent),
            "cannot move a node under its own subtree"
        );
        if let Some(parent) = self.node(node).parent {
            self.unlink(parent, node);
        }
        let text = self.node(node).text.clone();
        self.node_mut(node).parent = Some(new_parent);
        let pnode = self.node_mut(new_parent);
        pnode.children.push(node);
        pnode.children_index.entry(text).or_insert(node);
    }

    /// Move a subtree into another tree, unlinking it here.
    pub fn move_to_tree(
        &mut self,
        node: NodeId,
        dest: &mut ConfigTree,
        dest_parent: NodeId,
    ) -> NodeId {
        let copy = dest.add_deep_copy_of(dest_parent, self, node);
        self.del_child(node);
        copy
    }

    /// Rewrite a node's text, keeping the parent's child index consistent.
    pub fn set_text(&mut self, id: NodeId, new_text: &str) {
        let new_text = new_text.trim().to_string();
        let old = self.node(id).text.clone();
        if old == new_text {
            return;
        }
        self.node_mut(id).text = new_text.clone();
        if let Some(parent) = self.node(id).parent {
            let replacement = self
                .node(parent)
                .children
                .iter()
                .copied()
                .find(|&c| c != id && self.node(c).text == old);
            let pnode = self.node_mut(parent);
            if pnode.children_index.get(&old) == Some(&id) {
                pnode.children_index.remove(&old);
                if let Some(other) = replacement {
                    pnode.children_index.insert(old, other);
                }
            }
            pnode.children_index.entry(new_text).or_insert(id);
        }
    }

    /// Toggle negation: prefix the host's negation word, or strip it when the
    /// line is already negated. Double negation is the identity.
    pub fn negate(&mut self, id: NodeId) {
        let prefix = format!("{} ", self.host.options.negation);
        let text = self.node(id).text.clone();
        let new_text = match text.strip_prefix(&prefix) {
            Some(rest) => rest.to_string(),
            None => format!("{prefix}{text}"),
        };
        self.set_text(id, &new_text);
    }

    /// Copy a single line (text, tags, comments, weight, flags) under `parent`.
    pub fn add_shallow_copy_of(
        &mut self,
        parent: NodeId,
        src: &ConfigTree,
        node: NodeId,
    ) -> NodeId {
        let dump = src.node_dump_shallow(node);
        self.graft(parent, &dump)
    }

    /// Copy a whole subtree from another tree under `parent`.
    pub fn add_deep_copy_of(&mut self, parent: NodeId, src: &ConfigTree, node: NodeId) -> NodeId {
        let dump = src.subtree_dump(node);
        self.graft(parent, &dump)
    }

    /// Copy a whole subtree from this tree under `parent`.
    pub fn add_deep_copy_within(&mut self, parent: NodeId, node: NodeId) -> NodeId {
        let dump = self.subtree_dump(node);
        self.graft(parent, &dump)
    }

    /// Re-create a node's ancestor chain (root-exclusive) plus the node itself
    /// under the root of this tree, shallowly, returning the deepest copy.
    pub fn add_ancestor_copy_of(&mut self, src: &ConfigTree, node: NodeId) -> NodeId {
        let chain: Vec<_> = src
            .lineage(node)
            .into_iter()
            .map(|id| src.node_dump_shallow(id))
            .collect();
        self.graft_chain(&chain)
    }

    /// Same-tree variant of [`ConfigTree::add_ancestor_copy_of`].
    pub fn add_ancestor_copy_within(&mut self, node: NodeId) -> NodeId {
        let chain: Vec<_> = self
            .lineage(node)
            .into_iter()
            .map(|id| self.node_dump_shallow(id))
            .collect();
        self.graft_chain(&chain)
    }

    fn graft_chain(&mut self, chain: &[super::dump::NodeDump]) -> NodeId {
        let mut base = ROOT;
        for dump in chain {
            base = self.graft(base, dump);
        }
        base
    }

    /// Reconstruct every node's child index from its child list.
    pub fn rebuild_children_index(&mut self) {
        for slot in 0..self.nodes.len() {
            let children = self.nodes[slot].children.clone();
            let mut index = HashMap::with_capacity(children.len());
            for child in children {
                let text = self.node(child).text.clone();
                index.entry(text).or_insert(child);
            }
            self.nodes[slot].children_index = index;
        }
    }

    /// Deep-copy every top-level child of `other` into this tree; same-text
    /// sections merge recursively.
    pub fn merge(&mut self, other: &ConfigTree) {
        for &child in other.children(ROOT) {
            self.add_deep_copy_of(ROOT, other, child);
        }
    }

    fn node_eq(&self, a: NodeId, other: &ConfigTree, b: NodeId) -> bool {
        let na = self.node(a);
        let nb = other.node(b);
        na.text == nb.text
            && na.tags == nb.tags
            && na.comments == nb.comments
            && na.order_weight == nb.order_weight
            && na.new_in_config == nb.new_in_config
            && na.instances == nb.instances
            && na.children.len() == nb.children.len()
            && na
                .children
                .iter()
                .zip(&nb.children)
                .all(|(&ca, &cb)| self.node_eq(ca, other, cb))
    }
}

impl PartialEq for ConfigTree {
    fn eq(&self, other: &Self) -> bool {
        self.node_eq(ROOT, other, ROOT)
    }
}
