//! Traversals, child queries and lineage evaluation

use super::node::{ConfigTree, NodeId, ROOT};
use crate::matcher::{Matcher, Test};

/// Lazy pre-order traversal over a subtree
///
/// Borrowing the tree keeps mutation during iteration a compile error; a
/// fresh iterator is produced on every call.
pub struct AllChildren<'a> {
    tree: &'a ConfigTree,
    stack: Vec<NodeId>,
}

impl Iterator for AllChildren<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

impl ConfigTree {
    /// Every descendant of the root, pre-order, insertion order among siblings.
    #[must_use]
    pub fn all_children(&self) -> AllChildren<'_> {
        self.descendants(ROOT)
    }

    /// Every descendant of a node, pre-order, the node itself excluded.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> AllChildren<'_> {
        AllChildren {
            tree: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Every descendant of the root ordered by `(order_weight, text)` among
    /// siblings; the sort is stable.
    #[must_use]
    pub fn all_children_sorted(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.push_sorted(ROOT, &mut out);
        out
    }

    pub(crate) fn sorted_children(&self, id: NodeId) -> Vec<NodeId> {
        let mut kids = self.children(id).to_vec();
        kids.sort_by(|&a, &b| {
            (self.order_weight(a), self.text(a)).cmp(&(self.order_weight(b), self.text(b)))
        });
        kids
    }

    fn push_sorted(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in self.sorted_children(id) {
            out.push(child);
            self.push_sorted(child, out);
        }
    }

    /// First direct child passing a test.
    #[must_use]
    pub fn get_child(&self, parent: NodeId, test: &Test) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| test.matches(self.text(child)))
    }

    /// All direct children passing a test.
    #[must_use]
    pub fn get_children(&self, parent: NodeId, test: &Test) -> Vec<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|&child| test.matches(self.text(child)))
            .collect()
    }

    /// Follow a path of direct-child tests; `None` when any step fails.
    #[must_use]
    pub fn get_child_deep(&self, parent: NodeId, path: &[Test]) -> Option<NodeId> {
        let mut current = parent;
        for test in path {
            current = self.get_child(current, test)?;
        }
        Some(current)
    }

    /// Ancestor chain of a node, root-exclusive, topmost first, ending at the
    /// node itself.
    #[must_use]
    pub fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = id;
        while current != ROOT {
            chain.push(current);
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Texts of the lineage, topmost first.
    #[must_use]
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        self.lineage(id)
            .into_iter()
            .map(|node| self.text(node))
            .collect()
    }

    /// Align a matcher lineage against a node's ancestor chain, anchored at
    /// the node. Non-strict alignment may skip ancestors between matchers;
    /// strict alignment pins the matchers to the deepest entries one-to-one.
    #[must_use]
    pub fn lineage_test(&self, id: NodeId, matchers: &[Matcher], strict: bool) -> bool {
        let chain = self.lineage(id);
        if matchers.is_empty() || matchers.len() > chain.len() {
            return false;
        }
        if strict {
            let offset = chain.len() - matchers.len();
            return matchers
                .iter()
                .zip(&chain[offset..])
                .all(|(matcher, &node)| matcher.matches(self.text(node)));
        }
        let Some((last, rest)) = matchers.split_last() else {
            return false;
        };
        if !last.matches(self.text(id)) {
            return false;
        }
        let mut ancestors = chain[..chain.len() - 1].iter();
        'matchers: for matcher in rest {
            for &node in ancestors.by_ref() {
                if matcher.matches(self.text(node)) {
                    continue 'matchers;
                }
            }
            return false;
        }
        true
    }
}
