//! The delta engine: computing remediation and difference trees
//!
//! `config_to_get_to` walks running and compiled trees in lockstep. The left
//! pass negates running-only lines; the right pass adds compiled-only
//! subtrees, recursing through shared sections and honoring idempotent and
//! sectional-overwrite options along the way.

use crate::matcher::LineageRule;
use crate::options::Options;
use crate::tree::{ConfigTree, DEFAULT_ORDER_WEIGHT, NEGATION_ORDER_WEIGHT, NodeId, ROOT};
use std::sync::Arc;
use tracing::debug;

impl ConfigTree {
    /// Compute the remediation tree: the ordered commands that transform this
    /// (running) configuration into `target` (the compiled configuration).
    #[must_use]
    pub fn config_to_get_to(&self, target: &ConfigTree) -> ConfigTree {
        let mut delta = ConfigTree::new(Arc::clone(&self.host));
        self.delta_between(ROOT, target, ROOT, &mut delta, ROOT);
        delta.set_order_weight();
        debug!(lines = delta.all_children().count(), "computed remediation");
        delta
    }

    fn delta_between(
        &self,
        run: NodeId,
        target: &ConfigTree,
        tgt: NodeId,
        delta: &mut ConfigTree,
        out: NodeId,
    ) {
        self.delta_left(run, target, tgt, delta, out);
        self.delta_right(run, target, tgt, delta, out);
    }

    /// Negate lines present here but absent from the target.
    fn delta_left(
        &self,
        run: NodeId,
        target: &ConfigTree,
        tgt: NodeId,
        delta: &mut ConfigTree,
        out: NodeId,
    ) {
        let options = &self.host.options;
        for &child in self.children(run) {
            let text = self.text(child);
            if target.child_by_text(tgt, text).is_some() {
                continue;
            }
            if self.new_in_config(child) {
                continue;
            }
            if self.matches_any(child, &options.sectional_overwrite_no_negate) {
                continue;
            }
            // a same-family line in the target replaces this one in place
            if idempotent_partner(options, self, child, target, tgt).is_some() {
                continue;
            }
            // negating the parent is enough; children are never enumerated
            let negation = delta.add_child(out, text);
            delta.negate(negation);
        }
    }

    /// Add lines present in the target but absent here, recursing into
    /// sections both sides carry.
    fn delta_right(
        &self,
        run: NodeId,
        target: &ConfigTree,
        tgt: NodeId,
        delta: &mut ConfigTree,
        out: NodeId,
    ) {
        let options = &self.host.options;
        for &wanted in target.children(tgt) {
            let text = target.text(wanted);
            match self.child_by_text(run, text) {
                None => {
                    if let Some(prior) = idempotent_partner(options, target, wanted, self, run) {
                        let line = delta.add_child(out, text);
                        let replaced = self.text(prior).to_string();
                        delta.node_mut(line).instances.push(replaced);
                        continue;
                    }
                    let copy = delta.add_deep_copy_of(out, target, wanted);
                    delta.mark_new_in_config(copy);
                }
                Some(present) => {
                    if self.same_lines(present, target, wanted) {
                        continue;
                    }
                    if self.matches_any(present, &options.sectional_overwrite) {
                        let negation = delta.add_child(out, text);
                        delta.negate(negation);
                        let section = delta.add_child(out, text);
                        delta.overwrite_with(section, target, wanted);
                        continue;
                    }
                    if self.matches_any(present, &options.sectional_overwrite_no_negate) {
                        let section = delta.add_child(out, text);
                        delta.overwrite_with(section, target, wanted);
                        continue;
                    }
                    let container = delta.add_child(out, text);
                    self.delta_between(present, target, wanted, delta, container);
                    if !delta.has_children(container) {
                        delta.del_child(container);
                    }
                }
            }
        }
    }

    /// Subtree of this tree not present in `other`, recursively, without
    /// negations.
    #[must_use]
    pub fn difference(&self, other: &ConfigTree) -> ConfigTree {
        let mut out = ConfigTree::new(Arc::clone(&self.host));
        self.difference_at(ROOT, other, ROOT, &mut out, ROOT);
        out
    }

    fn difference_at(
        &self,
        node: NodeId,
        other: &ConfigTree,
        counterpart: NodeId,
        out: &mut ConfigTree,
        parent: NodeId,
    ) {
        for &child in self.children(node) {
            match other.child_by_text(counterpart, self.text(child)) {
                None => {
                    out.add_deep_copy_of(parent, self, child);
                }
                Some(matching) => {
                    let container = out.add_child(parent, self.text(child));
                    self.difference_at(child, other, matching, out, container);
                    if !out.has_children(container) {
                        out.del_child(container);
                    }
                }
            }
        }
    }

    /// Replace a section's children with those of `src_node`, recording the
    /// displaced texts as instances.
    pub fn overwrite_with(&mut self, node: NodeId, src: &ConfigTree, src_node: NodeId) {
        let displaced: Vec<NodeId> = self.children(node).to_vec();
        for child in displaced {
            let text = self.text(child).to_string();
            self.del_child(child);
            self.node_mut(node).instances.push(text);
        }
        for &src_child in src.children(src_node) {
            self.add_deep_copy_of(node, src, src_child);
        }
    }

    /// Apply ordering rules, then push unmatched negations after additions.
    pub fn set_order_weight(&mut self) {
        let host = Arc::clone(&self.host);
        let negation_prefix = format!("{} ", host.options.negation);
        let ids: Vec<NodeId> = self.all_children().collect();
        for &id in &ids {
            let mut matched = false;
            for rule in &host.options.ordering {
                if self.lineage_test(id, &rule.lineage, false) {
                    self.set_weight(id, rule.weight);
                    matched = true;
                }
            }
            if !matched
                && self.order_weight(id) == DEFAULT_ORDER_WEIGHT
                && self.text(id).starts_with(&negation_prefix)
            {
                self.set_weight(id, NEGATION_ORDER_WEIGHT);
            }
        }
    }

    /// Flag a subtree as introduced by the delta engine.
    pub(crate) fn mark_new_in_config(&mut self, id: NodeId) {
        self.set_new_in_config(id, true);
        let ids: Vec<NodeId> = self.descendants(id).collect();
        for descendant in ids {
            self.set_new_in_config(descendant, true);
        }
    }

    /// Text-structural equality of two subtrees, order-sensitive.
    fn same_lines(&self, node: NodeId, other: &ConfigTree, counterpart: NodeId) -> bool {
        self.text(node) == other.text(counterpart)
            && self.children(node).len() == other.children(counterpart).len()
            && self
                .children(node)
                .iter()
                .zip(other.children(counterpart))
                .all(|(&a, &b)| self.same_lines(a, other, b))
    }

    fn matches_any(&self, node: NodeId, rules: &[LineageRule]) -> bool {
        rules
            .iter()
            .any(|rule| self.lineage_test(node, &rule.lineage, false))
    }
}

/// Find a running-side sibling that an idempotent rule pairs with `node`.
fn idempotent_partner(
    options: &Options,
    node_tree: &ConfigTree,
    node: NodeId,
    sibling_tree: &ConfigTree,
    sibling_parent: NodeId,
) -> Option<NodeId> {
    for rule in &options.idempotent_commands {
        if !node_tree.lineage_test(node, &rule.lineage, false) {
            continue;
        }
        for &sibling in sibling_tree.children(sibling_parent) {
            if sibling_tree.lineage_test(sibling, &rule.lineage, false) {
                return Some(sibling);
            }
        }
    }
    None
}
