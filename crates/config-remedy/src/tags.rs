//! Tag queries and tag rules
//!
//! Tags are set on individual nodes; a node's *effective* set folds over its
//! subtree, so ancestors report every tag carried below them. A subtree
//! holding an untagged leaf additionally reports the absence sentinel, which
//! is a typed filter value here rather than a magic string.

use crate::matcher::Matcher;
use crate::tree::{ConfigTree, NodeId, ROOT};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};

/// One axis of a tag filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagFilter {
    /// No constraint on this axis
    #[default]
    Unconstrained,
    /// The absence sentinel: matches subtrees holding an untagged leaf
    Untagged,
    /// Matches when the effective set intersects these tags
    Tags(BTreeSet<String>),
}

impl TagFilter {
    /// Filter on a set of tags.
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Tags(tags.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for TagFilter {
    /// The empty string is the no-constraint value.
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Unconstrained
        } else {
            Self::Tags(BTreeSet::from([value.to_string()]))
        }
    }
}

/// Effective tag set of a node: its own tags plus all descendants'
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveTags {
    /// Union of tags over the subtree
    pub tags: BTreeSet<String>,
    /// Whether the subtree holds an untagged leaf
    pub untagged: bool,
}

impl EffectiveTags {
    /// Whether the effective set carries a tag.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Exclusion is tested first; then a required axis must intersect.
    #[must_use]
    pub fn passes(&self, required: &TagFilter, excluded: &TagFilter) -> bool {
        match excluded {
            TagFilter::Unconstrained => {}
            TagFilter::Untagged => {
                if self.untagged {
                    return false;
                }
            }
            TagFilter::Tags(tags) => {
                if !self.tags.is_disjoint(tags) {
                    return false;
                }
            }
        }
        match required {
            TagFilter::Unconstrained => true,
            TagFilter::Untagged => self.untagged,
            TagFilter::Tags(tags) => !self.tags.is_disjoint(tags),
        }
    }
}

/// A tag rule: lineage matchers plus tags to add or remove
#[derive(Debug, Clone, Deserialize)]
pub struct TagRule {
    /// Nodes the rule applies to, deepest matcher last
    pub lineage: Vec<Matcher>,
    /// Tags added to matching nodes
    #[serde(default, deserialize_with = "crate::matcher::string_or_set")]
    pub add_tags: BTreeSet<String>,
    /// Tags removed from matching nodes
    #[serde(default, deserialize_with = "crate::matcher::string_or_set")]
    pub remove_tags: BTreeSet<String>,
}

impl ConfigTree {
    /// Effective tags of a node.
    #[must_use]
    pub fn effective_tags(&self, id: NodeId) -> EffectiveTags {
        let mut effective = EffectiveTags::default();
        self.fold_tags(id, &mut effective);
        effective
    }

    fn fold_tags(&self, id: NodeId, effective: &mut EffectiveTags) {
        let own = self.self_tags(id);
        effective.tags.extend(own.iter().cloned());
        if own.is_empty() && !self.has_children(id) {
            effective.untagged = true;
        }
        for &child in self.children(id) {
            self.fold_tags(child, effective);
        }
    }

    /// Per-node inclusion predicate over the effective tag set.
    #[must_use]
    pub fn line_inclusion_test(
        &self,
        id: NodeId,
        required: &TagFilter,
        excluded: &TagFilter,
    ) -> bool {
        self.effective_tags(id).passes(required, excluded)
    }

    /// Sorted traversal over nodes whose subtree holds a line passing the
    /// filter; ancestors of selected lines come along as context.
    #[must_use]
    pub fn all_children_sorted_by_tags(
        &self,
        required: &TagFilter,
        excluded: &TagFilter,
    ) -> Vec<NodeId> {
        let mut keep = HashSet::new();
        self.mark_tag_matches(ROOT, required, excluded, &mut keep);
        self.all_children_sorted()
            .into_iter()
            .filter(|id| keep.contains(id))
            .collect()
    }

    fn mark_tag_matches(
        &self,
        id: NodeId,
        required: &TagFilter,
        excluded: &TagFilter,
        keep: &mut HashSet<NodeId>,
    ) -> bool {
        let mut any = id != ROOT && self.line_inclusion_test(id, required, excluded);
        for &child in self.children(id) {
            if self.mark_tag_matches(child, required, excluded, keep) {
                any = true;
            }
        }
        if any && id != ROOT {
            keep.insert(id);
        }
        any
    }

    /// Sorted traversal over subtrees holding untagged leaves.
    #[must_use]
    pub fn all_children_sorted_untagged(&self) -> Vec<NodeId> {
        self.all_children_sorted_by_tags(&TagFilter::Untagged, &TagFilter::Unconstrained)
    }

    /// Sorted traversal over sections selected by tag-rule lineages: matched
    /// nodes, their subtrees, and the ancestor context above them.
    #[must_use]
    pub fn all_children_sorted_with_lineage_rules(&self, rules: &[TagRule]) -> Vec<NodeId> {
        let mut keep = HashSet::new();
        let ids: Vec<NodeId> = self.all_children().collect();
        for &id in &ids {
            let matched = rules
                .iter()
                .any(|rule| self.lineage_test(id, &rule.lineage, false));
            if matched {
                keep.extend(self.lineage(id));
                keep.extend(self.descendants(id));
            }
        }
        self.all_children_sorted()
            .into_iter()
            .filter(|id| keep.contains(id))
            .collect()
    }

    /// Apply tag rules to every descendant, in rule-list order.
    pub fn add_tags(&mut self, rules: &[TagRule]) {
        let ids: Vec<NodeId> = self.all_children().collect();
        for rule in rules {
            for &id in &ids {
                if self.lineage_test(id, &rule.lineage, false) {
                    let added: Vec<String> = rule.add_tags.iter().cloned().collect();
                    self.append_tags(id, added);
                    let removed: Vec<String> = rule.remove_tags.iter().cloned().collect();
                    self.remove_tags(id, removed.iter().map(String::as_str));
                }
            }
        }
    }
}
