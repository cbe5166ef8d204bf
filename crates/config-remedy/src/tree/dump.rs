//! Stable, versioned serialization of a configuration tree
//!
//! `load(dump(t))` reproduces `t` structurally and by equality. The same
//! nested record type backs deep/shallow copies between trees, so copy and
//! dump semantics cannot drift apart.

use super::node::{ConfigTree, DEFAULT_ORDER_WEIGHT, NodeId, ROOT};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Current dump format version
pub const DUMP_VERSION: u32 = 1;

/// Serialized form of a whole tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeDump {
    /// Format version, checked on load
    pub version: u32,
    /// The root record; its text is empty
    pub root: NodeDump,
}

/// Serialized form of one node and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDump {
    /// Command text
    pub text: String,
    /// Tags set directly on the node
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Trailing comments
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub comments: BTreeSet<String>,
    /// Sort weight
    #[serde(default = "default_order_weight")]
    pub order_weight: i32,
    /// Delta-introduced flag
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub new_in_config: bool,
    /// Prior text values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<String>,
    /// Child records, insertion-ordered
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDump>,
}

const fn default_order_weight() -> i32 {
    DEFAULT_ORDER_WEIGHT
}

impl ConfigTree {
    /// Serialize the full tree state.
    #[must_use]
    pub fn dump(&self) -> TreeDump {
        TreeDump {
            version: DUMP_VERSION,
            root: self.subtree_dump(ROOT),
        }
    }

    /// Rebuild tree content from a dump, grafting under the root.
    ///
    /// # Errors
    /// Returns [`Error::DumpVersion`] for an unrecognized format version.
    pub fn load_from_dump(&mut self, dump: &TreeDump) -> Result<()> {
        if dump.version != DUMP_VERSION {
            return Err(Error::DumpVersion(dump.version));
        }
        let root_tags = dump.root.tags.iter().cloned();
        let root_comments = dump.root.comments.iter().cloned();
        self.node_mut(ROOT).tags.extend(root_tags);
        self.node_mut(ROOT).comments.extend(root_comments);
        for child in &dump.root.children {
            self.graft(ROOT, child);
        }
        Ok(())
    }

    /// Dump to a JSON string.
    ///
    /// # Errors
    /// Returns [`Error::Serialization`] when encoding fails.
    pub fn dump_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.dump())?)
    }

    /// Load tree content from a JSON dump.
    ///
    /// # Errors
    /// Returns [`Error::Serialization`] for malformed JSON and
    /// [`Error::DumpVersion`] for an unrecognized format version.
    pub fn load_from_dump_json(&mut self, json: &str) -> Result<()> {
        let dump: TreeDump = serde_json::from_str(json)?;
        self.load_from_dump(&dump)
    }

    /// Record for one node and everything below it.
    pub(crate) fn subtree_dump(&self, id: NodeId) -> NodeDump {
        let mut record = self.node_dump_shallow(id);
        record.children = self
            .children(id)
            .iter()
            .map(|&child| self.subtree_dump(child))
            .collect();
        record
    }

    /// Record for one node without its children.
    pub(crate) fn node_dump_shallow(&self, id: NodeId) -> NodeDump {
        let node = self.node(id);
        NodeDump {
            text: node.text.clone(),
            tags: node.tags.clone(),
            comments: node.comments.clone(),
            order_weight: node.order_weight,
            new_in_config: node.new_in_config,
            instances: node.instances.clone(),
            children: Vec::new(),
        }
    }

    /// Graft a record under `parent`, merging into an existing same-text
    /// child where sibling texts must stay unique.
    pub(crate) fn graft(&mut self, parent: NodeId, dump: &NodeDump) -> NodeId {
        let id = self.add_child(parent, &dump.text);
        {
            let node = self.node_mut(id);
            node.tags.extend(dump.tags.iter().cloned());
            node.comments.extend(dump.comments.iter().cloned());
            node.order_weight = dump.order_weight;
            node.new_in_config |= dump.new_in_config;
            node.instances.extend(dump.instances.iter().cloned());
        }
        for child in &dump.children {
            self.graft(id, child);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Host, Os};
    use crate::options::Options;
    use std::sync::Arc;

    fn host() -> Arc<Host> {
        Arc::new(Host::new("test.rtr", Os::Ios, Options::default()))
    }

    #[test]
    fn test_dump_round_trip() {
        let mut pre = ConfigTree::new(host());
        let a1 = pre.add_child(ROOT, "a1");
        let b2 = pre.add_child(a1, "b2");
        pre.set_weight(b2, 400);
        pre.append_tag(b2, "test");
        pre.add_comment(b2, "test comment");
        pre.set_new_in_config(b2, true);

        let dump = pre.dump();
        let mut post = ConfigTree::new(host());
        post.load_from_dump(&dump).expect("load");
        assert_eq!(pre, post);
    }

    #[test]
    fn test_dump_json_round_trip() {
        let mut pre = ConfigTree::new(host());
        let vlan = pre.add_child(ROOT, "interface Vlan2");
        pre.add_child(vlan, "ip address 192.168.1.1/24");

        let json = pre.dump_json().expect("encode");
        let mut post = ConfigTree::new(host());
        post.load_from_dump_json(&json).expect("decode");
        assert_eq!(pre, post);
    }

    #[test]
    fn test_version_check() {
        let mut dump = ConfigTree::new(host()).dump();
        dump.version = 99;
        let mut post = ConfigTree::new(host());
        assert!(matches!(
            post.load_from_dump(&dump),
            Err(crate::error::Error::DumpVersion(99))
        ));
    }
}
