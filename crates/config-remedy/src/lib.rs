//! config-remedy library
//!
//! This library models hierarchical network-device configurations (Cisco
//! IOS/EOS/NX-OS/IOS-XR style indentation-based configs) as trees of text
//! lines and computes remediation configurations: the ordered command set
//! that transforms a device's running configuration into a desired compiled
//! configuration. Remediation lines can be classified with tag rules and
//! rewritten by OS-specific fixups.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use config_remedy::{ConfigTree, Host, Options, Os, ROOT};
//!
//! let host = Arc::new(Host::new("edge1.example.net", Os::Ios, Options::default()));
//!
//! let mut running = ConfigTree::new(Arc::clone(&host));
//! running
//!     .load_from_string("interface Vlan2\n ip address 10.0.2.1 255.255.255.0")
//!     .unwrap();
//!
//! let mut compiled = ConfigTree::new(Arc::clone(&host));
//! compiled.load_from_string("interface Vlan3").unwrap();
//!
//! let remediation = running.config_to_get_to(&compiled);
//! assert_eq!(remediation.to_string(), "interface Vlan3\nno interface Vlan2\n");
//! ```
//!
//! # Architecture
//!
//! - [`tree`] - the arena-backed configuration tree, parsing, rendering and
//!   the versioned dump format
//! - [`matcher`] - line tests and matcher dicts evaluated over lineages
//! - [`tags`] - tag queries, tag filters and tag rules
//! - [`delta`] - the remediation and difference engines
//! - [`host`] / [`options`] - the host descriptor and its remediation options
//! - [`fixup`] - scenario-driven rewrites of remediation trees
//! - [`error`] - unified error types

pub mod delta;
pub mod error;
pub mod fixup;
pub mod host;
pub mod matcher;
pub mod options;
pub mod tags;
pub mod tree;

pub use error::{Error, Result};
pub use fixup::{
    ALL_TAG, FixupContext, RemediationFixup, Scenario, ScenarioAction, UnusedObjects,
    builtin_fixups, run_fixups,
};
pub use host::{Host, Os};
pub use matcher::{LineageRule, Matcher, Test, TestKind};
pub use options::{Options, OrderingRule, SectionalExit, TextSub};
pub use tags::{EffectiveTags, TagFilter, TagRule};
pub use tree::{ConfigTree, DUMP_VERSION, NodeDump, NodeId, ROOT, TreeDump};
