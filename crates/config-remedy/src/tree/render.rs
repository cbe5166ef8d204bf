//! Rendering trees back to device-style text

use super::node::{ConfigTree, NodeId};
use std::fmt;
use std::sync::Arc;

/// Spaces added per nesting level below the first
const INDENT_STEP: usize = 2;

/// Weight of injected sectional-exit terminators; sorts after real children
const SECTIONAL_EXIT_WEIGHT: i32 = 999;

impl ConfigTree {
    /// The line as a device renders it: two spaces per nesting level below
    /// the top level, then the text.
    #[must_use]
    pub fn cisco_style_text(&self, id: NodeId) -> String {
        let depth = self.depth(id);
        let indent = INDENT_STEP * depth.saturating_sub(1);
        format!("{}{}", " ".repeat(indent), self.text(id))
    }

    /// Append configured terminator lines (e.g. `exit-peer-policy`) to every
    /// section matching a `sectional_exiting` rule.
    pub fn add_sectional_exiting(&mut self) {
        let host = Arc::clone(&self.host);
        let ids: Vec<NodeId> = self.all_children().collect();
        for rule in &host.options.sectional_exiting {
            for &id in &ids {
                if self.lineage_test(id, &rule.lineage, false) {
                    let exit = self.add_child(id, &rule.exit_text);
                    self.set_weight(exit, SECTIONAL_EXIT_WEIGHT);
                }
            }
        }
    }
}

impl fmt::Display for ConfigTree {
    /// Serialize in sorted traversal order, comments trailing each line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.all_children_sorted() {
            f.write_str(&self.cisco_style_text(id))?;
            let comments = self.comments(id);
            if !comments.is_empty() {
                let joined: Vec<&str> = comments.iter().map(String::as_str).collect();
                write!(f, " ! {}", joined.join(", "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
