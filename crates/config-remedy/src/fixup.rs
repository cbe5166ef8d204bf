//! Remediation fixups: OS-specific post-processors over a remediation tree
//!
//! A fixup declares named scenarios (tags, comments, tagging actions) and a
//! body that rewrites selected remediation nodes. Dispatch skips hosts the
//! fixup is not compatible with and only runs when the caller's active tags
//! intersect the scenarios' tags (or include `all`).

mod unused_objects;

pub use unused_objects::UnusedObjects;

use crate::error::{Error, Result};
use crate::host::Host;
use crate::matcher::LineageRule;
use crate::tree::{ConfigTree, NodeId};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Tag that activates every fixup regardless of scenario tags
pub const ALL_TAG: &str = "all";

/// How a scenario's tags spread from the node it is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioAction {
    /// Tag the node itself
    #[serde(alias = "node")]
    AddToNode,
    /// Tag the node and every descendant
    #[serde(alias = "children")]
    AddToChildren,
    /// Tag the node and every ancestor
    #[serde(alias = "parents")]
    AddToParents,
}

/// A named bundle of tags, comments and tagging actions
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Tags applied per the actions
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Comments unioned onto the acted-on node
    #[serde(default)]
    pub comments: BTreeSet<String>,
    /// Tagging actions, applied in order
    #[serde(default)]
    pub actions: Vec<ScenarioAction>,
}

/// The trees a fixup operates over, alongside the host descriptor
pub struct FixupContext<'a> {
    /// The device host
    pub host: &'a Host,
    /// The device's running configuration
    pub running: &'a ConfigTree,
    /// The remediation tree being rewritten
    pub remediation: &'a mut ConfigTree,
}

impl<'a> FixupContext<'a> {
    /// Bundle the facts a fixup needs.
    pub fn new(host: &'a Host, running: &'a ConfigTree, remediation: &'a mut ConfigTree) -> Self {
        Self {
            host,
            running,
            remediation,
        }
    }
}

/// A host-bound rewrite over a remediation tree
pub trait RemediationFixup {
    /// Stable fixup name, used in logs
    fn name(&self) -> &'static str;

    /// The scenarios this fixup can apply
    fn scenarios(&self) -> &BTreeMap<String, Scenario>;

    /// Whether the fixup understands this host's OS
    fn is_compatible(&self, host: &Host) -> bool;

    /// The fixup body; only called through [`RemediationFixup::run`].
    ///
    /// # Errors
    /// Implementations fail fast on unknown scenario names.
    fn fix(&self, ctx: &mut FixupContext<'_>) -> Result<()>;

    /// Union of all scenario tags.
    fn scenario_tags(&self) -> BTreeSet<String> {
        self.scenarios()
            .values()
            .flat_map(|scenario| scenario.tags.iter().cloned())
            .collect()
    }

    /// Run the body when the host is compatible and the active tags select
    /// this fixup; incompatible hosts are skipped silently.
    fn run(&self, ctx: &mut FixupContext<'_>, active_tags: &BTreeSet<String>) -> Result<()> {
        if !self.is_compatible(ctx.host) {
            debug!(fixup = self.name(), os = %ctx.host.os, "skipping incompatible fixup");
            return Ok(());
        }
        let selected = active_tags.contains(ALL_TAG)
            || !self.scenario_tags().is_disjoint(active_tags);
        if selected {
            self.fix(ctx)?;
        }
        Ok(())
    }

    /// Apply a scenario to one node, optionally rewriting its text first.
    ///
    /// # Errors
    /// Returns [`Error::UnknownScenario`] for an undeclared name.
    fn apply_scenario(
        &self,
        ctx: &mut FixupContext<'_>,
        name: &str,
        node: NodeId,
        new_text: Option<&str>,
    ) -> Result<()> {
        let scenario = self
            .scenarios()
            .get(name)
            .ok_or_else(|| Error::UnknownScenario(name.to_string()))?
            .clone();
        if let Some(text) = new_text {
            ctx.remediation.set_text(node, text);
        }
        for action in &scenario.actions {
            let targets: Vec<NodeId> = match action {
                ScenarioAction::AddToNode => vec![node],
                ScenarioAction::AddToChildren => {
                    let mut ids = vec![node];
                    ids.extend(ctx.remediation.descendants(node));
                    ids
                }
                ScenarioAction::AddToParents => ctx.remediation.lineage(node),
            };
            for target in targets {
                ctx.remediation
                    .append_tags(target, scenario.tags.iter().cloned());
            }
        }
        for comment in &scenario.comments {
            ctx.remediation.add_comment(node, comment.clone());
        }
        Ok(())
    }

    /// Apply a scenario to every remediation descendant matching any rule.
    ///
    /// # Errors
    /// Returns [`Error::UnknownScenario`] for an undeclared name.
    fn apply_scenario_via_rules(
        &self,
        ctx: &mut FixupContext<'_>,
        name: &str,
        rules: &[LineageRule],
    ) -> Result<()> {
        let ids: Vec<NodeId> = ctx.remediation.all_children().collect();
        for rule in rules {
            for &id in &ids {
                if ctx.remediation.lineage_test(id, &rule.lineage, false) {
                    self.apply_scenario(ctx, name, id, None)?;
                }
            }
        }
        Ok(())
    }
}

/// All built-in fixups, in application order.
#[must_use]
pub fn builtin_fixups() -> Vec<Box<dyn RemediationFixup>> {
    vec![Box::new(UnusedObjects::new())]
}

/// Drive every built-in fixup over the context.
///
/// # Errors
/// Propagates the first fixup failure.
pub fn run_fixups(ctx: &mut FixupContext<'_>, active_tags: &BTreeSet<String>) -> Result<()> {
    for fixup in builtin_fixups() {
        fixup.run(ctx, active_tags)?;
    }
    Ok(())
}
