//! Unused-object fixup: relax negations of unreferenced policy objects
//!
//! Objects declared at the top level (prefix lists, route maps, class maps,
//! …) that nothing else in the running config references can be removed by
//! name instead of line by line. The matching remediation negation is
//! rewritten to `no <prefix> <name>` and tagged through the `unused_object`
//! scenario.

use super::{FixupContext, RemediationFixup, Scenario, ScenarioAction};
use crate::error::Result;
use crate::host::{Host, Os};
use crate::matcher::Test;
use crate::tree::{ConfigTree, ROOT};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const IOS_OBJECTS: &[&str] = &[
    "ip prefix-list",
    "ipv6 access-list",
    "ip as-path access-list",
    "ipv6 prefix-list",
    "ipv6 general-prefix",
    "route-map",
    "ip access-list extended",
    "class-map match-any",
    "class-map match-all",
];

const EOS_OBJECTS: &[&str] = &[
    "ip prefix-list",
    "ipv6 access-list",
    "ip as-path access-list",
    "ipv6 prefix-list",
    "route-map",
    "ip access-list extended",
    "class-map match-any",
    "class-map match-all",
];

const NXOS_OBJECTS: &[&str] = &[
    "object-group ip port",
    "object-group ipv6 port",
    "object-group ip address",
    "object-group ipv6 address",
    "ip prefix-list",
    "ipv6 access-list",
    "ip as-path access-list",
    "ipv6 prefix-list",
    "route-map",
    "ip access-list",
];

const IOSXR_OBJECTS: &[&str] = &[
    "route-policy",
    "community-set",
    "extcommunity-set rt",
    "extcommunity-set soo",
    "ipv4 access-list",
    "ipv6 access-list",
    "class-map match-any",
    "class-map match-all",
    "policy-map",
];

/// Rewrites negations of policy objects nothing references
pub struct UnusedObjects {
    scenarios: BTreeMap<String, Scenario>,
}

impl UnusedObjects {
    /// Create the fixup with its `unused_object` scenario.
    #[must_use]
    pub fn new() -> Self {
        let mut scenarios = BTreeMap::new();
        scenarios.insert(
            "unused_object".to_string(),
            Scenario {
                tags: BTreeSet::from(["safe".to_string(), "unused_object".to_string()]),
                comments: BTreeSet::from(["unused object".to_string()]),
                actions: vec![ScenarioAction::AddToNode],
            },
        );
        Self { scenarios }
    }

    /// Object-declaration prefixes per OS; `None` means incompatible.
    fn object_prefixes(os: &Os) -> Option<&'static [&'static str]> {
        match os {
            Os::Ios => Some(IOS_OBJECTS),
            Os::Eos => Some(EOS_OBJECTS),
            Os::Nxos => Some(NXOS_OBJECTS),
            Os::Iosxr => Some(IOSXR_OBJECTS),
            Os::Other(_) => None,
        }
    }

    fn scrub_unused(&self, ctx: &mut FixupContext<'_>, prefix: &str) -> Result<()> {
        let declarations = ctx.running.get_children(ROOT, &Test::startswith(prefix));
        let skip_words = prefix.split_whitespace().count();
        for declaration in declarations {
            let line = ctx.running.text(declaration).to_string();
            let Some(token) = line.split_whitespace().nth(skip_words) else {
                continue;
            };
            // strip an argument list, e.g. RP-CUSTOMER($PFX) -> RP-CUSTOMER
            let name = token.split('(').next().unwrap_or(token);
            let negated = format!("no {line}");
            let Some(target) = ctx
                .remediation
                .get_child(ROOT, &Test::equals(negated.as_str()))
            else {
                continue;
            };
            if object_in_use(ctx.running, prefix, name) {
                continue;
            }
            let new_text = format!("no {prefix}{name}");
            self.apply_scenario(ctx, "unused_object", target, Some(&new_text))?;
            debug!(object = name, "rewrote negation of unused object");
        }
        Ok(())
    }
}

impl Default for UnusedObjects {
    fn default() -> Self {
        Self::new()
    }
}

impl RemediationFixup for UnusedObjects {
    fn name(&self) -> &'static str {
        "unused_objects"
    }

    fn scenarios(&self) -> &BTreeMap<String, Scenario> {
        &self.scenarios
    }

    fn is_compatible(&self, host: &Host) -> bool {
        Self::object_prefixes(&host.os).is_some()
    }

    fn fix(&self, ctx: &mut FixupContext<'_>) -> Result<()> {
        let Some(prefixes) = Self::object_prefixes(&ctx.host.os) else {
            return Ok(());
        };
        for prefix in prefixes {
            // canonicalize to a single trailing space before word counting
            let prefix = format!("{} ", prefix.trim_end());
            self.scrub_unused(ctx, &prefix)?;
        }
        Ok(())
    }
}

/// Whether any non-declaration line references the object name.
fn object_in_use(running: &ConfigTree, prefix: &str, name: &str) -> bool {
    let infix = format!(" {name} ");
    let call = format!(" {name}(");
    let suffix = format!(" {name}");
    for id in running.all_children() {
        let text = running.text(id);
        if running.depth(id) == 1 && text.starts_with(prefix) {
            continue;
        }
        if text.contains(&infix) || text.contains(&call) || text.ends_with(&suffix) {
            return true;
        }
    }
    false
}
