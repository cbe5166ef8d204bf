//! Remediation options: the OS-specific knobs consumed by the delta engine
//! and the renderer
//!
//! Options arrive already parsed (collaborators author them in YAML); every
//! rule type derives `Deserialize`, with regular expressions compiled at
//! construction.

use crate::error::{Error, Result};
use crate::matcher::{LineageRule, Matcher};
use regex::Regex;
use serde::Deserialize;

/// Device-specific remediation options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Word prefixed to a line to negate it
    pub negation: String,
    /// Commands where a new value replaces the prior one in place
    pub idempotent_commands: Vec<LineageRule>,
    /// Sections replaced wholesale (negate, then re-enter)
    pub sectional_overwrite: Vec<LineageRule>,
    /// Sections replaced wholesale without a preceding negation
    pub sectional_overwrite_no_negate: Vec<LineageRule>,
    /// Synthetic terminator lines appended to matching sections
    pub sectional_exiting: Vec<SectionalExit>,
    /// Serialization order weights
    pub ordering: Vec<OrderingRule>,
    /// Per-line substitutions applied while parsing
    pub per_line_sub: Vec<TextSub>,
    /// Whole-text substitutions applied before line parsing
    pub full_text_sub: Vec<TextSub>,
    /// Parents whose children may share identical text
    pub parent_allows_duplicate_child: Vec<LineageRule>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            negation: "no".to_string(),
            idempotent_commands: Vec::new(),
            sectional_overwrite: Vec::new(),
            sectional_overwrite_no_negate: Vec::new(),
            sectional_exiting: Vec::new(),
            ordering: Vec::new(),
            per_line_sub: Vec::new(),
            full_text_sub: Vec::new(),
            parent_allows_duplicate_child: Vec::new(),
        }
    }
}

/// Terminator line injected at the end of a matching section
#[derive(Debug, Clone, Deserialize)]
pub struct SectionalExit {
    /// Sections the rule applies to, deepest matcher last
    pub lineage: Vec<Matcher>,
    /// Terminator text, e.g. `exit-peer-policy`
    pub exit_text: String,
}

/// Order weight assigned to lines matching a lineage
#[derive(Debug, Clone, Deserialize)]
pub struct OrderingRule {
    /// Lines the rule applies to, deepest matcher last
    pub lineage: Vec<Matcher>,
    /// Sort weight; lower serializes earlier
    pub weight: i32,
}

/// A regex substitution over raw configuration text
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "TextSubRepr")]
pub struct TextSub {
    search: Regex,
    replace: String,
}

impl TextSub {
    /// Build a substitution rule.
    ///
    /// # Errors
    /// Returns [`Error::Pattern`] when the search pattern does not compile.
    pub fn new(search: &str, replace: impl Into<String>) -> Result<Self> {
        let search = Regex::new(search).map_err(|source| Error::Pattern {
            kind: "search".to_string(),
            source,
        })?;
        Ok(Self {
            search,
            replace: replace.into(),
        })
    }

    /// Apply the substitution to a piece of text.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        self.search
            .replace_all(text, self.replace.as_str())
            .into_owned()
    }
}

/// Wire form of a substitution rule
#[derive(Deserialize)]
struct TextSubRepr {
    search: String,
    replace: String,
}

impl TryFrom<TextSubRepr> for TextSub {
    type Error = Error;

    fn try_from(repr: TextSubRepr) -> Result<Self> {
        Self::new(&repr.search, repr.replace)
    }
}
