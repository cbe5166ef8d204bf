//! Line matchers and lineage rules
//!
//! A [`Matcher`] is the parsed form of one matcher dict (`{startswith: [...],
//! not_contains: x}`): every listed test must hold against a line's text, each
//! test being satisfied by at least one of its values (negated tests by none).
//! Patterns compile at construction so matching itself never fails.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Supported text test kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Exact string match
    Equals,
    /// Prefix match
    Startswith,
    /// Suffix match
    Endswith,
    /// Substring match
    Contains,
    /// Regular expression find
    ReSearch,
}

impl TestKind {
    /// Resolve a matcher-dict key into a kind and its polarity.
    fn from_key(key: &str) -> Option<(Self, bool)> {
        let (negate, base) = match key.strip_prefix("not_") {
            Some(rest) => (true, rest),
            None => (false, key),
        };
        let kind = match base {
            "equals" => Self::Equals,
            "startswith" => Self::Startswith,
            "endswith" => Self::Endswith,
            "contains" => Self::Contains,
            "re_search" => Self::ReSearch,
            _ => return None,
        };
        Some((kind, negate))
    }
}

/// A single test: one kind, one polarity, one or more candidate values
#[derive(Debug, Clone)]
pub struct Test {
    kind: TestKind,
    negate: bool,
    values: Vec<String>,
    /// Compiled forms of `values` when `kind` is `ReSearch`
    patterns: Vec<Regex>,
}

impl Test {
    /// Build a test, compiling `re_search` values up front.
    pub fn new(kind: TestKind, negate: bool, values: Vec<String>) -> Result<Self> {
        let mut patterns = Vec::new();
        if kind == TestKind::ReSearch {
            for value in &values {
                let pattern = Regex::new(value).map_err(|source| Error::Pattern {
                    kind: "re_search".to_string(),
                    source,
                })?;
                patterns.push(pattern);
            }
        }
        Ok(Self {
            kind,
            negate,
            values,
            patterns,
        })
    }

    /// Exact-match test
    pub fn equals(value: impl Into<String>) -> Self {
        Self::infallible(TestKind::Equals, value.into())
    }

    /// Prefix test
    pub fn startswith(value: impl Into<String>) -> Self {
        Self::infallible(TestKind::Startswith, value.into())
    }

    /// Suffix test
    pub fn endswith(value: impl Into<String>) -> Self {
        Self::infallible(TestKind::Endswith, value.into())
    }

    /// Substring test
    pub fn contains(value: impl Into<String>) -> Self {
        Self::infallible(TestKind::Contains, value.into())
    }

    /// Regular expression test
    ///
    /// # Errors
    /// Returns [`Error::Pattern`] when the pattern does not compile.
    pub fn re_search(pattern: impl Into<String>) -> Result<Self> {
        Self::new(TestKind::ReSearch, false, vec![pattern.into()])
    }

    fn infallible(kind: TestKind, value: String) -> Self {
        Self {
            kind,
            negate: false,
            values: vec![value],
            patterns: Vec::new(),
        }
    }

    /// Evaluate the test against a line's text.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let hit = match self.kind {
            TestKind::Equals => self.values.iter().any(|v| text == v),
            TestKind::Startswith => self.values.iter().any(|v| text.starts_with(v)),
            TestKind::Endswith => self.values.iter().any(|v| text.ends_with(v)),
            TestKind::Contains => self.values.iter().any(|v| text.contains(v.as_str())),
            TestKind::ReSearch => self.patterns.iter().any(|re| re.is_match(text)),
        };
        hit != self.negate
    }

    /// The test kind
    #[must_use]
    pub const fn kind(&self) -> TestKind {
        self.kind
    }
}

/// Conjunction of tests parsed from one matcher dict
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "MatcherRepr")]
pub struct Matcher {
    tests: Vec<Test>,
}

impl Matcher {
    /// Build a matcher from explicit tests.
    #[must_use]
    pub fn new(tests: Vec<Test>) -> Self {
        Self { tests }
    }

    /// Single-test convenience constructor.
    #[must_use]
    pub fn single(test: Test) -> Self {
        Self { tests: vec![test] }
    }

    /// A matcher satisfied when every test passes.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.tests.iter().all(|t| t.matches(text))
    }

    /// The tests of this matcher
    #[must_use]
    pub fn tests(&self) -> &[Test] {
        &self.tests
    }
}

/// Wire form of a matcher dict: map from test key to string-or-list
#[derive(Deserialize)]
#[serde(transparent)]
struct MatcherRepr(BTreeMap<String, OneOrMany>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl TryFrom<MatcherRepr> for Matcher {
    type Error = Error;

    fn try_from(repr: MatcherRepr) -> Result<Self> {
        let mut tests = Vec::with_capacity(repr.0.len());
        for (key, values) in repr.0 {
            let (kind, negate) =
                TestKind::from_key(&key).ok_or_else(|| Error::UnknownMatcher(key.clone()))?;
            tests.push(Test::new(kind, negate, values.into_vec())?);
        }
        Ok(Self { tests })
    }
}

/// A lineage of matchers, applied to a node's ancestor chain
#[derive(Debug, Clone, Deserialize)]
pub struct LineageRule {
    /// Matchers aligned against the ancestor chain, deepest last
    pub lineage: Vec<Matcher>,
}

impl LineageRule {
    /// Build a rule from matchers, deepest last.
    #[must_use]
    pub fn new(lineage: Vec<Matcher>) -> Self {
        Self { lineage }
    }
}

/// Deserialize a string-or-list field into a set of strings.
pub(crate) fn string_or_set<'de, D>(
    deserializer: D,
) -> std::result::Result<std::collections::BTreeSet<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let repr = OneOrMany::deserialize(deserializer)?;
    Ok(repr.into_vec().into_iter().collect())
}
