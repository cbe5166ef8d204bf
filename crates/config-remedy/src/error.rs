//! Error types for config-remedy

use std::io;
use thiserror::Error;

/// Config-remedy error type
#[derive(Error, Debug)]
pub enum Error {
    /// Parsing error with the offending line number
    #[error("Parse error at line {line}: {reason}")]
    Parse {
        /// 1-based line number in the input text
        line: usize,
        /// What went wrong
        reason: String,
    },

    /// Unknown matcher kind in a rule
    #[error("Unknown matcher kind: {0}")]
    UnknownMatcher(String),

    /// Invalid regular expression in a matcher or substitution rule
    #[error("Invalid pattern for {kind}: {source}")]
    Pattern {
        /// Rule key the pattern belongs to
        kind: String,
        /// Underlying regex error
        source: regex::Error,
    },

    /// Unknown fixup scenario name
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    /// Unsupported tree dump version
    #[error("Unsupported dump version: {0}")]
    DumpVersion(u32),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Config-remedy result type
pub type Result<T> = std::result::Result<T, Error>;
