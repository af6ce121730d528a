// src/error.rs

//! Error types for package and recipe parsing

use thiserror::Error;

/// Errors produced while reading package metadata or recipes
#[derive(Error, Debug)]
pub enum Error {
    /// Reader was constructed without exactly one input source
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Package archive lacks a required member (e.g. `.PKGINFO`)
    #[error("Archive is missing required member: {0}")]
    MissingMember(String),

    /// A typed field could not be coerced from its textual value
    #[error("Failed to coerce field '{field}' from '{value}': {reason}")]
    FieldCoercion {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Quote, array literal or function body still open at end of input
    #[error("Unterminated {construct} starting on line {line}")]
    Unterminated { construct: &'static str, line: usize },

    /// Variable expansion nested deeper than the configured budget
    #[error("Substitution of '{symbol}' exceeded the maximum depth of {limit}")]
    SubstitutionDepth { symbol: String, limit: usize },

    /// Variable expansion referred back to a symbol already being expanded
    #[error("Cyclic variable substitution: {0}")]
    SubstitutionCycle(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a coercion error for `field` holding `value`
    pub(crate) fn coercion(
        field: &'static str,
        value: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::FieldCoercion {
            field,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}
