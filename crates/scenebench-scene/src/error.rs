//! Error types for scene text handling
//!
//! The decoder itself never fails; these errors belong to the strict
//! syntax check and to parsing catalog labels.

/// Strict syntax validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// Scene text was empty or whitespace only
    #[error("USD content is empty")]
    Empty,

    /// First line is not a `#usda` version declaration
    #[error("USD content must start with a '#usda' version header")]
    MissingVersionHeader,

    /// No `def <Type> "<name>"` declaration anywhere in the text
    #[error("USD content contains no prim declarations")]
    NoPrimDeclaration,
}

/// Unknown label for a catalog enum (kind, color, direction, tier, ...)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
