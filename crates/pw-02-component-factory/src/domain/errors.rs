//! Component factory error types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// Kind names must be non-empty identifiers.
    #[error("Invalid component kind: {0:?}")]
    InvalidKind(String),

    #[error("Component kind already registered: {0}")]
    DuplicateKind(String),

    #[error("Component kind not registered: {0}")]
    UnknownKind(String),

    /// A selector target did not resolve to a live handle.
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    /// The kind's constructor refused to build an instance.
    #[error("Failed to construct `{kind}`: {reason}")]
    Construction { kind: String, reason: String },

    /// Options or default config were not a JSON object.
    #[error("Invalid options for `{kind}`: {reason}")]
    InvalidOptions { kind: String, reason: String },

    #[error("Template not registered: {0}")]
    TemplateNotFound(String),
}

impl ComponentError {
    /// Convenience for constructors reporting their own failure.
    pub fn construction(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Construction {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}
