//! Router error types.
//!
//! [`RouterError`] covers caller mistakes and is returned directly.
//! [`PageError`] covers module loading and rendering; the router turns it
//! into the fallback view and never propagates it.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("Invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Same pattern or same route name registered twice.
    #[error("Route already registered: {0}")]
    DuplicateRoute(String),

    #[error("No route named `{0}`")]
    UnknownRouteName(String),

    #[error("Route `{route}` needs parameter `{param}`")]
    MissingParam { route: String, param: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("Page module not found: {0}")]
    ModuleNotFound(String),

    #[error("Failed to load page module `{module}`: {reason}")]
    Load { module: String, reason: String },

    #[error("Failed to render page: {0}")]
    Render(String),

    #[error("Page init failed: {0}")]
    Init(String),

    /// The configured mount point is not in the tree.
    #[error("Mount target not found: {0}")]
    MountNotFound(String),
}
