//! Service locator error types.

use thiserror::Error;

/// Boxed error returned by service constructors and factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// No registration under this name in any table.
    #[error("Service not registered: {0}")]
    NotRegistered(String),

    /// A declared dependency of `service` is not registered.
    #[error("Service `{service}` depends on unregistered `{dependency}`")]
    MissingDependency { service: String, dependency: String },

    /// The dependency chain loops back on itself.
    #[error("Circular dependency: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    /// The constructor or factory returned an error.
    #[error("Failed to construct `{name}`: {source}")]
    Construction {
        name: String,
        #[source]
        source: BoxError,
    },

    /// The service exists but is not of the requested type.
    #[error("Service `{name}` is not a `{expected}`")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("Invalid service name: {0:?}")]
    InvalidName(String),

    /// Stored configuration could not be deserialized.
    #[error("Invalid configuration for `{name}`: {reason}")]
    InvalidConfig { name: String, reason: String },
}
