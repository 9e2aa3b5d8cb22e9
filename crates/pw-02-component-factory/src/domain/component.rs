//! # Component Contract
//!
//! Every registered kind produces values implementing [`Component`]. The
//! required capabilities (`render`, `destroy`) are trait methods, so a
//! constructor whose product lacks them is rejected at compile time instead
//! of at registration. `on_state_change` is optional and defaults to a no-op.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared_types::Target;

use super::errors::ComponentError;

/// A live UI component bound to a target handle.
pub trait Component: Send + Sync {
    /// Write the component's markup into its target.
    fn render(&self);

    /// Release whatever the component holds. Called once, just before the
    /// factory forgets the instance.
    fn destroy(&self);

    /// React to application state changes.
    fn on_state_change(&self, _new_state: &Value, _old_state: &Value) {}
}

/// Merged options handed to a constructor.
pub type ComponentOptions = Map<String, Value>;

/// Type-erased constructor stored per registered kind.
pub(crate) type ComponentConstructor = Arc<
    dyn Fn(Target, ComponentOptions) -> Result<Arc<dyn Component>, ComponentError> + Send + Sync,
>;

/// A registered kind: how to build it and its default options.
#[derive(Clone)]
pub(crate) struct ComponentKind {
    pub constructor: ComponentConstructor,
    pub default_config: ComponentOptions,
}

/// Generated identifier of a live instance, `"<kind>_<uuid>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(String);

impl InstanceId {
    pub(crate) fn generate(kind: &str) -> Self {
        Self(format!("{kind}_{}", uuid::Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Shallow merge: keys in `options` replace keys in `defaults`.
pub(crate) fn merge_options(
    kind: &str,
    defaults: &ComponentOptions,
    options: Value,
) -> Result<ComponentOptions, ComponentError> {
    let mut merged = defaults.clone();
    match options {
        Value::Null => {}
        Value::Object(overrides) => merged.extend(overrides),
        other => {
            return Err(ComponentError::InvalidOptions {
                kind: kind.to_string(),
                reason: format!("expected an object, got {other}"),
            })
        }
    }
    Ok(merged)
}

/// Default configuration must be an object (or absent).
pub(crate) fn default_config(kind: &str, config: Value) -> Result<ComponentOptions, ComponentError> {
    merge_options(kind, &ComponentOptions::new(), config)
}
