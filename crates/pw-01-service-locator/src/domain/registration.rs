//! Service registrations and the argument bundle handed to constructors.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::errors::{BoxError, ServiceError};
use crate::service::ServiceLocator;

/// A resolved service, type-erased.
pub type SharedService = Arc<dyn Any + Send + Sync>;

pub(crate) type Constructor =
    Arc<dyn Fn(&Resolved) -> Result<SharedService, BoxError> + Send + Sync>;

pub(crate) type FactoryFn =
    Arc<dyn Fn(&ServiceLocator) -> Result<SharedService, BoxError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Singleton,
    Transient,
    Factory,
    Instance,
}

/// A constructed (singleton or transient) service registration.
#[derive(Clone)]
pub(crate) struct ServiceRegistration {
    pub name: String,
    pub kind: ServiceKind,
    pub constructor: Constructor,
    pub dependencies: Vec<String>,
    pub cached: Option<SharedService>,
}

impl fmt::Debug for ServiceRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistration")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("dependencies", &self.dependencies)
            .field("cached", &self.cached.is_some())
            .finish()
    }
}

pub(crate) fn downcast<T: Any + Send + Sync>(
    name: &str,
    service: SharedService,
) -> Result<Arc<T>, ServiceError> {
    service
        .downcast::<T>()
        .map_err(|_| ServiceError::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<T>(),
        })
}

/// Everything a constructor receives: its resolved dependencies (in
/// declaration order) and the optional configuration object.
pub struct Resolved {
    pub(crate) service: String,
    pub(crate) dependencies: Vec<(String, SharedService)>,
    pub(crate) config: Option<Value>,
}

impl Resolved {
    /// Name of the service being constructed.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service
    }

    /// Dependency by its declared name.
    pub fn get<T: Any + Send + Sync>(&self, dependency: &str) -> Result<Arc<T>, ServiceError> {
        let service = self
            .dependencies
            .iter()
            .find(|(name, _)| name == dependency)
            .map(|(_, service)| Arc::clone(service))
            .ok_or_else(|| ServiceError::MissingDependency {
                service: self.service.clone(),
                dependency: dependency.to_string(),
            })?;
        downcast(dependency, service)
    }

    /// Dependency by its position in the declaration.
    pub fn at<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, ServiceError> {
        let (name, service) =
            self.dependencies
                .get(index)
                .ok_or_else(|| ServiceError::MissingDependency {
                    service: self.service.clone(),
                    dependency: format!("#{index}"),
                })?;
        downcast(name, Arc::clone(service))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Trailing configuration object, if one was set via `configure`.
    #[must_use]
    pub fn config(&self) -> Option<&Value> {
        self.config.as_ref()
    }

    /// Configuration deserialized into `T`.
    pub fn config_as<T: DeserializeOwned>(&self) -> Result<Option<T>, ServiceError> {
        self.config
            .clone()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| ServiceError::InvalidConfig {
                name: self.service.clone(),
                reason: e.to_string(),
            })
    }
}
