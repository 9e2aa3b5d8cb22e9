//! # Service Locator
//!
//! Application service that owns the three registration tables (services,
//! instances, factories) plus per-service configuration, and resolves names
//! to shared service values.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::errors::{BoxError, ServiceError};
use crate::domain::registration::{
    downcast, Constructor, FactoryFn, Resolved, ServiceKind, ServiceRegistration, SharedService,
};

/// Named dependency-injection container.
///
/// Tables are only touched inside short synchronous sections; constructors
/// and factories always run with no lock held, so they may call back into
/// the locator.
#[derive(Default)]
pub struct ServiceLocator {
    services: RwLock<HashMap<String, ServiceRegistration>>,
    instances: RwLock<HashMap<String, SharedService>>,
    factories: RwLock<HashMap<String, FactoryFn>>,
    configs: RwLock<HashMap<String, Value>>,
}

impl ServiceLocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lazily built, cached service.
    pub fn register_singleton<T, F>(
        &self,
        name: &str,
        dependencies: &[&str],
        constructor: F,
    ) -> Result<(), ServiceError>
    where
        T: Any + Send + Sync,
        F: Fn(&Resolved) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.register_constructed(name, ServiceKind::Singleton, dependencies, constructor)
    }

    /// Register a service built anew on every `get`.
    pub fn register_transient<T, F>(
        &self,
        name: &str,
        dependencies: &[&str],
        constructor: F,
    ) -> Result<(), ServiceError>
    where
        T: Any + Send + Sync,
        F: Fn(&Resolved) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.register_constructed(name, ServiceKind::Transient, dependencies, constructor)
    }

    /// Register a function that fully owns construction of `name`.
    pub fn register_factory<T, F>(&self, name: &str, factory: F) -> Result<(), ServiceError>
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceLocator) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::validate_name(name)?;
        let factory: FactoryFn = Arc::new(move |locator: &ServiceLocator| {
            factory(locator).map(|service| Arc::new(service) as SharedService)
        });
        if self.factories.write().insert(name.to_string(), factory).is_some() {
            warn!(service = name, "Replacing existing factory");
        }
        debug!(service = name, "Factory registered");
        Ok(())
    }

    /// Register a pre-built value; `get` returns exactly this `Arc`.
    pub fn register_instance<T>(&self, name: &str, instance: Arc<T>) -> Result<(), ServiceError>
    where
        T: Any + Send + Sync,
    {
        Self::validate_name(name)?;
        let previous = self
            .instances
            .write()
            .insert(name.to_string(), instance as SharedService);
        if previous.is_some() {
            warn!(service = name, "Replacing existing instance");
        }
        debug!(service = name, "Instance registered");
        Ok(())
    }

    /// Set the configuration object passed to `name`'s constructor.
    pub fn configure(&self, name: &str, config: Value) {
        self.configs.write().insert(name.to_string(), config);
    }

    #[must_use]
    pub fn get_config(&self, name: &str) -> Option<Value> {
        self.configs.read().get(name).cloned()
    }

    /// Resolve `name` and downcast it to `T`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ServiceError> {
        downcast(name, self.get_any(name)?)
    }

    /// Resolve `name` without downcasting.
    pub fn get_any(&self, name: &str) -> Result<SharedService, ServiceError> {
        self.resolve(name, &mut Vec::new())
    }

    /// Registered under any of the three tables.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.instances.read().contains_key(name)
            || self.factories.read().contains_key(name)
            || self.services.read().contains_key(name)
    }

    /// Which table `name` resolves from, following resolution order.
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<ServiceKind> {
        if self.instances.read().contains_key(name) {
            return Some(ServiceKind::Instance);
        }
        if self.factories.read().contains_key(name) {
            return Some(ServiceKind::Factory);
        }
        self.services.read().get(name).map(|r| r.kind)
    }

    /// Purge `name` from every table. Returns `true` if anything was removed.
    pub fn remove(&self, name: &str) -> bool {
        let removed_service = self.services.write().remove(name).is_some();
        let removed_instance = self.instances.write().remove(name).is_some();
        let removed_factory = self.factories.write().remove(name).is_some();
        self.configs.write().remove(name);
        removed_service || removed_instance || removed_factory
    }

    /// All registered names, sorted and de-duplicated.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .services
            .read()
            .keys()
            .chain(self.instances.read().keys())
            .chain(self.factories.read().keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn clear(&self) {
        self.services.write().clear();
        self.instances.write().clear();
        self.factories.write().clear();
        self.configs.write().clear();
    }

    fn validate_name(name: &str) -> Result<(), ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    fn register_constructed<T, F>(
        &self,
        name: &str,
        kind: ServiceKind,
        dependencies: &[&str],
        constructor: F,
    ) -> Result<(), ServiceError>
    where
        T: Any + Send + Sync,
        F: Fn(&Resolved) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::validate_name(name)?;
        let constructor: Constructor = Arc::new(move |resolved: &Resolved| {
            constructor(resolved).map(|service| Arc::new(service) as SharedService)
        });
        let registration = ServiceRegistration {
            name: name.to_string(),
            kind,
            constructor,
            dependencies: dependencies.iter().map(|d| (*d).to_string()).collect(),
            cached: None,
        };
        debug!(service = name, kind = ?kind, deps = ?registration.dependencies, "Service registered");
        if self
            .services
            .write()
            .insert(name.to_string(), registration)
            .is_some()
        {
            warn!(service = name, "Replacing existing service registration");
        }
        Ok(())
    }

    /// `chain` holds the names whose construction is currently in progress.
    fn resolve(&self, name: &str, chain: &mut Vec<String>) -> Result<SharedService, ServiceError> {
        let instance = self.instances.read().get(name).cloned();
        if let Some(instance) = instance {
            return Ok(instance);
        }

        let factory = self.factories.read().get(name).cloned();
        if let Some(factory) = factory {
            return factory(self).map_err(|source| ServiceError::Construction {
                name: name.to_string(),
                source,
            });
        }

        let registration = self
            .services
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceError::NotRegistered(name.to_string()))?;
        if let Some(cached) = registration.cached {
            return Ok(cached);
        }

        if chain.iter().any(|pending| pending == name) {
            chain.push(name.to_string());
            return Err(ServiceError::CircularDependency {
                chain: std::mem::take(chain),
            });
        }

        chain.push(name.to_string());
        let mut dependencies = Vec::with_capacity(registration.dependencies.len());
        for dependency in &registration.dependencies {
            let service = match self.resolve(dependency, chain) {
                Ok(service) => service,
                Err(ServiceError::NotRegistered(missing)) => {
                    return Err(ServiceError::MissingDependency {
                        service: name.to_string(),
                        dependency: missing,
                    })
                }
                Err(e) => return Err(e),
            };
            dependencies.push((dependency.clone(), service));
        }
        chain.pop();

        let resolved = Resolved {
            service: name.to_string(),
            dependencies,
            config: self.get_config(name),
        };
        let service =
            (registration.constructor)(&resolved).map_err(|source| ServiceError::Construction {
                name: name.to_string(),
                source,
            })?;

        if registration.kind == ServiceKind::Singleton {
            let mut services = self.services.write();
            if let Some(entry) = services.get_mut(name) {
                // A concurrent resolution may have finished first; keep its value.
                if let Some(existing) = &entry.cached {
                    return Ok(Arc::clone(existing));
                }
                entry.cached = Some(Arc::clone(&service));
            }
            debug!(service = name, "Singleton constructed");
        }
        Ok(service)
    }
}
