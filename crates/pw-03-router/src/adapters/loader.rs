//! Module loader backed by an in-process table.
//!
//! Modules are registered either ready-made or as a builder that runs on
//! first load; the built module is cached for later loads.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::errors::PageError;
use crate::ports::{ModuleLoader, PageModule};

type ModuleBuilder = Arc<dyn Fn() -> Result<Arc<dyn PageModule>, PageError> + Send + Sync>;

#[derive(Clone)]
enum Slot {
    Ready(Arc<dyn PageModule>),
    Lazy(ModuleBuilder),
}

#[derive(Default)]
pub struct StaticModuleLoader {
    modules: RwLock<HashMap<String, Slot>>,
}

impl StaticModuleLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, key: impl Into<String>, module: Arc<dyn PageModule>) {
        self.modules.write().insert(key.into(), Slot::Ready(module));
    }

    /// Register a builder run on first load.
    pub fn register_lazy<F>(&self, key: impl Into<String>, builder: F)
    where
        F: Fn() -> Result<Arc<dyn PageModule>, PageError> + Send + Sync + 'static,
    {
        self.modules
            .write()
            .insert(key.into(), Slot::Lazy(Arc::new(builder)));
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.modules.read().contains_key(key)
    }

    /// Whether `key` has been built (or was registered ready-made).
    #[must_use]
    pub fn is_loaded(&self, key: &str) -> bool {
        matches!(self.modules.read().get(key), Some(Slot::Ready(_)))
    }
}

#[async_trait]
impl ModuleLoader for StaticModuleLoader {
    async fn load(&self, key: &str) -> Result<Arc<dyn PageModule>, PageError> {
        let slot = self
            .modules
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| PageError::ModuleNotFound(key.to_string()))?;
        match slot {
            Slot::Ready(module) => Ok(module),
            Slot::Lazy(builder) => {
                let module = builder()?;
                self.modules
                    .write()
                    .insert(key.to_string(), Slot::Ready(Arc::clone(&module)));
                debug!(module = %key, "Page module built");
                Ok(module)
            }
        }
    }
}
