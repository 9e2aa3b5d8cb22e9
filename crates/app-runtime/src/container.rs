//! # Runtime Container
//!
//! Builds the four runtime services from a [`RuntimeConfig`] and owns them
//! for the lifetime of the application.
//!
//! ## Initialization Order
//!
//! ```text
//! RuntimeConfig::validate
//!        │
//!        ↓
//! EventBus ──(metrics middleware, first stage)
//!        │
//!        ├──→ ServiceLocator      "eventBus" registered as an instance
//!        ├──→ ComponentFactory    publishes component.* on the bus
//!        └──→ Router              mounts pages, auto-creates components
//! ```
//!
//! No global state: everything hangs off one [`RuntimeContext`], which is
//! cheap to share behind an `Arc`.

use std::sync::Arc;

use parking_lot::Mutex;
use pitwall_telemetry::{
    gather_metrics, TelemetryError, COMPONENTS_LIVE, EVENTS_CANCELLED, LISTENER_FAILURES,
};
use pw_01_service_locator::{ServiceError, ServiceLocator};
use pw_02_component_factory::{ComponentError, ComponentFactory, FactorySettings};
use pw_03_router::{
    ComponentMounter, History, MemoryHistory, ModuleLoader, RouteDefinition, Router,
    RouterError, RouterSettings, StaticModuleLoader,
};
use shared_bus::{EventBus, EventPublisher};
use shared_types::{MountTree, TargetResolver};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cleanup::spawn_cleanup_task;
use crate::config::{ConfigError, RuntimeConfig};
use crate::metrics::metrics_middleware;

/// Locator name of the shared event bus.
pub const EVENT_BUS_SERVICE: &str = "eventBus";
/// Locator name of the component factory.
pub const COMPONENT_FACTORY_SERVICE: &str = "componentFactory";
/// Locator name of the router.
pub const ROUTER_SERVICE: &str = "router";

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error(transparent)]
    Router(#[from] RouterError),
}

/// Step-by-step construction of a [`RuntimeContext`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    services: Option<Arc<ServiceLocator>>,
    tree: Option<Arc<MountTree>>,
    resolver: Option<Arc<dyn TargetResolver>>,
    loader: Option<Arc<dyn ModuleLoader>>,
    history: Option<Arc<dyn History>>,
    routes: Vec<RouteDefinition>,
    metrics: bool,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            services: None,
            tree: None,
            resolver: None,
            loader: None,
            history: None,
            routes: Vec::new(),
            metrics: true,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a locator the caller has already populated. The runtime services
    /// are registered into it during `build`.
    #[must_use]
    pub fn with_services(mut self, services: Arc<ServiceLocator>) -> Self {
        self.services = Some(services);
        self
    }

    /// Render into `tree`. Also used as the resolver unless one is given.
    #[must_use]
    pub fn with_mount_tree(mut self, tree: Arc<MountTree>) -> Self {
        self.tree = Some(tree);
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn TargetResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    #[must_use]
    pub fn with_history(mut self, history: Arc<dyn History>) -> Self {
        self.history = Some(history);
        self
    }

    #[must_use]
    pub fn with_routes(mut self, routes: impl IntoIterator<Item = RouteDefinition>) -> Self {
        self.routes.extend(routes);
        self
    }

    /// Attach the Prometheus middleware to the bus (on by default).
    #[must_use]
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics = enabled;
        self
    }

    pub fn build(self) -> Result<RuntimeContext, RuntimeError> {
        self.config.validate()?;
        let config = self.config;

        let bus = Arc::new(EventBus::with_history_capacity(config.bus.history_capacity));
        if self.metrics {
            bus.use_middleware(metrics_middleware());
        }
        let publisher: Arc<dyn EventPublisher> = Arc::clone(&bus) as Arc<dyn EventPublisher>;

        // Without an explicit resolver the runtime renders into an in-memory
        // tree that already carries the router's mount point.
        let tree = match (&self.tree, &self.resolver) {
            (Some(tree), _) => Some(Arc::clone(tree)),
            (None, Some(_)) => None,
            (None, None) => {
                let tree = Arc::new(MountTree::new());
                tree.append_to_root(mount_id(&config.router.mount_selector));
                Some(tree)
            }
        };
        let resolver: Arc<dyn TargetResolver> = match (self.resolver, &tree) {
            (Some(resolver), _) => resolver,
            (None, Some(tree)) => Arc::clone(tree) as Arc<dyn TargetResolver>,
            (None, None) => Arc::new(MountTree::new()),
        };

        let components = Arc::new(ComponentFactory::with_settings(
            Arc::clone(&publisher),
            Arc::clone(&resolver),
            FactorySettings::from(&config.components),
        ));

        let loader = self
            .loader
            .unwrap_or_else(|| Arc::new(StaticModuleLoader::new()) as Arc<dyn ModuleLoader>);
        let history = self
            .history
            .unwrap_or_else(|| Arc::new(MemoryHistory::new()) as Arc<dyn History>);
        let router = Arc::new(
            Router::new(loader, history, Arc::clone(&resolver), publisher)
                .with_settings(RouterSettings::from(&config.router))
                .with_component_mounter(Arc::clone(&components) as Arc<dyn ComponentMounter>),
        );
        router.add_routes(self.routes)?;

        let services = self
            .services
            .unwrap_or_else(|| Arc::new(ServiceLocator::new()));
        services.register_instance(EVENT_BUS_SERVICE, Arc::clone(&bus))?;
        services.register_instance(COMPONENT_FACTORY_SERVICE, Arc::clone(&components))?;
        services.register_instance(ROUTER_SERVICE, Arc::clone(&router))?;

        let (shutdown_tx, _) = watch::channel(false);
        info!(
            routes = router.routes().len(),
            history_capacity = config.bus.history_capacity,
            mount = %config.router.mount_selector,
            "Runtime built"
        );

        Ok(RuntimeContext {
            config,
            bus,
            services,
            components,
            router,
            resolver,
            tree,
            shutdown_tx,
            cleanup: Mutex::new(None),
        })
    }
}

/// Element id behind a `#id` selector.
fn mount_id(selector: &str) -> &str {
    let selector = selector.trim();
    selector.strip_prefix('#').unwrap_or(selector)
}

/// The assembled runtime.
pub struct RuntimeContext {
    config: RuntimeConfig,
    bus: Arc<EventBus>,
    services: Arc<ServiceLocator>,
    components: Arc<ComponentFactory>,
    router: Arc<Router>,
    resolver: Arc<dyn TargetResolver>,
    tree: Option<Arc<MountTree>>,
    shutdown_tx: watch::Sender<bool>,
    cleanup: Mutex<Option<JoinHandle<()>>>,
}

impl RuntimeContext {
    #[must_use]
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    #[must_use]
    pub fn services(&self) -> &Arc<ServiceLocator> {
        &self.services
    }

    #[must_use]
    pub fn components(&self) -> &Arc<ComponentFactory> {
        &self.components
    }

    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    #[must_use]
    pub fn resolver(&self) -> &Arc<dyn TargetResolver> {
        &self.resolver
    }

    /// The in-memory tree, unless the host supplied its own resolver.
    #[must_use]
    pub fn mount_tree(&self) -> Option<&Arc<MountTree>> {
        self.tree.as_ref()
    }

    /// Start the periodic orphan sweep. Returns `false` if it is already
    /// running.
    pub fn start_cleanup(&self) -> bool {
        let mut slot = self.cleanup.lock();
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }
        *slot = Some(spawn_cleanup_task(
            Arc::clone(&self.components),
            self.config.components.cleanup_interval(),
            self.shutdown_tx.subscribe(),
        ));
        true
    }

    #[must_use]
    pub fn is_cleanup_running(&self) -> bool {
        self.cleanup
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop background work and destroy every live component.
    ///
    /// Returns the number of components destroyed.
    pub async fn shutdown(&self) -> usize {
        info!("Runtime shutting down");
        self.shutdown_tx.send_replace(true);

        let handle = self.cleanup.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Cleanup task ended abnormally");
            }
        }

        let destroyed = self.components.destroy_all().await;
        self.refresh_metrics();
        info!(destroyed, "Runtime stopped");
        destroyed
    }

    /// Copy counters owned by the bus and the factory into their gauges.
    pub fn refresh_metrics(&self) {
        EVENTS_CANCELLED.set(saturating_i64(self.bus.events_cancelled()));
        LISTENER_FAILURES.set(saturating_i64(self.bus.listener_failures()));
        let live = u64::try_from(self.components.instance_count()).unwrap_or(u64::MAX);
        COMPONENTS_LIVE.set(saturating_i64(live));
    }

    /// Prometheus text exposition of every registered metric.
    pub fn gather_metrics(&self) -> Result<String, TelemetryError> {
        self.refresh_metrics();
        gather_metrics()
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
