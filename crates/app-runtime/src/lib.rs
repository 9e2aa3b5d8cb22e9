//! # Pitwall App Runtime
//!
//! Wires the event bus, service locator, component factory and router into
//! a single [`RuntimeContext`].
//!
//! ## Modules
//!
//! - `config` - `RuntimeConfig` with `PITWALL_*` environment overrides
//! - `container` - `RuntimeBuilder` and the assembled `RuntimeContext`
//! - `cleanup` - periodic orphan sweep on the tokio scheduler
//! - `metrics` - bus middleware feeding the Prometheus registry
//! - `demo` - sample pages, components and services
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then environment)
//! 2. Validate it
//! 3. Build the bus, locator, factory and router in that order
//! 4. Register components, start the cleanup sweep
//! 5. Navigate to the initial path
//!
//! ```rust,ignore
//! let ctx = RuntimeBuilder::new()
//!     .with_config(RuntimeConfig::from_env()?)
//!     .with_loader(loader)
//!     .with_routes(routes)
//!     .build()?;
//! ctx.start_cleanup();
//! ctx.router().start("/").await;
//! ```

pub mod cleanup;
pub mod config;
pub mod container;
pub mod demo;
pub mod metrics;

pub use cleanup::spawn_cleanup_task;
pub use config::{BusConfig, ComponentConfig, ConfigError, RouterConfig, RuntimeConfig};
pub use container::{
    RuntimeBuilder, RuntimeContext, RuntimeError, COMPONENT_FACTORY_SERVICE, EVENT_BUS_SERVICE,
    ROUTER_SERVICE,
};
pub use metrics::metrics_middleware;
