//! # Router Subsystem
//!
//! **Subsystem ID:** 3
//!
//! ## Purpose
//!
//! Maps paths to lazily loaded page modules and renders them into the
//! application's mount point, with navigation guards, history and
//! breadcrumbs.
//!
//! ## Navigation Pipeline
//!
//! ```text
//! navigate(path)
//!   │ in flight? ─────────────────────────────→ Dropped
//!   ▼
//! before hooks (in order) ── any false ───────→ Aborted
//!   ▼
//! resolve: exact static match, else first dynamic match
//!   │ no match ───────────────────────────────→ NotFound
//!   ▼
//! middleware (in order) ──── any false ───────→ Aborted
//!   ▼
//! history push / replace, current route set
//!   ▼
//! load module → render → mount components → init
//!   │ error → fallback view ──────────────────→ Failed
//!   ▼
//! breadcrumbs, after hooks, navigation.completed → Completed
//! ```
//!
//! ## Architecture
//!
//! | Layer    | Contents |
//! |----------|----------|
//! | domain   | pattern matching, query parsing, navigation state |
//! | ports    | `PageModule`, `ModuleLoader`, `History`, `ComponentMounter`, hooks |
//! | adapters | `MemoryHistory`, `StaticModuleLoader`, component factory mounter |
//! | service  | `Router` |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{MemoryHistory, StaticModuleLoader};
pub use domain::errors::{PageError, RouterError};
pub use domain::query::{parse_query, Query, QueryValue};
pub use domain::route::{normalize_path, split_path, RouteDefinition, RouteParams};
pub use domain::state::{
    Breadcrumb, LinkDisposition, NavigateOptions, NavigationOutcome, NavigationState,
    ResolvedRoute,
};
pub use ports::{
    after_hook_fn, before_hook_fn, route_middleware_fn, AfterHook, BeforeHook, ComponentMounter,
    History, ModuleLoader, PageModule, RouteMiddleware,
};
pub use service::{Router, RouterSettings, NAVIGATION_COMPLETED, NAVIGATION_FAILED};
