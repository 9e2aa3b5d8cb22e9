//! # Shared Bus - Event Bus for Inter-Module Communication
//!
//! Independently authored UI modules never call each other directly; they
//! publish typed events here and subscribe to the ones they care about.
//!
//! ## Delivery Pipeline
//!
//! ```text
//!  emit(type, data, metadata)
//!        │
//!        ▼
//!  ┌──────────────┐   stamp timestamp + correlation id (if absent)
//!  │   Metadata   │
//!  └──────┬───────┘
//!         ▼
//!  ┌──────────────┐   bounded ring, oldest evicted first
//!  │   History    │
//!  └──────┬───────┘
//!         ▼
//!  ┌──────────────┐   registration order; `None` cancels delivery,
//!  │  Middleware  │   an error is logged and the prior event passes on
//!  └──────┬───────┘
//!         ▼
//!  ┌──────────────┐   descending priority, FIFO within a priority,
//!  │  Listeners   │   awaited one at a time, failures isolated
//!  └──────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Listener and middleware tables are only mutated inside short synchronous
//! sections; no lock is held across an `.await`.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod history;
pub mod middleware;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{Event, EventMetadata, HistoryFilter};
pub use history::EventHistory;
pub use middleware::{middleware_fn, EventMiddleware, MiddlewareError};
pub use publisher::{BusError, EmitOutcome, EventBus, EventPublisher};
pub use subscriber::{
    listener_fn, EventListener, ListenerError, ListenerId, ListenerOptions, ListenerRecord,
    ListenerRef,
};

/// Default number of events retained in the diagnostic history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Event emitted by the component factory after an instance is created.
pub const COMPONENT_CREATED: &str = "component.created";

/// Event emitted by the component factory after an instance is destroyed.
pub const COMPONENT_DESTROYED: &str = "component.destroyed";
