//! # Component Factory Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Registry of component kinds and owner of every live component instance.
//! Instances are created explicitly, in batches, or declaratively from
//! marked elements inside rendered output, and reclaimed explicitly, by
//! kind, or by the orphan sweep.
//!
//! ## Lifecycle
//!
//! ```text
//! register(kind, ctor, defaults)
//!          │
//!          ▼
//! create(kind, target, options) ──→ ctor(target, defaults ⊕ options)
//!          │                              │
//!          │                        render()
//!          ▼                              ▼
//!   record stored ──────────────→ emit component.created
//!          │
//!          ├── destroy / destroy_all_of_type / destroy_all
//!          └── cleanup (target no longer connected)
//!                     │
//!               destroy() ──→ record removed ──→ emit component.destroyed
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Kind names unique and non-empty | `service.rs` - `register` |
//! | Caller options win over defaults (shallow) | `domain/component.rs` - `merge_options` |
//! | Auto-create is idempotent | initialized attribute set after each create |
//! | Cleanup reclaims only disconnected targets | `service.rs` - `cleanup` |
//! | No table lock held while emitting | records removed before `emit` |

pub mod domain;
pub mod service;

pub use domain::component::{Component, ComponentOptions, InstanceId};
pub use domain::errors::ComponentError;
pub use domain::record::{ComponentInstanceRecord, ComponentRef, FactoryStats};
pub use domain::template::{interpolate, TemplateRegistry};
pub use service::{ComponentDefinition, ComponentFactory, FactorySettings};
