//! # Service Locator Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Dependency-injection container for shared services. Services are
//! registered by name and resolved on demand, with their declared
//! dependencies resolved first.
//!
//! ## Registration Kinds
//!
//! | Kind      | Construction                          | Reuse                    |
//! |-----------|---------------------------------------|--------------------------|
//! | Singleton | lazily on first `get`, deps injected  | cached for the lifetime  |
//! | Transient | on every `get`, deps injected         | never                    |
//! | Factory   | supplied function, called on `get`   | up to the function       |
//! | Instance  | none, value registered directly      | always the same value    |
//!
//! ## Resolution Order
//!
//! ```text
//! get(name) ──→ instance? ──→ factory? ──→ registered service
//!                                              │
//!                      resolve each dependency ┘ (recursive, cycle-guarded)
//!                                              │
//!                 constructor(deps…, config?) ─┘
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Singleton built at most once per success | `service.rs` - cache written after construction |
//! | Failed construction never cached | `service.rs` - cache only on `Ok` |
//! | Cycles fail fast | `service.rs` - resolution chain check |

pub mod domain;
pub mod service;

pub use domain::errors::{BoxError, ServiceError};
pub use domain::registration::{Resolved, ServiceKind, SharedService};
pub use service::ServiceLocator;
