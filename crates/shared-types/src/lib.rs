//! # Shared Types Crate
//!
//! Types shared by every runtime subsystem that writes rendered output
//! somewhere: the component factory mounts components into target handles,
//! the router renders page modules into one.
//!
//! ## Design Principles
//!
//! - **Abstract mount points**: subsystems only see [`TargetHandle`], never a
//!   concrete rendering surface.
//! - **Pluggable resolution**: string selectors are resolved through a
//!   [`TargetResolver`] supplied by the host.
//! - **Headless by default**: [`MountTree`] is a complete in-memory surface so
//!   the runtime runs (and is tested) without a browser.

pub mod markup;
pub mod mount_tree;
pub mod target;

pub use markup::{Markup, MountSpec, DEFAULT_COMPONENT_MARKER};
pub use mount_tree::{MountNode, MountTree};
pub use target::{same_target, HandleId, Target, TargetHandle, TargetRef, TargetResolver};
