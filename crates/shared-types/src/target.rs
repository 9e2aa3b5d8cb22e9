//! # Target Handles
//!
//! A target handle is an abstract reference to a mount point. Components and
//! pages write rendered [`Markup`] into it, and the component factory's
//! cleanup sweep asks it whether it is still part of the live tree.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::markup::Markup;

/// Stable identity of a mount point within its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Contract every mount point implementation must satisfy.
pub trait TargetHandle: Send + Sync + fmt::Debug {
    /// Identity used for equality checks between handles.
    fn handle_id(&self) -> HandleId;

    /// Human readable label (element id) used in logs.
    fn label(&self) -> String;

    /// Whether the handle is still reachable from the live tree root.
    fn is_connected(&self) -> bool;

    /// Replace the handle's content with `markup`.
    ///
    /// Previously rendered children are detached from the tree.
    fn render(&self, markup: Markup);

    /// Currently rendered text content.
    fn content(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str);

    /// All descendants in document (pre-)order, excluding the handle itself.
    fn descendants(&self) -> Vec<Target>;
}

/// Shared, dynamically dispatched target handle.
pub type Target = Arc<dyn TargetHandle>;

/// Compare two handles by identity.
#[must_use]
pub fn same_target(a: &Target, b: &Target) -> bool {
    a.handle_id() == b.handle_id()
}

/// Resolves selectors to live target handles.
pub trait TargetResolver: Send + Sync {
    fn resolve(&self, selector: &str) -> Option<Target>;
}

/// A target given either directly or as a selector to resolve.
#[derive(Clone)]
pub enum TargetRef {
    Handle(Target),
    Selector(String),
}

impl TargetRef {
    /// Resolve to a live handle, looking selectors up through `resolver`.
    pub fn resolve(&self, resolver: &dyn TargetResolver) -> Option<Target> {
        match self {
            Self::Handle(target) => Some(Arc::clone(target)),
            Self::Selector(selector) => resolver.resolve(selector),
        }
    }
}

impl fmt::Debug for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handle(target) => write!(f, "Handle({})", target.handle_id()),
            Self::Selector(selector) => write!(f, "Selector({selector:?})"),
        }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handle(target) => write!(f, "{}", target.label()),
            Self::Selector(selector) => write!(f, "{selector}"),
        }
    }
}

impl From<Target> for TargetRef {
    fn from(target: Target) -> Self {
        Self::Handle(target)
    }
}

impl From<&Target> for TargetRef {
    fn from(target: &Target) -> Self {
        Self::Handle(Arc::clone(target))
    }
}

impl From<&str> for TargetRef {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for TargetRef {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}
