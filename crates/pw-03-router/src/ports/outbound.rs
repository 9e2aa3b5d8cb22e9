//! Outbound (Driven) ports for the Router subsystem.
//!
//! These traits define what the router needs from its host: page modules
//! and a way to load them, a history stack, and optionally something that
//! mounts declared components inside freshly rendered pages.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{Markup, Target};

use crate::domain::errors::PageError;
use crate::domain::query::Query;
use crate::domain::route::RouteParams;

/// A page-level UI module.
#[async_trait]
pub trait PageModule: Send + Sync {
    /// Produce the page markup for the matched route.
    async fn render(&self, params: &RouteParams, query: &Query) -> Result<Markup, PageError>;

    /// Runs after the markup is in place.
    async fn init(&self, _params: &RouteParams, _query: &Query) -> Result<(), PageError> {
        Ok(())
    }
}

/// Resolves a route's module key to a page module.
///
/// Loading is a suspension point; implementations may fetch or build the
/// module lazily.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, key: &str) -> Result<Arc<dyn PageModule>, PageError>;
}

/// Navigation history stack.
pub trait History: Send + Sync {
    /// Add an entry after the current one, discarding forward entries.
    fn push(&self, path: &str);

    /// Overwrite the current entry.
    fn replace(&self, path: &str);

    /// Move the cursor by `delta`. Returns the new current path, or `None`
    /// (cursor unchanged) if the target is out of range.
    fn go(&self, delta: i64) -> Option<String>;

    fn current(&self) -> Option<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Instantiates declared components inside a rendered page.
#[async_trait]
pub trait ComponentMounter: Send + Sync {
    /// Returns how many components were created.
    async fn mount(&self, root: &Target) -> usize;
}
