//! # Event Subscriber
//!
//! Defines the subscription side of the event bus: listeners, their
//! registration options and the records the bus keeps for them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::events::Event;

/// Failure reported by a listener. Caught and logged by the bus.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("listener failed: {message}")]
pub struct ListenerError {
    pub message: String,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Callback invoked for every matching event.
#[async_trait]
pub trait EventListener: Send + Sync {
    async fn on_event(&self, event: &Event) -> Result<(), ListenerError>;
}

/// Adapter turning an async closure into an [`EventListener`].
pub struct FnListener<F> {
    callback: F,
}

#[async_trait]
impl<F, Fut> EventListener for FnListener<F>
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ListenerError>> + Send,
{
    async fn on_event(&self, event: &Event) -> Result<(), ListenerError> {
        (self.callback)(event.clone()).await
    }
}

/// Wrap an async closure as a shareable listener.
///
/// Keep the returned `Arc` to remove the listener later by identity.
pub fn listener_fn<F, Fut>(callback: F) -> Arc<dyn EventListener>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
{
    Arc::new(FnListener { callback })
}

/// Identifier handed out by `on`/`once`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Options for a listener registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Higher priorities run first.
    pub priority: i32,
    /// Remove the listener when it fires.
    pub once: bool,
    /// Label of the owning module, reported with failures.
    pub context: Option<String>,
}

impl ListenerOptions {
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// A registered listener as stored by the bus.
#[derive(Clone)]
pub struct ListenerRecord {
    pub id: ListenerId,
    pub listener: Arc<dyn EventListener>,
    pub priority: i32,
    pub once: bool,
    pub context: Option<String>,
}

impl ListenerRecord {
    /// Identity match on the callback reference.
    #[must_use]
    pub fn is_same_listener(&self, other: &Arc<dyn EventListener>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.listener), Arc::as_ptr(other))
    }
}

impl fmt::Debug for ListenerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRecord")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("once", &self.once)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Which listener `off` should remove.
#[derive(Clone)]
pub enum ListenerRef {
    Id(ListenerId),
    Listener(Arc<dyn EventListener>),
}

impl ListenerRef {
    pub(crate) fn matches(&self, record: &ListenerRecord) -> bool {
        match self {
            Self::Id(id) => record.id == *id,
            Self::Listener(listener) => record.is_same_listener(listener),
        }
    }
}

impl From<ListenerId> for ListenerRef {
    fn from(id: ListenerId) -> Self {
        Self::Id(id)
    }
}

impl From<&Arc<dyn EventListener>> for ListenerRef {
    fn from(listener: &Arc<dyn EventListener>) -> Self {
        Self::Listener(Arc::clone(listener))
    }
}
