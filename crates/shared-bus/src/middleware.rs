//! # Event Middleware
//!
//! Pipeline stages that run before listener dispatch. A stage returns the
//! (possibly transformed) event to pass it on, or `None` to cancel delivery.
//! A stage that fails does NOT cancel: the bus logs the error and continues
//! with the event as it was before that stage.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::events::Event;

/// Failure raised inside a middleware stage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("middleware failed: {message}")]
pub struct MiddlewareError {
    pub message: String,
}

impl MiddlewareError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait EventMiddleware: Send + Sync {
    /// `Ok(Some(event))` continues, `Ok(None)` cancels delivery.
    async fn process(&self, event: Event) -> Result<Option<Event>, MiddlewareError>;
}

/// Adapter turning an async closure into an [`EventMiddleware`].
pub struct FnMiddleware<F> {
    stage: F,
}

#[async_trait]
impl<F, Fut> EventMiddleware for FnMiddleware<F>
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Event>, MiddlewareError>> + Send,
{
    async fn process(&self, event: Event) -> Result<Option<Event>, MiddlewareError> {
        (self.stage)(event).await
    }
}

pub fn middleware_fn<F, Fut>(stage: F) -> Arc<dyn EventMiddleware>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<Event>, MiddlewareError>> + Send + 'static,
{
    Arc::new(FnMiddleware { stage })
}
