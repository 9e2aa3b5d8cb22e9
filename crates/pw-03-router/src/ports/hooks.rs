//! Navigation guards and after-hooks.
//!
//! Before-hooks see the requested path and the current route; middleware
//! sees the resolved target route. Either vetoes by returning `false`.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::state::ResolvedRoute;

#[async_trait]
pub trait BeforeHook: Send + Sync {
    async fn before(&self, to: &str, from: Option<&ResolvedRoute>) -> bool;
}

#[async_trait]
pub trait AfterHook: Send + Sync {
    async fn after(&self, to: &ResolvedRoute, from: Option<&ResolvedRoute>);
}

#[async_trait]
pub trait RouteMiddleware: Send + Sync {
    async fn handle(&self, route: &ResolvedRoute) -> bool;
}

/// Adapter turning an async closure into a [`BeforeHook`].
pub struct FnBeforeHook<F> {
    callback: F,
}

#[async_trait]
impl<F, Fut> BeforeHook for FnBeforeHook<F>
where
    F: Fn(String, Option<ResolvedRoute>) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send,
{
    async fn before(&self, to: &str, from: Option<&ResolvedRoute>) -> bool {
        (self.callback)(to.to_string(), from.cloned()).await
    }
}

pub fn before_hook_fn<F, Fut>(callback: F) -> Arc<dyn BeforeHook>
where
    F: Fn(String, Option<ResolvedRoute>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    Arc::new(FnBeforeHook { callback })
}

/// Adapter turning an async closure into an [`AfterHook`].
pub struct FnAfterHook<F> {
    callback: F,
}

#[async_trait]
impl<F, Fut> AfterHook for FnAfterHook<F>
where
    F: Fn(ResolvedRoute, Option<ResolvedRoute>) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send,
{
    async fn after(&self, to: &ResolvedRoute, from: Option<&ResolvedRoute>) {
        (self.callback)(to.clone(), from.cloned()).await;
    }
}

pub fn after_hook_fn<F, Fut>(callback: F) -> Arc<dyn AfterHook>
where
    F: Fn(ResolvedRoute, Option<ResolvedRoute>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(FnAfterHook { callback })
}

/// Adapter turning an async closure into a [`RouteMiddleware`].
pub struct FnRouteMiddleware<F> {
    callback: F,
}

#[async_trait]
impl<F, Fut> RouteMiddleware for FnRouteMiddleware<F>
where
    F: Fn(ResolvedRoute) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send,
{
    async fn handle(&self, route: &ResolvedRoute) -> bool {
        (self.callback)(route.clone()).await
    }
}

pub fn route_middleware_fn<F, Fut>(callback: F) -> Arc<dyn RouteMiddleware>
where
    F: Fn(ResolvedRoute) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    Arc::new(FnRouteMiddleware { callback })
}
