//! Ports layer for the Router subsystem.

pub mod hooks;
pub mod outbound;

pub use hooks::{
    after_hook_fn, before_hook_fn, route_middleware_fn, AfterHook, BeforeHook, RouteMiddleware,
};
pub use outbound::{ComponentMounter, History, ModuleLoader, PageModule};
