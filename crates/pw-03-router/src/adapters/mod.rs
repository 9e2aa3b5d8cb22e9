//! Adapters layer for the Router subsystem.

pub mod components;
pub mod history;
pub mod loader;

pub use history::MemoryHistory;
pub use loader::StaticModuleLoader;
