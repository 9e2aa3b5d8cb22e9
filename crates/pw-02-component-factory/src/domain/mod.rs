//! Domain layer of the component factory.

pub mod component;
pub mod errors;
pub mod record;
pub mod template;
