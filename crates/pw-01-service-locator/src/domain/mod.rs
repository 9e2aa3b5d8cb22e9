//! Domain layer of the service locator: registrations and errors.

pub mod errors;
pub mod registration;
