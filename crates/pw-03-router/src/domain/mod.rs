//! Domain layer of the router: matching, query parsing and navigation state.

pub mod errors;
pub mod query;
pub mod route;
pub mod state;
