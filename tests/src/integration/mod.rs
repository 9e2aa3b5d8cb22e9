//! Cross-crate flows. Each file drives the assembled runtime the way an
//! application would.

mod lifecycle;
mod navigation;
mod services;
