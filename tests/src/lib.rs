//! # Pitwall Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── runtime_benchmarks.rs   # route matching, emit, interpolation
//! └── src/integration/
//!     ├── navigation.rs           # router + factory + bus, end to end
//!     ├── services.rs             # locator wiring around the runtime
//!     └── lifecycle.rs            # cleanup sweep, state fan-out, shutdown
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p pw-tests
//!
//! # One flow
//! cargo test -p pw-tests integration::navigation::
//!
//! # Benchmarks
//! cargo bench -p pw-tests
//! ```

pub mod integration;
