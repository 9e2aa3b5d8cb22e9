//! # Pitwall Telemetry
//!
//! Logging and metrics for the Pitwall runtime.
//!
//! ## Components
//!
//! - **Logging**: `tracing` subscriber with env-filter and pretty or JSON output
//! - **Metrics**: Prometheus counters, gauges and histograms in one registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pitwall_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // Application code here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `pitwall` | Service name in the startup log |
//! | `PITWALL_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `PITWALL_JSON_LOGS` | `false` | JSON log lines |
//! | `PITWALL_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};
pub use metrics::{
    gather_metrics, register_metrics, COMPONENTS_CREATED, COMPONENTS_DESTROYED, COMPONENTS_LIVE,
    EVENTS_CANCELLED, EVENTS_EMITTED, LISTENER_FAILURES, NAVIGATIONS, NAVIGATION_DURATION,
    ORPHANS_RECLAIMED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install logging and register metrics.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Increment a counter, optionally a labelled one.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

/// Observe a value on a histogram, optionally a labelled one.
#[macro_export]
macro_rules! metric_observe {
    ($metric:expr, $value:expr) => {
        $metric.observe($value)
    };
    ($metric:expr, $labels:expr, $value:expr) => {
        $metric.with_label_values($labels).observe($value)
    };
}
