//! Prometheus metrics for the Pitwall runtime.
//!
//! All metrics follow the naming convention: `pw_<subsystem>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., components_created_total)
//! - **Gauge**: Value that can go up or down (e.g., components_live)
//! - **Histogram**: Distribution of values (e.g., navigation_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec,
    IntGauge, Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Registry holding every runtime metric
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // EVENT BUS METRICS
    // =========================================================================

    /// Events emitted, by event type
    pub static ref EVENTS_EMITTED: IntCounterVec = IntCounterVec::new(
        Opts::new("pw_bus_events_emitted_total", "Events emitted on the event bus"),
        &["event_type"]
    ).expect("metric creation failed");

    /// Events cancelled by middleware (mirrors the bus counter)
    pub static ref EVENTS_CANCELLED: IntGauge = IntGauge::new(
        "pw_bus_events_cancelled",
        "Events cancelled by middleware since startup"
    ).expect("metric creation failed");

    /// Listener invocations that failed (mirrors the bus counter)
    pub static ref LISTENER_FAILURES: IntGauge = IntGauge::new(
        "pw_bus_listener_failures",
        "Event listener failures since startup"
    ).expect("metric creation failed");

    // =========================================================================
    // COMPONENT METRICS (Subsystem 2)
    // =========================================================================

    pub static ref COMPONENTS_CREATED: IntCounterVec = IntCounterVec::new(
        Opts::new("pw_components_created_total", "Component instances created"),
        &["kind"]
    ).expect("metric creation failed");

    pub static ref COMPONENTS_DESTROYED: IntCounterVec = IntCounterVec::new(
        Opts::new("pw_components_destroyed_total", "Component instances destroyed"),
        &["kind"]
    ).expect("metric creation failed");

    /// Currently live component instances
    pub static ref COMPONENTS_LIVE: IntGauge = IntGauge::new(
        "pw_components_live",
        "Component instances currently tracked by the factory"
    ).expect("metric creation failed");

    /// Instances reclaimed by the orphan sweep
    pub static ref ORPHANS_RECLAIMED: IntCounter = IntCounter::new(
        "pw_components_orphans_reclaimed_total",
        "Component instances reclaimed because their target left the tree"
    ).expect("metric creation failed");

    // =========================================================================
    // ROUTER METRICS (Subsystem 3)
    // =========================================================================

    /// Navigations by outcome (completed, failed, ...)
    pub static ref NAVIGATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("pw_router_navigations_total", "Navigations by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    pub static ref NAVIGATION_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "pw_router_navigation_duration_seconds",
            "Time from navigate() to the page being rendered"
        ).buckets(exponential_buckets(0.001, 2.0, 12).expect("valid buckets")),
        &["route"]
    ).expect("metric creation failed");
}

/// Register all metrics with [`REGISTRY`].
///
/// Calling it twice fails with `MetricsInit` (duplicate registration).
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Event bus
        Box::new(EVENTS_EMITTED.clone()),
        Box::new(EVENTS_CANCELLED.clone()),
        Box::new(LISTENER_FAILURES.clone()),
        // Components
        Box::new(COMPONENTS_CREATED.clone()),
        Box::new(COMPONENTS_DESTROYED.clone()),
        Box::new(COMPONENTS_LIVE.clone()),
        Box::new(ORPHANS_RECLAIMED.clone()),
        // Router
        Box::new(NAVIGATIONS.clone()),
        Box::new(NAVIGATION_DURATION.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }
    Ok(())
}

/// Encode all registered metrics in the Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
