//! Bus middleware that feeds the Prometheus metrics.
//!
//! Registered as the first middleware stage, so it sees every emitted event
//! before any other stage can cancel it. It never transforms or cancels.

use std::sync::Arc;

use pitwall_telemetry::{
    metric_inc, metric_observe, COMPONENTS_CREATED, COMPONENTS_DESTROYED, COMPONENTS_LIVE, EVENTS_EMITTED, NAVIGATIONS,
    NAVIGATION_DURATION,
};
use pw_03_router::{NAVIGATION_COMPLETED, NAVIGATION_FAILED};
use serde_json::Value;
use shared_bus::{middleware_fn, Event, EventMiddleware, COMPONENT_CREATED, COMPONENT_DESTROYED};

pub fn metrics_middleware() -> Arc<dyn EventMiddleware> {
    middleware_fn(|event: Event| async move {
        record(&event);
        Ok(Some(event))
    })
}

fn record(event: &Event) {
    metric_inc!(EVENTS_EMITTED, &[event.event_type.as_str()]);

    match event.event_type.as_str() {
        COMPONENT_CREATED => {
            metric_inc!(COMPONENTS_CREATED, &[str_field(event, "kind")]);
            COMPONENTS_LIVE.inc();
        }
        COMPONENT_DESTROYED => {
            metric_inc!(COMPONENTS_DESTROYED, &[str_field(event, "kind")]);
            COMPONENTS_LIVE.dec();
        }
        NAVIGATION_COMPLETED => {
            metric_inc!(NAVIGATIONS, &["completed"]);
            if let Some(ms) = event.data.get("durationMs").and_then(Value::as_f64) {
                let route = event
                    .data
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_else(|| str_field(event, "path"));
                metric_observe!(NAVIGATION_DURATION, &[route], ms / 1000.0);
            }
        }
        NAVIGATION_FAILED => {
            let outcome = match str_field(event, "reason") {
                "not_found" => "not_found",
                _ => "failed",
            };
            metric_inc!(NAVIGATIONS, &[outcome]);
        }
        _ => {}
    }
}

fn str_field<'a>(event: &'a Event, name: &str) -> &'a str {
    event
        .data
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}
