//! Periodic orphan sweep.
//!
//! The factory never schedules its own cleanup; the host decides the cadence.
//! This task runs `ComponentFactory::cleanup` on a tokio interval until the
//! shutdown signal flips.

use std::sync::Arc;
use std::time::Duration;

use pitwall_telemetry::ORPHANS_RECLAIMED;
use pw_02_component_factory::ComponentFactory;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Spawn the sweep. The first sweep runs one full `interval` after spawning.
pub fn spawn_cleanup_task(
    factory: Arc<ComponentFactory>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + interval;
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        info!(interval_ms, "Component cleanup task started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let reclaimed = factory.cleanup().await;
                    if reclaimed > 0 {
                        ORPHANS_RECLAIMED.inc_by(u64::try_from(reclaimed).unwrap_or(u64::MAX));
                    }
                    debug!(reclaimed, live = factory.instance_count(), "Cleanup sweep finished");
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Component cleanup task stopping");
                        break;
                    }
                }
            }
        }
    })
}
