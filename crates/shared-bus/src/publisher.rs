//! # Event Publisher
//!
//! Defines the publishing side of the event bus and the in-process
//! [`EventBus`] implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::events::{Event, EventMetadata, HistoryFilter};
use crate::history::EventHistory;
use crate::middleware::EventMiddleware;
use crate::subscriber::{
    listener_fn, EventListener, ListenerId, ListenerOptions, ListenerRecord, ListenerRef,
};
use crate::DEFAULT_HISTORY_CAPACITY;

/// Errors from waiting on the bus.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("timed out after {timeout:?} waiting for `{event_type}`")]
    Timeout {
        event_type: String,
        timeout: Duration,
    },

    #[error("waiter for `{event_type}` was dropped")]
    Closed { event_type: String },
}

/// Result of a single `emit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Listeners ran; `failures` of them returned an error.
    Delivered { listeners: usize, failures: usize },
    /// A middleware stage cancelled delivery; no listener ran.
    Cancelled,
}

impl EmitOutcome {
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Trait for publishing events to the bus.
///
/// This is the interface modules use to emit events; it is what the
/// component factory and router depend on.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Emit an event and deliver it to every listener of `event_type`.
    async fn emit(&self, event_type: &str, data: Value, metadata: EventMetadata) -> EmitOutcome;

    /// Total number of events emitted, cancelled ones included.
    fn events_emitted(&self) -> u64;
}

/// In-process event bus.
pub struct EventBus {
    /// Per event type, sorted by descending priority then registration order.
    listeners: RwLock<HashMap<String, Vec<ListenerRecord>>>,

    /// Middleware stages in registration order.
    middleware: RwLock<Vec<Arc<dyn EventMiddleware>>>,

    history: Mutex<EventHistory>,

    next_listener_id: AtomicU64,

    events_emitted: AtomicU64,

    events_cancelled: AtomicU64,

    listener_failures: AtomicU64,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    #[must_use]
    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            middleware: RwLock::new(Vec::new()),
            history: Mutex::new(EventHistory::with_capacity(capacity)),
            next_listener_id: AtomicU64::new(1),
            events_emitted: AtomicU64::new(0),
            events_cancelled: AtomicU64::new(0),
            listener_failures: AtomicU64::new(0),
        }
    }

    /// Register a listener for `event_type`.
    pub fn on(
        &self,
        event_type: &str,
        listener: Arc<dyn EventListener>,
        options: ListenerOptions,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        let record = ListenerRecord {
            id,
            listener,
            priority: options.priority,
            once: options.once,
            context: options.context,
        };

        let mut table = self.listeners.write();
        let records = table.entry(event_type.to_string()).or_default();
        // Insert after every record of equal or higher priority.
        let position = records
            .iter()
            .position(|existing| existing.priority < record.priority)
            .unwrap_or(records.len());
        debug!(
            event_type,
            listener = %id,
            priority = record.priority,
            once = record.once,
            "Listener registered"
        );
        records.insert(position, record);
        id
    }

    /// Register a listener that is removed when it first fires.
    pub fn once(
        &self,
        event_type: &str,
        listener: Arc<dyn EventListener>,
        options: ListenerOptions,
    ) -> ListenerId {
        self.on(event_type, listener, options.once())
    }

    /// Remove a listener by id or by callback identity.
    ///
    /// Returns `true` if something was removed.
    pub fn off(&self, event_type: &str, target: impl Into<ListenerRef>) -> bool {
        let target = target.into();
        let mut table = self.listeners.write();
        let Some(records) = table.get_mut(event_type) else {
            return false;
        };

        let before = records.len();
        records.retain(|record| !target.matches(record));
        let removed = records.len() != before;
        if records.is_empty() {
            table.remove(event_type);
        }
        if removed {
            debug!(event_type, "Listener removed");
        }
        removed
    }

    /// Drop every listener of `event_type`, or of all types when `None`.
    pub fn remove_all(&self, event_type: Option<&str>) {
        let mut table = self.listeners.write();
        match event_type {
            Some(event_type) => {
                table.remove(event_type);
            }
            None => table.clear(),
        }
    }

    /// Append a middleware stage to the pipeline.
    pub fn use_middleware(&self, middleware: Arc<dyn EventMiddleware>) {
        self.middleware.write().push(middleware);
    }

    #[must_use]
    pub fn middleware_count(&self) -> usize {
        self.middleware.read().len()
    }

    #[must_use]
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners.read().get(event_type).map_or(0, Vec::len)
    }

    /// Event types with at least one listener, sorted.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.listeners.read().keys().cloned().collect();
        types.sort();
        types
    }

    /// Query the diagnostic history.
    #[must_use]
    pub fn history(&self, filter: &HistoryFilter) -> Vec<Event> {
        self.history.lock().query(filter)
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    #[must_use]
    pub fn history_capacity(&self) -> usize {
        self.history.lock().capacity()
    }

    #[must_use]
    pub fn events_cancelled(&self) -> u64 {
        self.events_cancelled.load(Ordering::Relaxed)
    }

    /// Listener invocations that returned an error, across all emits.
    #[must_use]
    pub fn listener_failures(&self) -> u64 {
        self.listener_failures.load(Ordering::Relaxed)
    }

    /// Resolve with the next `event_type` event, or fail after `timeout`.
    pub async fn wait_for(&self, event_type: &str, timeout: Duration) -> Result<Event, BusError> {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Mutex::new(Some(tx)));
        let listener = listener_fn(move |event| {
            let sender = slot.lock().take();
            async move {
                if let Some(tx) = sender {
                    let _ = tx.send(event);
                }
                Ok(())
            }
        });
        let id = self.once(event_type, listener, ListenerOptions::default());

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(event)) => Ok(event),
            Ok(Err(_)) => {
                self.off(event_type, id);
                Err(BusError::Closed {
                    event_type: event_type.to_string(),
                })
            }
            Err(_) => {
                self.off(event_type, id);
                Err(BusError::Timeout {
                    event_type: event_type.to_string(),
                    timeout,
                })
            }
        }
    }

    fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }

    fn stamp(mut metadata: EventMetadata) -> EventMetadata {
        if metadata.timestamp.is_none() {
            metadata.timestamp = Some(Self::current_timestamp());
        }
        if metadata.correlation_id.is_none() {
            metadata.correlation_id = Some(Uuid::new_v4().to_string());
        }
        metadata
    }

    /// Thread the event through every stage. `None` means cancelled.
    async fn run_middleware(&self, mut event: Event) -> Option<Event> {
        let stages = self.middleware.read().clone();
        for (index, stage) in stages.iter().enumerate() {
            let prior = event.clone();
            match stage.process(event).await {
                Ok(Some(next)) => event = next,
                Ok(None) => {
                    debug!(
                        event_type = %prior.event_type,
                        stage = index,
                        "Event cancelled by middleware"
                    );
                    return None;
                }
                Err(e) => {
                    warn!(
                        event_type = %prior.event_type,
                        stage = index,
                        error = %e,
                        "Middleware failed, continuing with unmodified event"
                    );
                    event = prior;
                }
            }
        }
        Some(event)
    }

    /// Remove a `once` listener before it fires. `false` if another
    /// emission already claimed it.
    fn claim_once(&self, event_type: &str, id: ListenerId) -> bool {
        self.off(event_type, id)
    }

    async fn dispatch(&self, event: &Event) -> EmitOutcome {
        let records = self
            .listeners
            .read()
            .get(&event.event_type)
            .cloned()
            .unwrap_or_default();

        let mut invoked = 0;
        let mut failures = 0;
        for record in records {
            if record.once && !self.claim_once(&event.event_type, record.id) {
                continue;
            }
            invoked += 1;
            if let Err(e) = record.listener.on_event(event).await {
                failures += 1;
                self.listener_failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    event_type = %event.event_type,
                    listener = %record.id,
                    context = record.context.as_deref().unwrap_or("-"),
                    error = %e,
                    "Event listener failed"
                );
            }
        }

        EmitOutcome::Delivered {
            listeners: invoked,
            failures,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for EventBus {
    async fn emit(&self, event_type: &str, data: Value, metadata: EventMetadata) -> EmitOutcome {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);

        let event = Event {
            event_type: event_type.to_string(),
            data,
            metadata: Self::stamp(metadata),
        };
        self.history.lock().record(event.clone());

        let Some(event) = self.run_middleware(event).await else {
            self.events_cancelled.fetch_add(1, Ordering::Relaxed);
            return EmitOutcome::Cancelled;
        };

        let outcome = self.dispatch(&event).await;
        debug!(event_type, outcome = ?outcome, "Event emitted");
        outcome
    }

    fn events_emitted(&self) -> u64 {
        self.events_emitted.load(Ordering::Relaxed)
    }
}
