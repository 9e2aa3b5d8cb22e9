//! # Events
//!
//! The message type that flows through the bus and the filter used to query
//! the diagnostic history.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata attached to every event.
///
/// `timestamp` and `correlation_id` are optional on input; the bus fills them
/// in before the event is recorded or dispatched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    /// Milliseconds since the Unix epoch.
    pub timestamp: Option<u64>,
    /// Module that emitted the event.
    pub source: Option<String>,
    /// Identifier tying related events together.
    pub correlation_id: Option<String>,
    /// Free-form extra fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn timestamp(mut self, millis: u64) -> Self {
        self.timestamp = Some(millis);
        self
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A typed, timestamped message broadcast through the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: Value,
    pub metadata: EventMetadata,
}

impl Event {
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            metadata: EventMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        self.metadata.correlation_id.as_deref()
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<u64> {
        self.metadata.timestamp
    }
}

/// Filter for history queries. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub event_type: Option<String>,
    pub correlation_id: Option<String>,
    /// Only events stamped at or after this time (ms).
    pub since: Option<u64>,
    /// Keep only the most recent `limit` matches.
    pub limit: Option<usize>,
}

impl HistoryFilter {
    /// Filter that matches all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn event_type(event_type: impl Into<String>) -> Self {
        Self {
            event_type: Some(event_type.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn since(mut self, millis: u64) -> Self {
        self.since = Some(millis);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check if an event matches this filter (ignores `limit`).
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(event_type) = &self.event_type {
            if &event.event_type != event_type {
                return false;
            }
        }
        if let Some(id) = &self.correlation_id {
            if event.correlation_id() != Some(id.as_str()) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if event.timestamp().unwrap_or(0) < since {
                return false;
            }
        }
        true
    }
}
