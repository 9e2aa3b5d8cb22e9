//! Live instance bookkeeping.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use shared_types::Target;

use super::component::{Component, InstanceId};

/// One live component instance as tracked by the factory.
#[derive(Clone)]
pub struct ComponentInstanceRecord {
    pub instance_id: InstanceId,
    pub kind: String,
    pub instance: Arc<dyn Component>,
    pub target: Target,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl ComponentInstanceRecord {
    /// Whether `instance` is this record's component (by identity).
    #[must_use]
    pub fn holds(&self, instance: &Arc<dyn Component>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.instance), Arc::as_ptr(instance))
    }
}

impl fmt::Debug for ComponentInstanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstanceRecord")
            .field("instance_id", &self.instance_id)
            .field("kind", &self.kind)
            .field("target", &self.target.label())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// How `destroy` identifies the instance to tear down.
#[derive(Clone)]
pub enum ComponentRef {
    Id(InstanceId),
    Instance(Arc<dyn Component>),
}

impl ComponentRef {
    pub(crate) fn matches(&self, record: &ComponentInstanceRecord) -> bool {
        match self {
            Self::Id(id) => record.instance_id == *id,
            Self::Instance(instance) => record.holds(instance),
        }
    }
}

impl From<InstanceId> for ComponentRef {
    fn from(id: InstanceId) -> Self {
        Self::Id(id)
    }
}

impl From<&InstanceId> for ComponentRef {
    fn from(id: &InstanceId) -> Self {
        Self::Id(id.clone())
    }
}

impl From<&str> for ComponentRef {
    fn from(id: &str) -> Self {
        Self::Id(InstanceId::from(id))
    }
}

impl From<Arc<dyn Component>> for ComponentRef {
    fn from(instance: Arc<dyn Component>) -> Self {
        Self::Instance(instance)
    }
}

impl From<&Arc<dyn Component>> for ComponentRef {
    fn from(instance: &Arc<dyn Component>) -> Self {
        Self::Instance(Arc::clone(instance))
    }
}

impl From<&ComponentInstanceRecord> for ComponentRef {
    fn from(record: &ComponentInstanceRecord) -> Self {
        Self::Id(record.instance_id.clone())
    }
}

/// Snapshot returned by `get_stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryStats {
    pub registered_kinds: Vec<String>,
    pub total_instances: usize,
    pub instances_by_kind: BTreeMap<String, usize>,
}
