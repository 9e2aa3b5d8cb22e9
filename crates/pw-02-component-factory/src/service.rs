//! # Component Factory Service
//!
//! Owns the kind registry, the live instance table and the template
//! registry. Tables are only touched in synchronous segments; lifecycle
//! events are emitted after the relevant lock has been released.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use serde_json::{json, Value};
use shared_bus::{EventMetadata, EventPublisher, COMPONENT_CREATED, COMPONENT_DESTROYED};
use shared_types::{Target, TargetRef, TargetResolver, DEFAULT_COMPONENT_MARKER};
use tracing::{debug, info, warn};

use crate::domain::component::{
    default_config, merge_options, Component, ComponentConstructor, ComponentKind,
    ComponentOptions, InstanceId,
};
use crate::domain::errors::ComponentError;
use crate::domain::record::{ComponentInstanceRecord, ComponentRef, FactoryStats};
use crate::domain::template::{interpolate, TemplateRegistry};

const EVENT_SOURCE: &str = "component-factory";

/// Attribute names `auto_create` looks for on candidate elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorySettings {
    /// Names the component kind to host.
    pub marker_attribute: String,
    /// Set to `"true"` once an element has been given its instance.
    pub initialized_attribute: String,
    /// Optional JSON object merged over the kind's default config.
    pub options_attribute: String,
}

impl Default for FactorySettings {
    fn default() -> Self {
        Self {
            marker_attribute: DEFAULT_COMPONENT_MARKER.to_string(),
            initialized_attribute: format!("{DEFAULT_COMPONENT_MARKER}-initialized"),
            options_attribute: format!("{DEFAULT_COMPONENT_MARKER}-options"),
        }
    }
}

/// One entry of a `create_multiple` batch.
#[derive(Debug, Clone)]
pub struct ComponentDefinition {
    pub kind: String,
    pub target: TargetRef,
    pub options: Value,
}

impl ComponentDefinition {
    pub fn new(kind: impl Into<String>, target: impl Into<TargetRef>) -> Self {
        Self {
            kind: kind.into(),
            target: target.into(),
            options: Value::Null,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}

/// Registry and lifecycle manager for UI components.
pub struct ComponentFactory {
    kinds: RwLock<HashMap<String, ComponentKind>>,
    instances: RwLock<HashMap<InstanceId, ComponentInstanceRecord>>,
    templates: RwLock<TemplateRegistry>,
    resolver: Arc<dyn TargetResolver>,
    publisher: Arc<dyn EventPublisher>,
    settings: FactorySettings,
}

impl ComponentFactory {
    pub fn new(publisher: Arc<dyn EventPublisher>, resolver: Arc<dyn TargetResolver>) -> Self {
        Self::with_settings(publisher, resolver, FactorySettings::default())
    }

    pub fn with_settings(
        publisher: Arc<dyn EventPublisher>,
        resolver: Arc<dyn TargetResolver>,
        settings: FactorySettings,
    ) -> Self {
        Self {
            kinds: RwLock::new(HashMap::new()),
            instances: RwLock::new(HashMap::new()),
            templates: RwLock::new(TemplateRegistry::new()),
            resolver,
            publisher,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &FactorySettings {
        &self.settings
    }

    // =========================================================================
    // Kind registry
    // =========================================================================

    /// Register a component kind.
    ///
    /// The constructor receives the resolved target and the merged options.
    /// Its product must implement [`Component`], which is how the required
    /// `render`/`destroy` capabilities are checked.
    ///
    /// # Errors
    ///
    /// - `InvalidKind` for an empty or whitespace-containing name
    /// - `DuplicateKind` if the name is taken
    /// - `InvalidOptions` if `default_config` is neither null nor an object
    pub fn register<C, F>(
        &self,
        kind: &str,
        constructor: F,
        default_config_value: Value,
    ) -> Result<(), ComponentError>
    where
        C: Component + 'static,
        F: Fn(Target, ComponentOptions) -> Result<C, ComponentError> + Send + Sync + 'static,
    {
        if kind.is_empty() || kind.chars().any(char::is_whitespace) {
            return Err(ComponentError::InvalidKind(kind.to_string()));
        }
        let defaults = default_config(kind, default_config_value)?;
        let constructor: ComponentConstructor = Arc::new(move |target, options| {
            constructor(target, options).map(|component| Arc::new(component) as Arc<dyn Component>)
        });

        let mut kinds = self.kinds.write();
        if kinds.contains_key(kind) {
            return Err(ComponentError::DuplicateKind(kind.to_string()));
        }
        kinds.insert(
            kind.to_string(),
            ComponentKind {
                constructor,
                default_config: defaults,
            },
        );
        info!(kind = %kind, "Component kind registered");
        Ok(())
    }

    /// Forget a kind. Live instances of it are left alone.
    pub fn unregister(&self, kind: &str) -> bool {
        self.kinds.write().remove(kind).is_some()
    }

    #[must_use]
    pub fn is_registered(&self, kind: &str) -> bool {
        self.kinds.read().contains_key(kind)
    }

    /// Registered kind names, sorted.
    #[must_use]
    pub fn registered_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.kinds.read().keys().cloned().collect();
        kinds.sort();
        kinds
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Build and render one instance of `kind` inside `target`.
    ///
    /// Emits `component.created` once the instance is recorded.
    pub async fn create(
        &self,
        kind: &str,
        target: impl Into<TargetRef>,
        options: Value,
    ) -> Result<ComponentInstanceRecord, ComponentError> {
        let record = self.construct(kind, &target.into(), options)?;
        self.publisher
            .emit(
                COMPONENT_CREATED,
                json!({
                    "instanceId": record.instance_id,
                    "kind": record.kind,
                    "target": record.target.label(),
                }),
                EventMetadata::new().source(EVENT_SOURCE),
            )
            .await;
        Ok(record)
    }

    fn construct(
        &self,
        kind: &str,
        target: &TargetRef,
        options: Value,
    ) -> Result<ComponentInstanceRecord, ComponentError> {
        let definition = self
            .kinds
            .read()
            .get(kind)
            .cloned()
            .ok_or_else(|| ComponentError::UnknownKind(kind.to_string()))?;
        let handle = target
            .resolve(self.resolver.as_ref())
            .ok_or_else(|| ComponentError::TargetNotFound(target.to_string()))?;
        let options = merge_options(kind, &definition.default_config, options)?;

        let instance = (definition.constructor)(Arc::clone(&handle), options)?;
        instance.render();

        let record = ComponentInstanceRecord {
            instance_id: InstanceId::generate(kind),
            kind: kind.to_string(),
            instance,
            target: handle,
            created_at: now_millis(),
        };
        self.instances
            .write()
            .insert(record.instance_id.clone(), record.clone());
        debug!(
            instance_id = %record.instance_id,
            target = %record.target.label(),
            "Component created"
        );
        Ok(record)
    }

    /// Create every definition in order, one result per definition.
    pub async fn create_multiple(
        &self,
        definitions: Vec<ComponentDefinition>,
    ) -> Vec<Result<ComponentInstanceRecord, ComponentError>> {
        let mut results = Vec::with_capacity(definitions.len());
        for definition in definitions {
            results.push(
                self.create(&definition.kind, definition.target, definition.options)
                    .await,
            );
        }
        results
    }

    /// Instantiate every marked, not yet initialized descendant of `root`.
    ///
    /// Failures are logged per element and never abort the scan. Running it
    /// again over an unchanged subtree creates nothing.
    pub async fn auto_create(&self, root: &Target) -> Vec<ComponentInstanceRecord> {
        let settings = &self.settings;
        let mut created = Vec::new();

        for element in root.descendants() {
            let Some(kind) = element.attribute(&settings.marker_attribute) else {
                continue;
            };
            if element.attribute(&settings.initialized_attribute).as_deref() == Some("true") {
                continue;
            }
            let options = match element.attribute(&settings.options_attribute) {
                Some(raw) => match serde_json::from_str::<Value>(&raw) {
                    Ok(options) => options,
                    Err(e) => {
                        warn!(
                            kind = %kind,
                            target = %element.label(),
                            error = %e,
                            "Malformed component options, element skipped"
                        );
                        continue;
                    }
                },
                None => Value::Null,
            };

            match self
                .create(&kind, TargetRef::Handle(Arc::clone(&element)), options)
                .await
            {
                Ok(record) => {
                    element.set_attribute(&settings.initialized_attribute, "true");
                    created.push(record);
                }
                Err(e) => {
                    warn!(
                        kind = %kind,
                        target = %element.label(),
                        error = %e,
                        "Auto-create failed for element"
                    );
                }
            }
        }

        if !created.is_empty() {
            debug!(root = %root.label(), count = created.len(), "Auto-created components");
        }
        created
    }

    // =========================================================================
    // Destruction
    // =========================================================================

    /// Destroy one instance. Returns `false` (and logs) if it is unknown.
    pub async fn destroy(&self, component: impl Into<ComponentRef>) -> bool {
        let component = component.into();
        let record = {
            let mut instances = self.instances.write();
            let id = instances
                .values()
                .find(|record| component.matches(record))
                .map(|record| record.instance_id.clone());
            id.and_then(|id| instances.remove(&id))
        };
        let Some(record) = record else {
            warn!("Destroy requested for unknown component instance");
            return false;
        };
        self.finish_destroy(record).await;
        true
    }

    async fn finish_destroy(&self, record: ComponentInstanceRecord) {
        record.instance.destroy();
        debug!(instance_id = %record.instance_id, "Component destroyed");
        self.publisher
            .emit(
                COMPONENT_DESTROYED,
                json!({
                    "instanceId": record.instance_id,
                    "kind": record.kind,
                    "target": record.target.label(),
                }),
                EventMetadata::new().source(EVENT_SOURCE),
            )
            .await;
    }

    /// Destroy every instance of `kind`, returning how many went.
    pub async fn destroy_all_of_type(&self, kind: &str) -> usize {
        let removed = self.take_where(|record| record.kind == kind);
        let count = removed.len();
        for record in removed {
            self.finish_destroy(record).await;
        }
        count
    }

    /// Destroy every live instance.
    pub async fn destroy_all(&self) -> usize {
        let removed = self.take_where(|_| true);
        let count = removed.len();
        for record in removed {
            self.finish_destroy(record).await;
        }
        count
    }

    /// Reclaim instances whose target is no longer part of the live tree.
    ///
    /// Safe to call at any time; a second sweep right after the first finds
    /// nothing.
    pub async fn cleanup(&self) -> usize {
        let orphans = self.take_where(|record| !record.target.is_connected());
        let count = orphans.len();
        for record in orphans {
            self.finish_destroy(record).await;
        }
        if count > 0 {
            info!(reclaimed = count, "Orphaned components cleaned up");
        }
        count
    }

    /// Remove matching records in one synchronous step, oldest first.
    fn take_where(
        &self,
        predicate: impl Fn(&ComponentInstanceRecord) -> bool,
    ) -> Vec<ComponentInstanceRecord> {
        let mut instances = self.instances.write();
        let ids: Vec<InstanceId> = instances
            .values()
            .filter(|record| predicate(record))
            .map(|record| record.instance_id.clone())
            .collect();
        let mut removed: Vec<ComponentInstanceRecord> =
            ids.iter().filter_map(|id| instances.remove(id)).collect();
        removed.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.instance_id.cmp(&b.instance_id))
        });
        removed
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[must_use]
    pub fn instance(&self, id: &InstanceId) -> Option<ComponentInstanceRecord> {
        self.instances.read().get(id).cloned()
    }

    /// Live instances of `kind`, oldest first.
    #[must_use]
    pub fn instances_of(&self, kind: &str) -> Vec<ComponentInstanceRecord> {
        let mut records: Vec<ComponentInstanceRecord> = self
            .instances
            .read()
            .values()
            .filter(|record| record.kind == kind)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.created_at);
        records
    }

    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.read().len()
    }

    #[must_use]
    pub fn get_stats(&self) -> FactoryStats {
        let mut instances_by_kind = BTreeMap::new();
        let total_instances = {
            let instances = self.instances.read();
            for record in instances.values() {
                *instances_by_kind.entry(record.kind.clone()).or_insert(0) += 1;
            }
            instances.len()
        };
        FactoryStats {
            registered_kinds: self.registered_kinds(),
            total_instances,
            instances_by_kind,
        }
    }

    /// Forward a state transition to one instance.
    pub fn notify_state_change(&self, id: &InstanceId, new_state: &Value, old_state: &Value) -> bool {
        let Some(record) = self.instance(id) else {
            return false;
        };
        record.instance.on_state_change(new_state, old_state);
        true
    }

    /// Forward a state transition to every live instance.
    pub fn broadcast_state_change(&self, new_state: &Value, old_state: &Value) -> usize {
        let records: Vec<ComponentInstanceRecord> =
            self.instances.read().values().cloned().collect();
        for record in &records {
            record.instance.on_state_change(new_state, old_state);
        }
        records.len()
    }

    // =========================================================================
    // Templates
    // =========================================================================

    pub fn register_template(&self, name: impl Into<String>, template: impl Into<String>) {
        self.templates.write().register(name, template);
    }

    /// Render a named template with `data`.
    pub fn render_template(&self, name: &str, data: &Value) -> Result<String, ComponentError> {
        let templates = self.templates.read();
        let template = templates
            .get(name)
            .ok_or_else(|| ComponentError::TemplateNotFound(name.to_string()))?;
        Ok(interpolate(template, data))
    }

    #[must_use]
    pub fn has_template(&self, name: &str) -> bool {
        self.templates.read().contains(name)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
