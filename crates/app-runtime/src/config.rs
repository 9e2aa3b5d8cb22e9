//! # Runtime Configuration
//!
//! Unified configuration for the bus, the component factory and the router.
//!
//! Every value has a default; `PITWALL_*` environment variables override
//! them. [`RuntimeConfig::validate`] runs before a runtime is built.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `PITWALL_HISTORY_CAPACITY` | `bus.history_capacity` | `100` |
//! | `PITWALL_COMPONENT_MARKER` | `components.marker_attribute` | `data-component` |
//! | `PITWALL_COMPONENT_INITIALIZED_ATTR` | `components.initialized_attribute` | `data-component-initialized` |
//! | `PITWALL_COMPONENT_OPTIONS_ATTR` | `components.options_attribute` | `data-component-options` |
//! | `PITWALL_CLEANUP_INTERVAL_MS` | `components.cleanup_interval_ms` | `30000` |
//! | `PITWALL_MOUNT_SELECTOR` | `router.mount_selector` | `#app` |
//! | `PITWALL_FALLBACK_TITLE` | `router.fallback_title` | `Something went wrong` |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use pw_02_component_factory::FactorySettings;
use pw_03_router::RouterSettings;
use shared_bus::DEFAULT_HISTORY_CAPACITY;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Event history capacity must be greater than zero")]
    ZeroHistoryCapacity,

    #[error("Cleanup interval must be greater than zero")]
    ZeroCleanupInterval,

    #[error("Attribute name `{0}` must not be empty")]
    EmptyAttribute(&'static str),

    #[error("Router mount selector must not be empty")]
    EmptyMountSelector,
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub bus: BusConfig,
    pub components: ComponentConfig,
    pub router: RouterConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// Events kept in the diagnostic history ring.
    pub history_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentConfig {
    pub marker_attribute: String,
    pub initialized_attribute: String,
    pub options_attribute: String,
    /// Period of the orphan-cleanup sweep.
    pub cleanup_interval_ms: u64,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        let settings = FactorySettings::default();
        Self {
            marker_attribute: settings.marker_attribute,
            initialized_attribute: settings.initialized_attribute,
            options_attribute: settings.options_attribute,
            cleanup_interval_ms: 30_000,
        }
    }
}

impl ComponentConfig {
    #[must_use]
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }
}

impl From<&ComponentConfig> for FactorySettings {
    fn from(config: &ComponentConfig) -> Self {
        Self {
            marker_attribute: config.marker_attribute.clone(),
            initialized_attribute: config.initialized_attribute.clone(),
            options_attribute: config.options_attribute.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub mount_selector: String,
    pub fallback_title: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        let settings = RouterSettings::default();
        Self {
            mount_selector: settings.mount_selector,
            fallback_title: settings.fallback_title,
        }
    }
}

impl From<&RouterConfig> for RouterSettings {
    fn from(config: &RouterConfig) -> Self {
        Self {
            mount_selector: config.mount_selector.clone(),
            fallback_title: config.fallback_title.clone(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from `PITWALL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(capacity) = parse(&lookup, "PITWALL_HISTORY_CAPACITY")? {
            config.bus.history_capacity = capacity;
        }
        if let Some(marker) = lookup("PITWALL_COMPONENT_MARKER") {
            config.components.marker_attribute = marker;
        }
        if let Some(attr) = lookup("PITWALL_COMPONENT_INITIALIZED_ATTR") {
            config.components.initialized_attribute = attr;
        }
        if let Some(attr) = lookup("PITWALL_COMPONENT_OPTIONS_ATTR") {
            config.components.options_attribute = attr;
        }
        if let Some(interval) = parse(&lookup, "PITWALL_CLEANUP_INTERVAL_MS")? {
            config.components.cleanup_interval_ms = interval;
        }
        if let Some(selector) = lookup("PITWALL_MOUNT_SELECTOR") {
            config.router.mount_selector = selector;
        }
        if let Some(title) = lookup("PITWALL_FALLBACK_TITLE") {
            config.router.fallback_title = title;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bus.history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }
        if self.components.cleanup_interval_ms == 0 {
            return Err(ConfigError::ZeroCleanupInterval);
        }
        for (name, value) in [
            ("marker_attribute", &self.components.marker_attribute),
            ("initialized_attribute", &self.components.initialized_attribute),
            ("options_attribute", &self.components.options_attribute),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyAttribute(name));
            }
        }
        if self.router.mount_selector.trim().is_empty() {
            return Err(ConfigError::EmptyMountSelector);
        }
        Ok(())
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value: raw })
        })
        .transpose()
}
