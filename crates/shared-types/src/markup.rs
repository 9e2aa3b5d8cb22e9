//! # Rendered Markup
//!
//! Output of a component or page render. Besides the rendered text, markup
//! carries declarative child mounts: rendering into a mount point replaces its
//! children with one node per [`MountSpec`], which is what the component
//! factory's auto-creation scans for.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Attribute naming the component kind a mount should host.
pub const DEFAULT_COMPONENT_MARKER: &str = "data-component";

/// Rendered output plus the child mount points it declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markup {
    pub html: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<MountSpec>,
}

impl Markup {
    #[must_use]
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            mounts: Vec::new(),
        }
    }

    /// Declare a child mount point.
    #[must_use]
    pub fn with_mount(mut self, mount: MountSpec) -> Self {
        self.mounts.push(mount);
        self
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.html
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html)
    }
}

impl From<String> for Markup {
    fn from(html: String) -> Self {
        Self::new(html)
    }
}

impl From<&str> for Markup {
    fn from(html: &str) -> Self {
        Self::new(html)
    }
}

/// Declarative description of a child mount point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountSpec {
    pub id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MountSpec>,
}

impl MountSpec {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Mount that declares a component of `kind` under the default marker.
    #[must_use]
    pub fn component(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::new(id).attr(DEFAULT_COMPONENT_MARKER, kind)
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: MountSpec) -> Self {
        self.children.push(child);
        self
    }
}
