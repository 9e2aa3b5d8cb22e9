//! # Route Matching
//!
//! Patterns and paths are split on `/` with empty segments dropped, so
//! `/races/42/` and `races/42` are the same path. A pattern segment starting
//! with `:` is dynamic and captures exactly one path segment under its name.
//!
//! | Pattern          | Path              | Params              |
//! |------------------|-------------------|---------------------|
//! | `/`              | `/`               | -                   |
//! | `/races/:raceId` | `/races/42`       | `raceId = "42"`     |
//! | `/races/:raceId` | `/races/42/laps`  | no match            |

use std::fmt;

use serde::{Serialize, Serializer};

use super::errors::RouterError;

/// Marker prefix of a dynamic segment.
pub const DYNAMIC_PREFIX: char = ':';

/// A route as registered by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDefinition {
    pub pattern: String,
    /// Key handed to the module loader.
    pub module: String,
    pub name: Option<String>,
}

impl RouteDefinition {
    pub fn new(pattern: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            module: module.into(),
            name: None,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Captured dynamic segments, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(Vec<(String, String)>);

impl RouteParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl Serialize for RouteParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Dynamic(String),
}

/// Split a path on `/`, dropping empty segments.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Canonical form of a path: leading `/`, no empty segments.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    format!("/{}", split_path(path).join("/"))
}

/// A registered route with its pattern pre-split.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRoute {
    pub definition: RouteDefinition,
    segments: Vec<Segment>,
}

impl CompiledRoute {
    pub fn compile(definition: RouteDefinition) -> Result<Self, RouterError> {
        let invalid = |reason: &str| RouterError::InvalidPattern {
            pattern: definition.pattern.clone(),
            reason: reason.to_string(),
        };
        if !definition.pattern.starts_with('/') {
            return Err(invalid("must start with `/`"));
        }
        if definition.module.is_empty() {
            return Err(invalid("module key is empty"));
        }

        let mut segments = Vec::new();
        for raw in split_path(&definition.pattern) {
            let segment = match raw.strip_prefix(DYNAMIC_PREFIX) {
                Some("") => return Err(invalid("dynamic segment without a name")),
                Some(name) => {
                    if segments
                        .iter()
                        .any(|s| matches!(s, Segment::Dynamic(n) if n == name))
                    {
                        return Err(invalid("parameter name used twice"));
                    }
                    Segment::Dynamic(name.to_string())
                }
                None => Segment::Literal(raw.to_string()),
            };
            segments.push(segment);
        }
        Ok(Self {
            definition,
            segments,
        })
    }

    pub fn is_dynamic(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Dynamic(_)))
    }

    /// Exact comparison, only meaningful for static routes.
    pub fn matches_exactly(&self, path_segments: &[&str]) -> bool {
        !self.is_dynamic()
            && self.segments.len() == path_segments.len()
            && self
                .segments
                .iter()
                .zip(path_segments)
                .all(|(s, p)| matches!(s, Segment::Literal(l) if l == p))
    }

    /// Match against a split path, capturing dynamic segments.
    pub fn capture(&self, path_segments: &[&str]) -> Option<RouteParams> {
        if self.segments.len() != path_segments.len() {
            return None;
        }
        let mut params = RouteParams::new();
        for (segment, actual) in self.segments.iter().zip(path_segments) {
            match segment {
                Segment::Literal(literal) if literal == actual => {}
                Segment::Literal(_) => return None,
                Segment::Dynamic(name) => params.insert(name.clone(), *actual),
            }
        }
        Some(params)
    }

    /// Build a concrete path by filling dynamic segments from `params`.
    pub fn build(&self, params: &RouteParams) -> Result<String, RouterError> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => parts.push(literal.clone()),
                Segment::Dynamic(name) => {
                    let value = params.get(name).ok_or_else(|| RouterError::MissingParam {
                        route: self.label(),
                        param: name.clone(),
                    })?;
                    parts.push(value.to_string());
                }
            }
        }
        Ok(format!("/{}", parts.join("/")))
    }

    fn label(&self) -> String {
        self.definition
            .name
            .clone()
            .unwrap_or_else(|| self.definition.pattern.clone())
    }
}

impl fmt::Display for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.definition.pattern)
    }
}

/// Pick the route for `path`: a static route equal to the path wins, then
/// the first dynamic route that matches, in registration order.
pub(crate) fn select<'a>(
    routes: &'a [CompiledRoute],
    path: &str,
) -> Option<(&'a CompiledRoute, RouteParams)> {
    let segments = split_path(path);
    if let Some(route) = routes.iter().find(|r| r.matches_exactly(&segments)) {
        return Some((route, RouteParams::new()));
    }
    routes
        .iter()
        .filter(|r| r.is_dynamic())
        .find_map(|r| r.capture(&segments).map(|params| (r, params)))
}
