//! Navigation state, outcomes and UI affordances.

use serde::Serialize;

use super::query::Query;
use super::route::{split_path, RouteParams};

/// A route matched against a concrete path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRoute {
    /// Normalized path, without the query string.
    pub path: String,
    /// Path as requested, query included.
    pub full_path: String,
    pub pattern: String,
    pub module: String,
    pub name: Option<String>,
    pub params: RouteParams,
    pub query: Query,
}

/// Snapshot returned by `Router::current_state`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub current_route: Option<ResolvedRoute>,
    pub is_navigating: bool,
}

impl NavigationState {
    /// Path of the current route, if any navigation has completed.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.current_route.as_ref().map(|r| r.path.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

impl NavigateOptions {
    #[must_use]
    pub fn replace() -> Self {
        Self { replace: true }
    }
}

/// Why a navigation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// Page rendered and all after-hooks ran.
    Completed,
    /// Another navigation was in flight.
    Dropped,
    /// A before-hook or middleware vetoed it.
    Aborted,
    NotFound,
    /// Loading or rendering failed; the fallback view is shown.
    Failed,
}

impl NavigationOutcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Dropped => "dropped",
            Self::Aborted => "aborted",
            Self::NotFound => "not_found",
            Self::Failed => "failed",
        }
    }
}

/// Result of `handle_link`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDisposition {
    /// Internal link, navigated in place.
    Intercepted(NavigationOutcome),
    /// Left for the host to follow.
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    pub path: String,
}

/// One crumb per path prefix, starting at home.
#[must_use]
pub fn breadcrumbs_for(path: &str) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb {
        label: "Home".to_string(),
        path: "/".to_string(),
    }];
    let mut prefix = String::new();
    for segment in split_path(path) {
        prefix.push('/');
        prefix.push_str(segment);
        crumbs.push(Breadcrumb {
            label: crumb_label(segment),
            path: prefix.clone(),
        });
    }
    crumbs
}

fn crumb_label(segment: &str) -> String {
    let spaced = segment.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
