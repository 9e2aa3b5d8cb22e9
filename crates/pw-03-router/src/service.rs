//! # Router Service
//!
//! Drives the navigation pipeline. At most one navigation runs at a time;
//! a call made while one is in flight returns [`NavigationOutcome::Dropped`]
//! without touching anything.
//!
//! Hook, middleware and route tables are snapshotted before each await, so
//! no lock is ever held across a suspension point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde_json::json;
use shared_bus::{EventMetadata, EventPublisher};
use shared_types::{Markup, Target, TargetResolver};
use tracing::{debug, error, info, warn};

use crate::domain::errors::{PageError, RouterError};
use crate::domain::query::{parse_query, split_query};
use crate::domain::route::{normalize_path, select, CompiledRoute, RouteDefinition, RouteParams};
use crate::domain::state::{
    breadcrumbs_for, Breadcrumb, LinkDisposition, NavigateOptions, NavigationOutcome,
    NavigationState, ResolvedRoute,
};
use crate::ports::{AfterHook, BeforeHook, ComponentMounter, History, ModuleLoader, RouteMiddleware};

/// Emitted after a page rendered successfully.
pub const NAVIGATION_COMPLETED: &str = "navigation.completed";
/// Emitted when a navigation ended without rendering its page.
pub const NAVIGATION_FAILED: &str = "navigation.failed";

const EVENT_SOURCE: &str = "router";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterSettings {
    /// Selector of the container pages render into.
    pub mount_selector: String,
    /// Heading of the fallback view shown when a page fails.
    pub fallback_title: String,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            mount_selector: "#app".to_string(),
            fallback_title: "Something went wrong".to_string(),
        }
    }
}

/// Clears the in-flight flag when the navigation future finishes or is
/// dropped.
struct NavigationGuard<'a>(&'a AtomicBool);

impl Drop for NavigationGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Router {
    routes: RwLock<Vec<CompiledRoute>>,
    before_hooks: RwLock<Vec<Arc<dyn BeforeHook>>>,
    after_hooks: RwLock<Vec<Arc<dyn AfterHook>>>,
    middleware: RwLock<Vec<Arc<dyn RouteMiddleware>>>,
    current: RwLock<Option<ResolvedRoute>>,
    breadcrumbs: RwLock<Vec<Breadcrumb>>,
    navigating: AtomicBool,
    loader: Arc<dyn ModuleLoader>,
    history: Arc<dyn History>,
    resolver: Arc<dyn TargetResolver>,
    publisher: Arc<dyn EventPublisher>,
    mounter: Option<Arc<dyn ComponentMounter>>,
    settings: RouterSettings,
}

impl Router {
    pub fn new(
        loader: Arc<dyn ModuleLoader>,
        history: Arc<dyn History>,
        resolver: Arc<dyn TargetResolver>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            routes: RwLock::new(Vec::new()),
            before_hooks: RwLock::new(Vec::new()),
            after_hooks: RwLock::new(Vec::new()),
            middleware: RwLock::new(Vec::new()),
            current: RwLock::new(None),
            breadcrumbs: RwLock::new(Vec::new()),
            navigating: AtomicBool::new(false),
            loader,
            history,
            resolver,
            publisher,
            mounter: None,
            settings: RouterSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RouterSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Auto-create declared components after every page render.
    #[must_use]
    pub fn with_component_mounter(mut self, mounter: Arc<dyn ComponentMounter>) -> Self {
        self.mounter = Some(mounter);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    // =========================================================================
    // Route table
    // =========================================================================

    /// Append a route. Registration order decides between dynamic patterns
    /// that match the same path.
    pub fn add_route(&self, definition: RouteDefinition) -> Result<(), RouterError> {
        let compiled = CompiledRoute::compile(definition)?;
        let mut routes = self.routes.write();
        let pattern = normalize_path(&compiled.definition.pattern);
        if routes
            .iter()
            .any(|r| normalize_path(&r.definition.pattern) == pattern)
        {
            return Err(RouterError::DuplicateRoute(compiled.definition.pattern));
        }
        if let Some(name) = &compiled.definition.name {
            if routes
                .iter()
                .any(|r| r.definition.name.as_ref() == Some(name))
            {
                return Err(RouterError::DuplicateRoute(name.clone()));
            }
        }
        debug!(pattern = %compiled, "Route added");
        routes.push(compiled);
        Ok(())
    }

    pub fn add_routes(
        &self,
        definitions: impl IntoIterator<Item = RouteDefinition>,
    ) -> Result<(), RouterError> {
        definitions
            .into_iter()
            .try_for_each(|definition| self.add_route(definition))
    }

    /// Remove the route registered under `pattern`.
    pub fn remove_route(&self, pattern: &str) -> bool {
        let pattern = normalize_path(pattern);
        let mut routes = self.routes.write();
        let before = routes.len();
        routes.retain(|r| normalize_path(&r.definition.pattern) != pattern);
        routes.len() != before
    }

    #[must_use]
    pub fn routes(&self) -> Vec<RouteDefinition> {
        self.routes
            .read()
            .iter()
            .map(|r| r.definition.clone())
            .collect()
    }

    /// Concrete path of the route called `name`.
    pub fn path_for(&self, name: &str, params: &RouteParams) -> Result<String, RouterError> {
        let routes = self.routes.read();
        let route = routes
            .iter()
            .find(|r| r.definition.name.as_deref() == Some(name))
            .ok_or_else(|| RouterError::UnknownRouteName(name.to_string()))?;
        route.build(params)
    }

    /// Match `full_path` (query string allowed) against the route table.
    #[must_use]
    pub fn resolve(&self, full_path: &str) -> Option<ResolvedRoute> {
        let (path, raw_query) = split_query(full_path);
        let routes = self.routes.read();
        let (route, params) = select(&routes, path)?;
        Some(ResolvedRoute {
            path: normalize_path(path),
            full_path: full_path.to_string(),
            pattern: route.definition.pattern.clone(),
            module: route.definition.module.clone(),
            name: route.definition.name.clone(),
            params,
            query: parse_query(raw_query),
        })
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    pub fn before_each(&self, hook: Arc<dyn BeforeHook>) {
        self.before_hooks.write().push(hook);
    }

    pub fn after_each(&self, hook: Arc<dyn AfterHook>) {
        self.after_hooks.write().push(hook);
    }

    pub fn use_middleware(&self, middleware: Arc<dyn RouteMiddleware>) {
        self.middleware.write().push(middleware);
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Run the full navigation pipeline for `path`.
    pub async fn navigate(&self, path: &str, options: NavigateOptions) -> NavigationOutcome {
        if self
            .navigating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(path = %path, "Navigation already in flight, dropped");
            return NavigationOutcome::Dropped;
        }
        let _guard = NavigationGuard(&self.navigating);
        let started = Instant::now();
        let from = self.current_route();

        let before_hooks = self.before_hooks.read().clone();
        for hook in before_hooks {
            if !hook.before(path, from.as_ref()).await {
                info!(path = %path, "Navigation aborted by before hook");
                return NavigationOutcome::Aborted;
            }
        }

        let Some(route) = self.resolve(path) else {
            warn!(path = %path, "No route matches path");
            self.emit_failed(path, None, "not_found").await;
            return NavigationOutcome::NotFound;
        };

        let middleware = self.middleware.read().clone();
        for stage in middleware {
            if !stage.handle(&route).await {
                info!(path = %path, pattern = %route.pattern, "Navigation aborted by middleware");
                return NavigationOutcome::Aborted;
            }
        }

        if options.replace {
            self.history.replace(&route.full_path);
        } else {
            self.history.push(&route.full_path);
        }
        *self.current.write() = Some(route.clone());

        if let Err(e) = self.render_route(&route).await {
            error!(path = %path, module = %route.module, error = %e, "Page failed to render");
            self.render_fallback(&e);
            self.emit_failed(path, Some(&route), &e.to_string()).await;
            return NavigationOutcome::Failed;
        }

        *self.breadcrumbs.write() = breadcrumbs_for(&route.path);

        let after_hooks = self.after_hooks.read().clone();
        for hook in after_hooks {
            hook.after(&route, from.as_ref()).await;
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(path = %route.path, pattern = %route.pattern, elapsed_ms, "Navigation completed");
        self.publisher
            .emit(
                NAVIGATION_COMPLETED,
                json!({
                    "path": route.path,
                    "fullPath": route.full_path,
                    "name": route.name,
                    "params": route.params,
                    "query": route.query,
                    "from": from.as_ref().map(|r| r.path.clone()),
                    "durationMs": elapsed_ms,
                }),
                EventMetadata::new().source(EVENT_SOURCE),
            )
            .await;
        NavigationOutcome::Completed
    }

    async fn render_route(&self, route: &ResolvedRoute) -> Result<(), PageError> {
        let target = self.mount_target()?;
        let module = self.loader.load(&route.module).await?;
        let markup = module.render(&route.params, &route.query).await?;
        target.render(markup);

        if let Some(mounter) = &self.mounter {
            let mounted = mounter.mount(&target).await;
            debug!(path = %route.path, mounted, "Page components mounted");
        }

        module.init(&route.params, &route.query).await
    }

    fn mount_target(&self) -> Result<Target, PageError> {
        self.resolver
            .resolve(&self.settings.mount_selector)
            .ok_or_else(|| PageError::MountNotFound(self.settings.mount_selector.clone()))
    }

    fn render_fallback(&self, error: &PageError) {
        match self.mount_target() {
            Ok(target) => target.render(Markup::new(format!(
                "<div class=\"route-error\"><h1>{}</h1><p>{}</p></div>",
                escape_html(&self.settings.fallback_title),
                escape_html(&error.to_string())
            ))),
            Err(e) => warn!(error = %e, "No mount point for fallback view"),
        }
    }

    async fn emit_failed(&self, path: &str, route: Option<&ResolvedRoute>, reason: &str) {
        self.publisher
            .emit(
                NAVIGATION_FAILED,
                json!({
                    "path": path,
                    "name": route.and_then(|r| r.name.clone()),
                    "params": route.map(|r| &r.params),
                    "reason": reason,
                }),
                EventMetadata::new().source(EVENT_SOURCE),
            )
            .await;
    }

    /// Navigate to the history's current entry (or `fallback`) without
    /// adding an entry. Used once at startup.
    pub async fn start(&self, fallback: &str) -> NavigationOutcome {
        let path = self.history.current().unwrap_or_else(|| fallback.to_string());
        self.navigate(&path, NavigateOptions::replace()).await
    }

    /// Replay navigation for a history traversal.
    pub async fn handle_pop_state(&self, path: &str) -> NavigationOutcome {
        self.navigate(path, NavigateOptions::replace()).await
    }

    /// Move through history by `delta` entries. `None` if out of range.
    pub async fn go(&self, delta: i64) -> Option<NavigationOutcome> {
        let path = self.history.go(delta)?;
        Some(self.handle_pop_state(&path).await)
    }

    pub async fn back(&self) -> Option<NavigationOutcome> {
        self.go(-1).await
    }

    pub async fn forward(&self) -> Option<NavigationOutcome> {
        self.go(1).await
    }

    // =========================================================================
    // Links
    // =========================================================================

    /// Whether `href` stays inside the app (root-relative, not
    /// protocol-relative).
    #[must_use]
    pub fn is_internal_link(&self, href: &str) -> bool {
        href.starts_with('/') && !href.starts_with("//")
    }

    /// Navigate in place for internal links; leave the rest to the host.
    pub async fn handle_link(&self, href: &str) -> LinkDisposition {
        if self.is_internal_link(href) {
            LinkDisposition::Intercepted(self.navigate(href, NavigateOptions::default()).await)
        } else {
            LinkDisposition::External
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    #[must_use]
    pub fn current_route(&self) -> Option<ResolvedRoute> {
        self.current.read().clone()
    }

    #[must_use]
    pub fn current_state(&self) -> NavigationState {
        NavigationState {
            current_route: self.current_route(),
            is_navigating: self.is_navigating(),
        }
    }

    #[must_use]
    pub fn is_navigating(&self) -> bool {
        self.navigating.load(Ordering::Acquire)
    }

    /// Whether `path` (query ignored) is the current route's path.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        let (path, _) = split_query(path);
        let path = normalize_path(path);
        self.current
            .read()
            .as_ref()
            .is_some_and(|route| route.path == path)
    }

    #[must_use]
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.breadcrumbs.read().clone()
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MemoryHistory, StaticModuleLoader};
    use crate::domain::query::{Query, QueryValue};
    use crate::ports::{after_hook_fn, before_hook_fn, route_middleware_fn, PageModule};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared_bus::{EventBus, HistoryFilter};
    use shared_types::{MountTree, TargetHandle};
    use std::time::Duration;
    use tokio::sync::Notify;

    struct Page(&'static str);

    #[async_trait]
    impl PageModule for Page {
        async fn render(&self, params: &RouteParams, query: &Query) -> Result<Markup, PageError> {
            let tab = query.get("tab").and_then(QueryValue::as_str).unwrap_or("-");
            let id = params.get("raceId").unwrap_or("-");
            Ok(Markup::new(format!("{}:{}:{}", self.0, id, tab)))
        }
    }

    struct Broken;

    #[async_trait]
    impl PageModule for Broken {
        async fn render(&self, _: &RouteParams, _: &Query) -> Result<Markup, PageError> {
            Err(PageError::Render("template exploded".into()))
        }
    }

    /// Loader whose loads block until released.
    struct GatedLoader {
        inner: StaticModuleLoader,
        started: Notify,
        release: Notify,
        gated: AtomicBool,
    }

    #[async_trait]
    impl ModuleLoader for GatedLoader {
        async fn load(&self, key: &str) -> Result<Arc<dyn PageModule>, PageError> {
            if self.gated.swap(false, Ordering::SeqCst) {
                self.started.notify_one();
                self.release.notified().await;
            }
            self.inner.load(key).await
        }
    }

    struct Fixture {
        router: Arc<Router>,
        history: Arc<MemoryHistory>,
        tree: Arc<MountTree>,
        bus: Arc<EventBus>,
        app: Target,
    }

    fn pages() -> StaticModuleLoader {
        let loader = StaticModuleLoader::new();
        loader.register("home", Arc::new(Page("home")));
        loader.register("feed", Arc::new(Page("feed")));
        loader.register("race", Arc::new(Page("race")));
        loader.register("broken", Arc::new(Broken));
        loader
    }

    fn fixture_with(loader: Arc<dyn ModuleLoader>) -> Fixture {
        let history = Arc::new(MemoryHistory::new());
        let tree = Arc::new(MountTree::new());
        let app = tree.append_to_root("app");
        let bus = Arc::new(EventBus::new());
        let router = Router::new(loader, history.clone(), tree.clone(), bus.clone());
        router
            .add_routes([
                RouteDefinition::new("/", "home").named("home"),
                RouteDefinition::new("/feed", "feed").named("feed"),
                RouteDefinition::new("/races/:raceId", "race").named("race"),
                RouteDefinition::new("/broken", "broken"),
            ])
            .unwrap();
        Fixture {
            router: Arc::new(router),
            history,
            tree,
            bus,
            app,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(pages()))
    }

    #[tokio::test]
    async fn test_navigate_captures_params_and_query() {
        let f = fixture();

        let outcome = f
            .router
            .navigate("/races/42?tab=results", NavigateOptions::default())
            .await;

        assert_eq!(outcome, NavigationOutcome::Completed);
        let route = f.router.current_route().unwrap();
        assert_eq!(route.params.get("raceId"), Some("42"));
        assert_eq!(route.params.len(), 1);
        assert_eq!(route.query.len(), 1);
        assert_eq!(route.query["tab"], QueryValue::Text("results".into()));
        assert_eq!(f.app.content(), "race:42:results");
        assert_eq!(f.history.entries(), vec!["/races/42?tab=results"]);
        assert!(f.router.is_active("/races/42"));
        assert!(!f.router.is_navigating());
    }

    #[tokio::test]
    async fn test_navigation_while_pending_is_dropped() {
        let loader = Arc::new(GatedLoader {
            inner: pages(),
            started: Notify::new(),
            release: Notify::new(),
            gated: AtomicBool::new(true),
        });
        let f = fixture_with(loader.clone());

        let router = Arc::clone(&f.router);
        let pending =
            tokio::spawn(async move { router.navigate("/", NavigateOptions::default()).await });
        loader.started.notified().await;

        assert!(f.router.is_navigating());
        assert_eq!(
            f.router.navigate("/feed", NavigateOptions::default()).await,
            NavigationOutcome::Dropped
        );

        loader.release.notify_one();
        assert_eq!(pending.await.unwrap(), NavigationOutcome::Completed);
        assert_eq!(f.router.current_state().path(), Some("/"));

        assert_eq!(
            f.router.navigate("/feed", NavigateOptions::default()).await,
            NavigationOutcome::Completed
        );
        assert_eq!(f.history.entries(), vec!["/", "/feed"]);
    }

    #[tokio::test]
    async fn test_before_hook_false_changes_nothing() {
        let f = fixture();
        f.router.navigate("/", NavigateOptions::default()).await;
        f.router.before_each(before_hook_fn(|to, _| async move { to != "/feed" }));

        let outcome = f.router.navigate("/feed", NavigateOptions::default()).await;

        assert_eq!(outcome, NavigationOutcome::Aborted);
        assert_eq!(f.router.current_state().path(), Some("/"));
        assert_eq!(f.history.entries(), vec!["/"]);
        assert_eq!(f.app.content(), "home:-:-");
    }

    #[tokio::test]
    async fn test_middleware_veto_and_hook_order() {
        let f = fixture();
        let log = Arc::new(Mutex::new(Vec::new()));

        let l = Arc::clone(&log);
        f.router.before_each(before_hook_fn(move |to, _| {
            l.lock().push(format!("before:{to}"));
            async { true }
        }));
        let l = Arc::clone(&log);
        f.router.use_middleware(route_middleware_fn(move |route| {
            l.lock().push(format!("middleware:{}", route.pattern));
            let allowed = route.params.get("raceId") != Some("0");
            async move { allowed }
        }));
        let l = Arc::clone(&log);
        f.router.after_each(after_hook_fn(move |to, from| {
            l.lock()
                .push(format!("after:{}<-{:?}", to.path, from.map(|r| r.path)));
            async {}
        }));

        assert_eq!(
            f.router.navigate("/races/0", NavigateOptions::default()).await,
            NavigationOutcome::Aborted
        );
        assert!(f.history.is_empty());
        assert_eq!(
            f.router.navigate("/races/7", NavigateOptions::default()).await,
            NavigationOutcome::Completed
        );

        assert_eq!(
            *log.lock(),
            vec![
                "before:/races/0",
                "middleware:/races/:raceId",
                "before:/races/7",
                "middleware:/races/:raceId",
                "after:/races/7<-None",
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let f = fixture();
        let outcome = f.router.navigate("/nowhere", NavigateOptions::default()).await;

        assert_eq!(outcome, NavigationOutcome::NotFound);
        assert!(f.router.current_route().is_none());
        assert!(f.history.is_empty());
        let failed = f.bus.history(&HistoryFilter::event_type(NAVIGATION_FAILED));
        assert_eq!(failed[0].data["reason"], "not_found");
    }

    #[tokio::test]
    async fn test_render_failure_shows_fallback() {
        let f = fixture();
        let outcome = f.router.navigate("/broken", NavigateOptions::default()).await;

        assert_eq!(outcome, NavigationOutcome::Failed);
        assert!(f.app.content().contains("Something went wrong"));
        assert!(f.app.content().contains("template exploded"));
        assert_eq!(
            f.bus
                .history(&HistoryFilter::event_type(NAVIGATION_FAILED))
                .len(),
            1
        );
        assert!(!f.router.is_navigating());

        assert_eq!(
            f.router.navigate("/feed", NavigateOptions::default()).await,
            NavigationOutcome::Completed
        );
    }

    #[tokio::test]
    async fn test_fallback_escapes_error_text() {
        struct Hostile;

        #[async_trait]
        impl PageModule for Hostile {
            async fn render(&self, _: &RouteParams, _: &Query) -> Result<Markup, PageError> {
                Err(PageError::Render("<script>alert(\"x\")</script> & more".into()))
            }
        }

        let loader = pages();
        loader.register("broken", Arc::new(Hostile));
        let f = fixture_with(Arc::new(loader));

        assert_eq!(
            f.router.navigate("/broken", NavigateOptions::default()).await,
            NavigationOutcome::Failed
        );
        let content = f.app.content();
        assert!(!content.contains("<script>"));
        assert!(content.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; more"));
        assert!(content.starts_with("<div class=\"route-error\">"));
    }

    #[tokio::test]
    async fn test_back_and_forward_replay_with_replace() {
        let f = fixture();
        for path in ["/", "/feed", "/races/3"] {
            f.router.navigate(path, NavigateOptions::default()).await;
        }

        assert_eq!(f.router.back().await, Some(NavigationOutcome::Completed));
        assert_eq!(f.router.current_state().path(), Some("/feed"));
        assert_eq!(f.history.len(), 3);

        assert_eq!(f.router.forward().await, Some(NavigationOutcome::Completed));
        assert_eq!(f.router.current_state().path(), Some("/races/3"));
        assert_eq!(f.router.forward().await, None);
        assert_eq!(f.router.go(-2).await, Some(NavigationOutcome::Completed));
        assert!(f.router.is_active("/"));
    }

    #[tokio::test]
    async fn test_replace_does_not_grow_history() {
        let f = fixture();
        f.router.navigate("/", NavigateOptions::default()).await;
        f.router.navigate("/feed", NavigateOptions::replace()).await;
        assert_eq!(f.history.entries(), vec!["/feed"]);
    }

    #[tokio::test]
    async fn test_links_and_named_paths() {
        let f = fixture();
        assert!(f.router.is_internal_link("/feed"));
        assert!(!f.router.is_internal_link("//cdn.example.com/x"));
        assert!(!f.router.is_internal_link("https://example.com"));

        assert_eq!(
            f.router.handle_link("https://example.com").await,
            LinkDisposition::External
        );
        assert_eq!(
            f.router.handle_link("/feed").await,
            LinkDisposition::Intercepted(NavigationOutcome::Completed)
        );

        let params: RouteParams = [("raceId", "12")].into_iter().collect();
        assert_eq!(f.router.path_for("race", &params).unwrap(), "/races/12");
        assert_eq!(
            f.router.path_for("pits", &params),
            Err(RouterError::UnknownRouteName("pits".into()))
        );
    }

    #[tokio::test]
    async fn test_route_table_mutations() {
        let f = fixture();
        assert_eq!(
            f.router.add_route(RouteDefinition::new("/feed/", "other")),
            Err(RouterError::DuplicateRoute("/feed/".into()))
        );
        assert!(f.router.remove_route("/feed"));
        assert!(!f.router.remove_route("/feed"));
        assert_eq!(
            f.router.navigate("/feed", NavigateOptions::default()).await,
            NavigationOutcome::NotFound
        );
        assert_eq!(f.router.routes().len(), 3);
    }

    #[tokio::test]
    async fn test_breadcrumbs_and_completed_event() {
        let f = fixture();
        let waiter = {
            let bus = Arc::clone(&f.bus);
            tokio::spawn(async move {
                bus.wait_for(NAVIGATION_COMPLETED, Duration::from_secs(1))
                    .await
            })
        };
        tokio::task::yield_now().await;
        while f.bus.listener_count(NAVIGATION_COMPLETED) == 0 {
            tokio::task::yield_now().await;
        }

        f.router.navigate("/races/9", NavigateOptions::default()).await;

        let event = waiter.await.unwrap().unwrap();
        assert_eq!(event.data["params"]["raceId"], "9");
        assert_eq!(event.data["name"], "race");
        let labels: Vec<String> = f.router.breadcrumbs().into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Home", "Races", "9"]);
    }

    #[tokio::test]
    async fn test_missing_mount_point_fails_gracefully() {
        let f = fixture();
        f.tree.detach(&f.app);

        assert_eq!(
            f.router.navigate("/feed", NavigateOptions::default()).await,
            NavigationOutcome::Failed
        );
        assert!(!f.router.is_navigating());
    }
}
