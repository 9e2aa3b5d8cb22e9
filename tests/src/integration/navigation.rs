//! # Navigation Flows
//!
//! Router, component factory and event bus working together through the
//! assembled runtime:
//!
//! 1. **Route change → auto-create**: rendering a page instantiates the
//!    components it declares and announces them on the bus
//! 2. **Route change → orphan sweep**: leaving a page detaches its
//!    components; the next cleanup reclaims exactly those
//! 3. **History**: back/forward replay navigation without new entries
//! 4. **Guards and failures**: vetoes, unmatched paths, failing pages

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use app_runtime::demo::{build_demo_runtime, LIKE_BUTTON, RACE_CARD};
    use app_runtime::{RuntimeConfig, RuntimeContext};
    use pw_03_router::{
        before_hook_fn, route_middleware_fn, LinkDisposition, NavigateOptions, NavigationOutcome,
        NAVIGATION_COMPLETED, NAVIGATION_FAILED,
    };
    use serde_json::json;
    use shared_bus::{HistoryFilter, COMPONENT_CREATED, COMPONENT_DESTROYED};

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn runtime() -> RuntimeContext {
        build_demo_runtime(RuntimeConfig::default()).unwrap()
    }

    async fn go(ctx: &RuntimeContext, path: &str) -> NavigationOutcome {
        ctx.router().navigate(path, NavigateOptions::default()).await
    }

    fn mount_content(ctx: &RuntimeContext) -> String {
        ctx.resolver().resolve("#app").unwrap().content()
    }

    fn event_count(ctx: &RuntimeContext, event_type: &str) -> usize {
        ctx.bus().history(&HistoryFilter::event_type(event_type)).len()
    }

    // =========================================================================
    // ROUTE CHANGE → COMPONENT LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_page_change_detaches_and_cleanup_reclaims() {
        let ctx = runtime();

        assert_eq!(go(&ctx, "/").await, NavigationOutcome::Completed);
        assert_eq!(ctx.components().instance_count(), 0);

        assert_eq!(go(&ctx, "/races/spa").await, NavigationOutcome::Completed);
        assert_eq!(ctx.components().instances_of(RACE_CARD).len(), 1);
        assert_eq!(event_count(&ctx, COMPONENT_CREATED), 1);

        assert_eq!(go(&ctx, "/feed").await, NavigationOutcome::Completed);
        assert_eq!(ctx.components().instance_count(), 4);

        // Only the race card lost its place in the tree.
        assert_eq!(ctx.components().cleanup().await, 1);
        assert!(ctx.components().instances_of(RACE_CARD).is_empty());
        assert_eq!(ctx.components().instances_of(LIKE_BUTTON).len(), 3);

        let destroyed = ctx
            .bus()
            .history(&HistoryFilter::event_type(COMPONENT_DESTROYED));
        assert_eq!(destroyed.len(), 1);
        assert_eq!(destroyed[0].data["kind"], RACE_CARD);
        assert_eq!(ctx.components().cleanup().await, 0);
    }

    #[tokio::test]
    async fn test_renavigating_same_page_recreates_components() {
        let ctx = runtime();
        go(&ctx, "/races/monaco").await;
        let first = ctx.components().instances_of(RACE_CARD)[0].instance_id.clone();

        go(&ctx, "/races/monaco").await;
        ctx.components().cleanup().await;

        let cards = ctx.components().instances_of(RACE_CARD);
        assert_eq!(cards.len(), 1);
        assert_ne!(cards[0].instance_id, first);
    }

    // =========================================================================
    // NAVIGATION EVENTS
    // =========================================================================

    #[tokio::test]
    async fn test_completed_event_carries_route_details() {
        let ctx = runtime();
        go(&ctx, "/").await;

        let (event, outcome) = tokio::join!(
            ctx.bus()
                .wait_for(NAVIGATION_COMPLETED, Duration::from_secs(1)),
            go(&ctx, "/races/monaco?tab=results"),
        );
        assert_eq!(outcome, NavigationOutcome::Completed);

        let event = event.unwrap();
        assert_eq!(event.data["path"], "/races/monaco");
        assert_eq!(event.data["fullPath"], "/races/monaco?tab=results");
        assert_eq!(event.data["name"], "race");
        assert_eq!(event.data["params"], json!({ "raceId": "monaco" }));
        assert_eq!(event.data["query"], json!({ "tab": "results" }));
        assert_eq!(event.data["from"], "/");
        assert_eq!(event.metadata.source.as_deref(), Some("router"));
    }

    #[tokio::test]
    async fn test_unmatched_and_failing_paths() {
        let ctx = runtime();
        go(&ctx, "/races/spa").await;

        assert_eq!(go(&ctx, "/pit-lane").await, NavigationOutcome::NotFound);
        // Nothing was rendered or recorded for the unmatched path.
        assert!(ctx.router().is_active("/races/spa"));
        assert!(mount_content(&ctx).starts_with("<h1>Race: spa</h1>"));

        assert_eq!(go(&ctx, "/races/nowhere").await, NavigationOutcome::Failed);
        assert!(mount_content(&ctx).contains("unknown race `nowhere`"));

        let failed = ctx.bus().history(&HistoryFilter::event_type(NAVIGATION_FAILED));
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0].data["reason"], "not_found");
        assert_eq!(failed[1].data["name"], "race");
    }

    // =========================================================================
    // HISTORY
    // =========================================================================

    #[tokio::test]
    async fn test_back_and_forward_replay() {
        let ctx = runtime();
        go(&ctx, "/").await;
        go(&ctx, "/feed").await;
        go(&ctx, "/races/lemans").await;

        assert_eq!(ctx.router().back().await, Some(NavigationOutcome::Completed));
        assert!(ctx.router().is_active("/feed"));
        assert_eq!(ctx.router().back().await, Some(NavigationOutcome::Completed));
        assert!(ctx.router().is_active("/"));
        assert_eq!(ctx.router().back().await, None);

        assert_eq!(ctx.router().forward().await, Some(NavigationOutcome::Completed));
        assert!(ctx.router().is_active("/feed"));

        // A fresh navigation drops the forward entries.
        go(&ctx, "/races/spa").await;
        assert_eq!(ctx.router().forward().await, None);
    }

    #[tokio::test]
    async fn test_breadcrumbs_and_links() {
        let ctx = runtime();
        assert_eq!(
            ctx.router().handle_link("/races/spa").await,
            LinkDisposition::Intercepted(NavigationOutcome::Completed)
        );
        let labels: Vec<String> = ctx
            .router()
            .breadcrumbs()
            .into_iter()
            .map(|crumb| crumb.label)
            .collect();
        assert_eq!(labels, vec!["Home", "Races", "Spa"]);

        assert_eq!(
            ctx.router().handle_link("https://example.com/races").await,
            LinkDisposition::External
        );
        assert_eq!(
            ctx.router().handle_link("//cdn.example.com/x.js").await,
            LinkDisposition::External
        );
        assert!(ctx.router().is_active("/races/spa"));
    }

    // =========================================================================
    // GUARDS
    // =========================================================================

    #[tokio::test]
    async fn test_guard_keeps_feed_closed_until_signed_in() {
        let ctx = runtime();
        let signed_in = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&signed_in);
        ctx.router().before_each(before_hook_fn(move |to, _from| {
            let allowed = !to.starts_with("/feed") || flag.load(Ordering::SeqCst);
            async move { allowed }
        }));

        go(&ctx, "/").await;
        assert_eq!(go(&ctx, "/feed").await, NavigationOutcome::Aborted);
        assert!(ctx.router().is_active("/"));
        assert_eq!(ctx.components().instance_count(), 0);

        signed_in.store(true, Ordering::SeqCst);
        assert_eq!(go(&ctx, "/feed").await, NavigationOutcome::Completed);
        assert_eq!(ctx.components().instances_of(LIKE_BUTTON).len(), 3);
    }

    #[tokio::test]
    async fn test_middleware_sees_params() {
        let ctx = runtime();
        ctx.router()
            .use_middleware(route_middleware_fn(|route| async move {
                route.params.get("raceId") != Some("monaco")
            }));

        assert_eq!(go(&ctx, "/races/spa").await, NavigationOutcome::Completed);
        assert_eq!(go(&ctx, "/races/monaco").await, NavigationOutcome::Aborted);
        assert!(ctx.router().is_active("/races/spa"));
    }
}
