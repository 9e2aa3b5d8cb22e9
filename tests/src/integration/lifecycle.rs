//! # Component Lifecycle Flows
//!
//! Long-running behaviour of the assembled runtime: the scheduled orphan
//! sweep, state fan-out to live components, configuration overrides and
//! shutdown.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use app_runtime::demo::{build_demo_runtime, LIKE_BUTTON, RACE_CARD};
    use app_runtime::{RuntimeConfig, RuntimeContext};
    use pitwall_telemetry::ORPHANS_RECLAIMED;
    use pw_03_router::{NavigateOptions, NavigationOutcome};
    use serde_json::json;
    use shared_bus::{HistoryFilter, COMPONENT_DESTROYED};
    use shared_types::MountSpec;

    async fn go(ctx: &RuntimeContext, path: &str) -> NavigationOutcome {
        ctx.router().navigate(path, NavigateOptions::default()).await
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_scheduled_sweep_follows_navigation() {
        let mut config = RuntimeConfig::default();
        config.components.cleanup_interval_ms = 10;
        let ctx = build_demo_runtime(config).unwrap();
        let reclaimed_before = ORPHANS_RECLAIMED.get();
        assert!(ctx.start_cleanup());

        go(&ctx, "/feed").await;
        assert_eq!(ctx.components().instances_of(LIKE_BUTTON).len(), 3);

        go(&ctx, "/races/spa").await;
        wait_until(|| ctx.components().instances_of(LIKE_BUTTON).is_empty()).await;

        assert_eq!(ctx.components().instances_of(RACE_CARD).len(), 1);
        assert!(ORPHANS_RECLAIMED.get() >= reclaimed_before + 3);

        ctx.shutdown().await;
        assert!(!ctx.is_cleanup_running());
    }

    #[tokio::test]
    async fn test_state_change_reaches_live_components_only() {
        let ctx = build_demo_runtime(RuntimeConfig::default()).unwrap();
        go(&ctx, "/feed").await;

        let buttons = ctx.components().instances_of(LIKE_BUTTON);
        let reached = ctx
            .components()
            .broadcast_state_change(&json!({ "likes": { "2": 4, "3": 9 } }), &json!({}));
        assert_eq!(reached, buttons.len());

        let content = |id: &str| ctx.resolver().resolve(id).unwrap().content();
        assert_eq!(content("#like-1"), "<button>♥ 0</button>");
        assert_eq!(content("#like-2"), "<button>♥ 4</button>");
        assert_eq!(content("#like-3"), "<button>♥ 9</button>");

        let first = &buttons[0].instance_id;
        assert!(ctx.components().destroy(first).await);
        assert!(!ctx
            .components()
            .notify_state_change(first, &json!({}), &json!({})));
    }

    #[tokio::test]
    async fn test_shutdown_destroys_everything_once() {
        let ctx = build_demo_runtime(RuntimeConfig::default()).unwrap();
        go(&ctx, "/feed").await;

        assert_eq!(ctx.shutdown().await, 3);
        assert_eq!(ctx.components().instance_count(), 0);
        assert_eq!(
            ctx.bus()
                .history(&HistoryFilter::event_type(COMPONENT_DESTROYED))
                .len(),
            3
        );
        assert_eq!(ctx.shutdown().await, 0);
    }

    #[tokio::test]
    async fn test_custom_attributes_flow_through_pages_and_factory() {
        let config = RuntimeConfig::from_lookup(|key| match key {
            "PITWALL_COMPONENT_MARKER" => Some("data-widget".to_string()),
            "PITWALL_COMPONENT_OPTIONS_ATTR" => Some("data-widget-props".to_string()),
            _ => None,
        })
        .unwrap();
        let ctx = build_demo_runtime(config).unwrap();

        assert_eq!(go(&ctx, "/races/lemans").await, NavigationOutcome::Completed);
        let card = ctx.resolver().resolve("#race-card-lemans").unwrap();
        assert_eq!(card.attribute("data-widget").as_deref(), Some(RACE_CARD));
        assert_eq!(
            card.attribute("data-component-initialized").as_deref(),
            Some("true")
        );
        assert!(card.content().contains("24 Hours of Le Mans"));
    }

    #[tokio::test]
    async fn test_auto_create_skips_malformed_and_initialized_elements() {
        let ctx = build_demo_runtime(RuntimeConfig::default()).unwrap();
        let tree = ctx.mount_tree().unwrap();
        let sidebar = tree.root().append(
            &MountSpec::new("sidebar")
                .child(
                    MountSpec::component("broken", LIKE_BUTTON)
                        .attr("data-component-options", "{not json"),
                )
                .child(
                    MountSpec::component("done", LIKE_BUTTON)
                        .attr("data-component-options", r#"{"postId": 1}"#)
                        .attr("data-component-initialized", "true"),
                )
                .child(
                    MountSpec::component("fresh", LIKE_BUTTON)
                        .attr("data-component-options", r#"{"postId": 2}"#),
                ),
        );
        let sidebar: shared_types::Target = sidebar;

        let created = ctx.components().auto_create(&sidebar).await;
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].target.label(), "#fresh");

        let broken = ctx.resolver().resolve("#broken").unwrap();
        assert_eq!(broken.attribute("data-component-initialized"), None);
        assert!(ctx.components().auto_create(&sidebar).await.is_empty());
    }
}
