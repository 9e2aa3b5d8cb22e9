//! # Service Wiring Flows
//!
//! The service locator as the application sees it once the runtime is
//! built: runtime services are resolvable by name, application services
//! declare them as dependencies, and events flow between them over the bus.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use app_runtime::demo::{build_demo_runtime, FeedService, FEED_SERVICE, POST_LIKED};
    use app_runtime::{
        RuntimeBuilder, RuntimeConfig, COMPONENT_FACTORY_SERVICE, EVENT_BUS_SERVICE,
        ROUTER_SERVICE,
    };
    use parking_lot::Mutex;
    use pitwall_telemetry::EVENTS_EMITTED;
    use pw_01_service_locator::{BoxError, Resolved, ServiceError, ServiceKind, ServiceLocator};
    use pw_02_component_factory::ComponentFactory;
    use pw_03_router::{RouteDefinition, RouteParams, Router};
    use serde_json::json;
    use shared_bus::{
        listener_fn, middleware_fn, EmitOutcome, EventBus, EventMetadata, EventPublisher,
        ListenerOptions,
    };

    // =========================================================================
    // FIXTURES
    // =========================================================================

    /// Collects `post.liked` notifications for the signed-in user.
    struct Notifications {
        received: Arc<Mutex<Vec<u64>>>,
    }

    impl Notifications {
        fn attach(bus: &EventBus) -> Self {
            let received = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&received);
            bus.on(
                POST_LIKED,
                listener_fn(move |event| {
                    if let Some(post_id) = event.data["postId"].as_u64() {
                        sink.lock().push(post_id);
                    }
                    async { Ok(()) }
                }),
                ListenerOptions::default().with_context("notifications"),
            );
            Self { received }
        }
    }

    /// Builds links to named routes.
    struct LinkBuilder {
        router: Arc<Router>,
    }

    impl LinkBuilder {
        fn race(&self, race_id: &str) -> String {
            let params: RouteParams = [("raceId".to_string(), race_id.to_string())]
                .into_iter()
                .collect();
            self.router.path_for("race", &params).unwrap_or_default()
        }
    }

    // =========================================================================
    // RUNTIME SERVICES IN THE LOCATOR
    // =========================================================================

    #[tokio::test]
    async fn test_runtime_services_resolve_by_name() {
        let ctx = build_demo_runtime(RuntimeConfig::default()).unwrap();
        let services = ctx.services();

        assert_eq!(services.kind_of(EVENT_BUS_SERVICE), Some(ServiceKind::Instance));
        assert_eq!(services.kind_of(FEED_SERVICE), Some(ServiceKind::Singleton));

        let factory: Arc<ComponentFactory> = services.get(COMPONENT_FACTORY_SERVICE).unwrap();
        assert!(Arc::ptr_eq(&factory, ctx.components()));

        let err = services.get::<Router>(EVENT_BUS_SERVICE).err().expect("expected a type mismatch error");
        assert!(matches!(err, ServiceError::TypeMismatch { .. }));
    }

    #[tokio::test]
    async fn test_app_service_listens_through_injected_bus() {
        let services = Arc::new(ServiceLocator::new());
        services
            .register_singleton(
                "notifications",
                &[EVENT_BUS_SERVICE],
                |resolved: &Resolved| {
                    let bus = resolved.get::<EventBus>(EVENT_BUS_SERVICE)?;
                    Ok::<_, BoxError>(Notifications::attach(&bus))
                },
            )
            .unwrap();
        app_runtime::demo::register_demo_services(&services).unwrap();

        let ctx = RuntimeBuilder::new()
            .with_services(Arc::clone(&services))
            .build()
            .unwrap();

        let notifications: Arc<Notifications> = services.get("notifications").unwrap();
        let feed: Arc<FeedService> = services.get(FEED_SERVICE).unwrap();
        feed.like(1).await;
        feed.like(3).await;

        assert_eq!(*notifications.received.lock(), vec![1, 3]);
        assert_eq!(ctx.bus().listener_count(POST_LIKED), 1);
    }

    #[tokio::test]
    async fn test_factory_registration_reads_other_services() {
        let services = Arc::new(ServiceLocator::new());
        services
            .register_factory("links", |locator: &ServiceLocator| {
                let router = locator.get::<Router>(ROUTER_SERVICE)?;
                Ok::<_, BoxError>(LinkBuilder { router })
            })
            .unwrap();
        let _ctx = RuntimeBuilder::new()
            .with_services(Arc::clone(&services))
            .with_routes([RouteDefinition::new("/races/:raceId", "race").named("race")])
            .build()
            .unwrap();

        let links: Arc<LinkBuilder> = services.get("links").unwrap();
        assert_eq!(links.race("spa"), "/races/spa");

        // Factories build a fresh value every time.
        let again: Arc<LinkBuilder> = services.get("links").unwrap();
        assert!(!Arc::ptr_eq(&links, &again));
    }

    #[tokio::test]
    async fn test_cycle_through_app_services_fails_fast() {
        let ctx = build_demo_runtime(RuntimeConfig::default()).unwrap();
        let services = ctx.services();
        services
            .register_singleton("standings", &[EVENT_BUS_SERVICE, "calendar"], |_: &Resolved| {
                Ok::<_, BoxError>(())
            })
            .unwrap();
        services
            .register_singleton("calendar", &["standings"], |_: &Resolved| {
                Ok::<_, BoxError>(())
            })
            .unwrap();

        match services.get_any("standings") {
            Err(ServiceError::CircularDependency { chain }) => {
                assert_eq!(chain, vec!["standings", "calendar", "standings"]);
            }
            other => panic!("expected a cycle, got {:?}", other.map(|_| ())),
        }
        // Runtime services are unaffected.
        assert!(services.get::<EventBus>(EVENT_BUS_SERVICE).is_ok());
    }

    // =========================================================================
    // LOOKUP PRECEDENCE
    // =========================================================================

    #[tokio::test]
    async fn test_runtime_instance_wins_over_app_registrations() {
        let ctx = build_demo_runtime(RuntimeConfig::default()).unwrap();
        let services = ctx.services();
        services
            .register_factory(EVENT_BUS_SERVICE, |_: &ServiceLocator| {
                Ok::<_, BoxError>(EventBus::new())
            })
            .unwrap();
        services
            .register_singleton(EVENT_BUS_SERVICE, &[], |_: &Resolved| {
                Ok::<_, BoxError>(EventBus::new())
            })
            .unwrap();

        let bus: Arc<EventBus> = services.get(EVENT_BUS_SERVICE).unwrap();
        assert!(Arc::ptr_eq(&bus, ctx.bus()));
        assert_eq!(services.kind_of(EVENT_BUS_SERVICE), Some(ServiceKind::Instance));
    }

    #[tokio::test]
    async fn test_factory_wins_over_registered_service() {
        let services = ServiceLocator::new();
        services
            .register_transient("season", &[], |_: &Resolved| Ok::<_, BoxError>(2025_u16))
            .unwrap();
        services
            .register_factory("season", |_: &ServiceLocator| Ok::<_, BoxError>(2026_u16))
            .unwrap();

        assert_eq!(*services.get::<u16>("season").unwrap(), 2026);
        assert_eq!(services.kind_of("season"), Some(ServiceKind::Factory));

        // Removing the name clears the shadowed registration too.
        assert!(services.remove("season"));
        assert!(matches!(
            services.get::<u16>("season"),
            Err(ServiceError::NotRegistered(_))
        ));
    }

    // =========================================================================
    // BUS MIDDLEWARE WITH METRICS
    // =========================================================================

    #[tokio::test]
    async fn test_cancelled_events_still_counted_by_metrics_stage() {
        let ctx = build_demo_runtime(RuntimeConfig::default()).unwrap();
        ctx.bus().use_middleware(middleware_fn(|event| async move {
            if event.event_type.starts_with("debug.") {
                Ok(None)
            } else {
                Ok(Some(event))
            }
        }));
        let heard = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&heard);
        ctx.bus().on(
            "debug.trace-probe",
            listener_fn(move |_| {
                *counter.lock() += 1;
                async { Ok(()) }
            }),
            ListenerOptions::default(),
        );

        let before = EVENTS_EMITTED
            .with_label_values(&["debug.trace-probe"])
            .get();
        let outcome = ctx
            .bus()
            .emit("debug.trace-probe", json!({}), EventMetadata::new())
            .await;

        assert_eq!(outcome, EmitOutcome::Cancelled);
        assert_eq!(*heard.lock(), 0);
        assert_eq!(ctx.bus().events_cancelled(), 1);
        assert_eq!(
            EVENTS_EMITTED
                .with_label_values(&["debug.trace-probe"])
                .get(),
            before + 1
        );
    }
}
