//! # Pitwall Runtime Benchmarks
//!
//! | Area | Operation | Target |
//! |------|-----------|--------|
//! | Router | resolve against 50 routes | < 10µs |
//! | Event bus | emit to 10 listeners | < 50µs |
//! | Component factory | template interpolation | < 5µs |
//! | Full stack | navigate + auto-create + cleanup | < 1ms |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pw_02_component_factory::interpolate;
use pw_03_router::{NavigateOptions, RouteDefinition};
use serde_json::json;
use shared_bus::{listener_fn, EventBus, EventMetadata, EventPublisher, ListenerOptions};

use app_runtime::demo::build_demo_runtime;
use app_runtime::{RuntimeBuilder, RuntimeConfig};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime")
}

// ============================================================================
// ROUTER
// ============================================================================

fn bench_route_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("router");

    for count in [5usize, 50] {
        let routes: Vec<RouteDefinition> = (0..count)
            .map(|i| RouteDefinition::new(format!("/section-{i}/:id/details"), "page"))
            .chain([RouteDefinition::new("/", "home")])
            .collect();
        let ctx = RuntimeBuilder::new()
            .with_routes(routes)
            .with_metrics(false)
            .build()
            .expect("runtime");
        let last = format!("/section-{}/42/details?tab=laps", count - 1);

        group.bench_with_input(BenchmarkId::new("resolve_last_dynamic", count), &last, |b, path| {
            b.iter(|| black_box(ctx.router().resolve(path)))
        });
        group.bench_function(BenchmarkId::new("resolve_static", count), |b| {
            b.iter(|| black_box(ctx.router().resolve("/")))
        });
    }
    group.finish();
}

// ============================================================================
// EVENT BUS
// ============================================================================

fn bench_emit(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("event-bus");
    group.measurement_time(Duration::from_secs(5));

    for listeners in [1usize, 10] {
        let bus = Arc::new(EventBus::new());
        for priority in 0..listeners {
            bus.on(
                "race.updated",
                listener_fn(|event| async move {
                    black_box(event);
                    Ok(())
                }),
                ListenerOptions::default().with_priority(priority as i32),
            );
        }

        group.throughput(Throughput::Elements(listeners as u64));
        group.bench_with_input(BenchmarkId::new("emit", listeners), &bus, |b, bus| {
            b.iter(|| {
                rt.block_on(bus.emit(
                    "race.updated",
                    json!({ "raceId": "spa", "lap": 12 }),
                    EventMetadata::new(),
                ))
            })
        });
    }
    group.finish();
}

// ============================================================================
// TEMPLATES
// ============================================================================

fn bench_interpolate(c: &mut Criterion) {
    let data = json!({
        "race": { "name": "Belgian Grand Prix", "circuit": "Spa-Francorchamps" },
        "drivers": [{ "name": "Lena" }, { "name": "Marco" }],
    });
    c.bench_function("interpolate_nested", |b| {
        b.iter(|| {
            black_box(interpolate(
                "{{race.name}} @ {{race.circuit}}: {{drivers.0.name}} vs {{drivers.1.name}}",
                &data,
            ))
        })
    });
}

// ============================================================================
// FULL STACK
// ============================================================================

fn bench_navigation(c: &mut Criterion) {
    let rt = runtime();
    let ctx = build_demo_runtime(RuntimeConfig::default()).expect("demo runtime");
    let mut group = c.benchmark_group("navigation");

    group.bench_function("feed_then_race_with_cleanup", |b| {
        b.iter(|| {
            rt.block_on(async {
                ctx.router().navigate("/feed", NavigateOptions::default()).await;
                ctx.router()
                    .navigate("/races/spa", NavigateOptions::default())
                    .await;
                black_box(ctx.components().cleanup().await)
            })
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_route_resolution,
    bench_emit,
    bench_interpolate,
    bench_navigation
);
criterion_main!(benches);
