//! # Pitwall
//!
//! Headless demo of the runtime: builds the sample app, navigates every
//! path given on the command line (default `/`) and prints what ended up in
//! the mount point.
//!
//! ```text
//! pitwall / /feed?tag=f1 /races/spa /races/nowhere
//! ```

use anyhow::{Context, Result};
use pitwall_telemetry::{init_telemetry, TelemetryConfig};
use pw_03_router::NavigateOptions;
use tracing::info;

use app_runtime::demo::build_demo_runtime;
use app_runtime::RuntimeConfig;

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env().context("Invalid runtime configuration")?;
    let ctx = build_demo_runtime(config).context("Failed to build runtime")?;
    ctx.start_cleanup();

    let mut paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        paths.push("/".to_string());
    }

    let mount = ctx
        .resolver()
        .resolve(&ctx.config().router.mount_selector)
        .context("Mount point not found")?;

    for path in &paths {
        let outcome = ctx.router().navigate(path, NavigateOptions::default()).await;
        // Components of the previous page are detached now.
        ctx.components().cleanup().await;

        println!("== {path} ({outcome:?})");
        println!("{}", mount.content());
        for kind in ctx.components().registered_kinds() {
            for record in ctx.components().instances_of(&kind) {
                println!("   [{kind}] {}", record.target.content());
            }
        }
    }

    info!(stats = ?ctx.components().get_stats(), "Navigation finished");
    let destroyed = ctx.shutdown().await;
    info!(destroyed, "Bye");

    if std::env::var("PITWALL_PRINT_METRICS").is_ok() {
        println!("{}", ctx.gather_metrics()?);
    }
    Ok(())
}
