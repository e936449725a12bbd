//! Transit simulation entry point.
//!
//! Publishes simulated station, arrival, turnstile and weather events and
//! runs the consumers that summarize them, until Ctrl-C.

use std::env;

use anyhow::Context;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use transit_simulation::Dependencies;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("transit_simulation=info,transit_stream=info"));

    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();
    }

    info!(
        service_name = "transit-simulation",
        service_version = env!("CARGO_PKG_VERSION"),
        json = json,
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let deps = Dependencies::new()
        .await
        .context("Failed to initialize dependencies")?;

    let summary = deps
        .orchestrator
        .run()
        .await
        .context("Transit simulation failed")?;

    info!(
        ticks = summary.ticks,
        failed_ticks = summary.failed_ticks,
        consumers = summary.consumers,
        "Transit simulation completed"
    );
    Ok(())
}
