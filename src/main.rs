//! Opportunities bot: binary entrypoint.
//! Loads config, wires the pipeline, chat poller, scheduler and the status server.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use opportunities_bot::api::{self, AppState};
use opportunities_bot::config::{load_sources_default, Settings};
use opportunities_bot::control::{spawn_update_poller, Controller, ControllerInfo};
use opportunities_bot::ingest::rss::RssHttpSource;
use opportunities_bot::notify::TelegramClient;
use opportunities_bot::telemetry::Metrics;
use opportunities_bot::{initial_destinations, scheduler, BotState, Pipeline};

/// Compact logs by default; `LOG_FORMAT=json` for hosted log collectors.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("opportunities_bot=info,warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler failed");
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Settings::from_env().context("invalid configuration, refusing to start")?;
    let registry = Arc::new(load_sources_default().context("loading source registry")?);

    info!(
        mode = %settings.mode,
        auto_scan = settings.auto_scan_enabled(),
        self_ping = settings.self_ping_enabled(),
        feeds = registry.feed_count(),
        "starting Opportunities4Africa bot"
    );

    let metrics = Metrics::init(settings.scan_interval, registry.feed_count())?;

    let http = reqwest::Client::builder()
        .build()
        .context("building http client")?;
    let telegram = TelegramClient::new(http.clone(), &settings.bot_token);
    let feeds = RssHttpSource::new(settings.fetch.timeout)?;

    let state = Arc::new(BotState::new(initial_destinations(&settings)));
    let pipeline = Pipeline::new(
        Arc::new(feeds),
        Arc::new(telegram.clone()),
        registry,
        state.clone(),
    )
    .with_limits(settings.fetch)
    .with_pacing(settings.pacing);

    let controller = Controller::new(
        pipeline.clone(),
        Arc::new(telegram.clone()),
        settings.admin,
        ControllerInfo {
            mode: settings.mode,
            primary_channel: settings.primary_channel.clone(),
            auto_scan: settings.auto_scan_enabled(),
            scan_interval: settings.scan_interval,
        },
    );
    spawn_update_poller(telegram, controller);

    if settings.auto_scan_enabled() {
        scheduler::spawn_scan_scheduler(pipeline.clone(), settings.scan_interval);
    }
    if settings.self_ping_enabled() {
        if let Some(url) = settings.public_url.clone() {
            scheduler::spawn_self_ping(http, url, settings.self_ping_interval);
        }
    }

    let app = api::router(AppState { bot: state }).merge(metrics.router());
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "status server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;
    Ok(())
}
