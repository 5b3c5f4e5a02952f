//! # homeautod — home automation daemon
//!
//! Composition root that wires all adapters together and starts the daemon.
//!
//! ## Responsibilities
//! - Parse configuration (CLI argument, env vars, config file)
//! - Install the `tracing` subscriber
//! - Build the device registry and load the persisted schedule
//! - Start the MQTT connection loop that drives the scheduler
//! - Build the axum router and serve it on a fixed-size worker pool
//! - Handle graceful shutdown (SIGTERM/SIGINT): stop the loop, stop the HTTP
//!   server, save the schedule
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use anyhow::Context;
use homeauto_adapter_http_axum::router;
use homeauto_adapter_http_axum::state::AppState;
use homeauto_adapter_mqtt::ConnectionLoop;
use homeauto_adapter_storage_file::FileScheduleStorage;
use homeauto_app::hub::Hub;
use homeauto_app::ports::ScheduleStorage;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref()).context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.http.threads)
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: Config) -> anyhow::Result<()> {
    // Devices & schedule
    let devices = config.registry()?;
    let storage = FileScheduleStorage::new(&config.schedule.path);
    let schedule = storage
        .load()
        .await
        .with_context(|| format!("failed to load schedule {}", storage.path().display()))?;
    let hub = Hub::new(devices, schedule, config.default_state()?);

    // HTTP
    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "homeautod listening");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Broker link
    let connection = tokio::spawn(
        ConnectionLoop::new(hub.clone(), config.mqtt.clone()).run(shutdown_rx.clone()),
    );

    let app = router::build(AppState::new(hub.clone()), config.http.connection_limit);
    let mut http_shutdown = shutdown_rx;
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = http_shutdown.wait_for(|stop| *stop).await;
            })
            .await
    });

    let server_exited = tokio::select! {
        () = shutdown_signal() => false,
        result = &mut server => {
            tracing::error!(?result, "HTTP server exited unexpectedly");
            true
        }
    };

    tracing::info!("shutting down");
    shutdown_tx.send_replace(true);

    if let Err(err) = connection.await {
        tracing::warn!(%err, "connection loop task failed");
    }
    if !server_exited {
        match server.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(%err, "HTTP server error"),
            Err(err) => tracing::warn!(%err, "HTTP server task failed"),
        }
    }

    hub.save_schedule(&storage)
        .await
        .with_context(|| format!("failed to save schedule {}", storage.path().display()))?;

    tracing::info!("homeautod stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM (Ctrl+C elsewhere).
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => tracing::info!("SIGINT received"),
                    _ = sigterm.recv() => tracing::info!("SIGTERM received"),
                }
            }
            _ => {
                tracing::warn!("cannot install unix signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
