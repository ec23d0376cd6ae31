mod api;
mod bootstrap;
mod error;
mod health;
mod payload;
mod shutdown;
mod state;

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use coffre_core::config::{AppConfig, LoadOptions};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::shutdown::ShutdownSignal;

fn init_logging(config: &AppConfig) {
    use coffre_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let state = app.state.clone();

    let snapshot_task = state
        .spawn_snapshot_task(Duration::from_secs(app.config.storage.snapshot_interval_secs));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        "coffre-server listening"
    );

    let mut stop = ShutdownSignal::install()?;
    let shutdown = Arc::new(Notify::new());
    let server = {
        let shutdown = shutdown.clone();
        axum::serve(listener, api::router(state.clone()))
            .with_graceful_shutdown(async move { shutdown.notified().await })
            .into_future()
    };
    let mut server = tokio::spawn(server);

    let served: Result<()> = tokio::select! {
        result = &mut server => match result {
            Ok(served) => served.map_err(anyhow::Error::from),
            Err(join_error) => Err(join_error.into()),
        },
        signal = stop.wait() => match signal {
            Ok(signal) => {
                tracing::info!(
                    event_name = "system.server.stopping",
                    signal,
                    "coffre-server stopping"
                );
                shutdown.notify_one();
                drain(&mut server, Duration::from_secs(app.config.server.graceful_shutdown_secs))
                    .await
            }
            Err(error) => Err(error),
        },
    };

    if let Some(task) = snapshot_task {
        task.abort();
    }
    shutdown::flush_then(&state, served).await
}

async fn drain(server: &mut JoinHandle<std::io::Result<()>>, grace: Duration) -> Result<()> {
    match tokio::time::timeout(grace, &mut *server).await {
        Ok(result) => Ok(result??),
        Err(_) => {
            tracing::warn!(
                event_name = "system.server.drain_timeout",
                grace_secs = grace.as_secs(),
                "in-flight requests did not finish in time"
            );
            server.abort();
            Ok(())
        }
    }
}
