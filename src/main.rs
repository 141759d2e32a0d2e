//! purchase-hub server entry point.
//!
//! Connects the persistence and event log sinks, starts the hub and the
//! heartbeat, and serves the WebSocket and REST endpoints until Ctrl-C or
//! SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use purchase_hub::app_state::AppState;
use purchase_hub::broker::{EventPublisher, KafkaPublisher};
use purchase_hub::config::{LogFormat, RelayConfig};
use purchase_hub::hub::Hub;
use purchase_hub::persistence::{PostgresPurchaseStore, PurchaseStore};
use purchase_hub::router::{self, WS_PATH};
use purchase_hub::service::{EventSink, spawn_heartbeat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RelayConfig::from_env().context("failed to load configuration")?;

    // Initialize tracing
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting purchase-hub");

    // Connect sinks
    let store = if config.persistence_enabled {
        let store = PostgresPurchaseStore::connect(&config)
            .await
            .context("failed to connect to PostgreSQL")?;
        store
            .ensure_schema()
            .await
            .context("failed to ensure purchases table")?;
        tracing::info!("connected to PostgreSQL");
        Some(store)
    } else {
        tracing::warn!("persistence disabled");
        None
    };

    let publisher: Option<Arc<dyn EventPublisher>> = if config.kafka_enabled {
        let publisher = KafkaPublisher::connect(
            config.kafka_brokers.clone(),
            config.kafka_topic.clone(),
            Duration::from_secs(config.kafka_connect_timeout_secs),
        )
        .await
        .context("failed to connect to Kafka")?;
        Some(Arc::new(publisher))
    } else {
        tracing::warn!("kafka publishing disabled");
        None
    };

    let sink = EventSink::new(
        store
            .clone()
            .map(|s| Arc::new(s) as Arc<dyn PurchaseStore>),
        publisher,
        config.kafka_topic.clone(),
    );

    // Start hub and heartbeat
    let (hub, hub_task) = Hub::spawn(config.hub_command_capacity);
    let heartbeat = (config.heartbeat_interval_secs > 0).then(|| {
        spawn_heartbeat(
            hub.clone(),
            Duration::from_secs(config.heartbeat_interval_secs),
        )
    });

    let app_state = AppState {
        hub: hub.clone(),
        sink,
        outbound_capacity: config.outbound_queue_capacity,
    };

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, path = WS_PATH, "server listening");

    let shutdown_hub = hub.clone();
    router::serve(listener, app_state, async move {
        shutdown_signal().await;
        match shutdown_hub.shutdown().await {
            Ok(closed) => tracing::info!(closed, "closed client connections"),
            Err(e) => tracing::warn!(error = %e, "hub already stopped"),
        }
    })
    .await
    .context("server error")?;

    if let Some(heartbeat) = heartbeat {
        heartbeat.abort();
    }
    drop(hub);
    let _ = hub_task.await;
    if let Some(store) = store {
        store.close().await;
    }

    tracing::info!("purchase-hub stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::warn!("received ctrl-c"),
        () = terminate => tracing::warn!("received SIGTERM"),
    }
    tracing::info!("shutting down server");
}
