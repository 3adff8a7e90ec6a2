//! # homelinkd: homelink daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging from the configured filter
//! - Initialize the `SQLite` connection pool and run migrations
//! - Load the session (agent user id, link token) and resolve the uplink credential
//! - Construct the host, the uplink and the application services
//! - Start the state listener that turns host events into state reports
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT), flushing pending reports
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use homelink_adapter_homegraph_reqwest::HomeGraphUplink;
use homelink_adapter_http_axum::state::AppState;
use homelink_adapter_storage_sqlite_sqlx::{Config as StorageConfig, SqliteKeyValueStore};
use homelink_adapter_virtual::VirtualHost;
use homelink_app::event_bus::InProcessEventBus;
use homelink_app::ports::KeyValueStore;
use homelink_app::services::fulfillment::Fulfillment;
use homelink_app::services::session::Session;
use homelink_app::services::state_reporter::StateReporter;
use homelink_app::services::sync_requester::SyncRequester;
use homelink_domain::capability::CapabilityRegistry;
use homelink_domain::command::CommandTable;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("failed to open database")?;
    let store = SqliteKeyValueStore::new(db.pool().clone());

    // Session
    let session = Arc::new(Session::load(store).await?);
    tracing::info!(agent_user_id = %session.agent_user_id(), "session loaded");

    // Host
    let event_bus = InProcessEventBus::new(256);
    let host = if config.integrations.virtual_enabled {
        Arc::new(VirtualHost::new(event_bus)?)
    } else {
        Arc::new(VirtualHost::with_devices(event_bus, Vec::new()))
    };

    // Uplink
    let credential = resolve_credential(&session, &config).await?;
    let uplink = Arc::new(
        HomeGraphUplink::new(
            &config.homegraph_config(),
            &config.relay_config(),
            credential.as_deref(),
        )
        .context("failed to build uplink")?,
    );

    // Services
    let registry = Arc::new(CapabilityRegistry::builtin());
    let sync_requester = Arc::new(SyncRequester::new(
        Arc::clone(&uplink),
        session.agent_user_id().clone(),
    ));
    let fulfillment = Arc::new(Fulfillment::new(
        Arc::clone(&host),
        Arc::clone(&session),
        Arc::clone(&registry),
        Arc::new(CommandTable::builtin()),
        Arc::clone(&sync_requester),
        config.fulfillment_options(),
    ));
    let reporter = Arc::new(StateReporter::new(
        Arc::clone(&host),
        Arc::clone(&session),
        registry,
        uplink,
        config.report_debounce(),
    ));
    let listener_task = reporter.spawn_listener();

    // HTTP
    let state = AppState::from_arcs(fulfillment, session, sync_requester);
    let app = homelink_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, "homelinkd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    listener_task.abort();
    reporter.flush_now().await;
    tracing::info!("homelinkd stopped");
    Ok(())
}

/// Service-account credential for the direct route: the blob stored under
/// the session's credential key wins over the configured file.
async fn resolve_credential<S>(
    session: &Session<S>,
    config: &Config,
) -> anyhow::Result<Option<String>>
where
    S: KeyValueStore + Send + Sync,
{
    if let Some(blob) = session.credential_blob().await? {
        tracing::debug!("using credential from store");
        return Ok(Some(blob));
    }
    let Some(path) = &config.homegraph.credential_path else {
        return Ok(None);
    };
    match tokio::fs::read_to_string(path).await {
        Ok(blob) => Ok(Some(blob)),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "credential file unreadable");
            Ok(None)
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
