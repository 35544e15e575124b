//! QuantumTrader Bridge API Server
//!
//! Relays data between the trading execution client and the
//! prediction process: HTTP endpoints for polling clients plus a
//! WebSocket for real-time signal pushes.

mod config;
mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bridge_services::{
    BroadcasterConfig, ConnectionRegistry, IngestService, QueryService, SignalBroadcaster,
    SignalFeed, SnapshotStore, StateStore,
};

use config::BridgeConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ingest: Arc<IngestService>,
    pub query: Arc<QueryService>,
    pub registry: Arc<ConnectionRegistry>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bridge_api=debug")),
        )
        .init();

    let cfg = BridgeConfig::from_env();
    info!("Starting QuantumTrader Bridge API");

    let store = Arc::new(StateStore::new());
    let snapshots = Arc::new(SnapshotStore::new(
        cfg.data_dir.clone(),
        cfg.predictions_dir.clone(),
    ));
    let feed = SignalFeed::new(&cfg.predictions_dir);
    let registry = Arc::new(ConnectionRegistry::new());

    seed_from_disk(&store, &snapshots, &feed);

    let ingest = Arc::new(IngestService::new(
        Arc::clone(&store),
        Arc::clone(&snapshots),
    ));
    let query = Arc::new(QueryService::new(
        Arc::clone(&store),
        Arc::clone(&snapshots),
        feed.clone(),
        Arc::clone(&registry),
    ));

    // Start the background signal broadcaster; it is stopped through
    // the watch channel once the server has drained.
    let broadcaster = Arc::new(SignalBroadcaster::new(
        feed,
        Arc::clone(&store),
        Arc::clone(&registry),
        BroadcasterConfig {
            poll_interval: cfg.poll_interval,
            error_backoff: cfg.error_backoff,
        },
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(Arc::clone(&broadcaster).run(shutdown_rx));

    let state = AppState {
        ingest,
        query,
        registry,
    };

    // Build router
    let app = Router::new()
        .nest("/api", routes::api_routes())
        .merge(routes::ws_routes())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", cfg.bind, cfg.port).parse()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the broadcaster; pending pushes may be lost, the feed file
    // is the durable source of truth.
    drop(shutdown_tx);

    Ok(())
}

/// Seed the state store from files flushed by a prior run. Absent or
/// malformed files leave that kind empty; startup never fails here.
fn seed_from_disk(store: &StateStore, snapshots: &SnapshotStore, feed: &SignalFeed) {
    for (symbol, history) in snapshots.load_markets() {
        info!("Loaded {} datapoints for {}", history.len(), symbol);
        store.set_market_history(symbol, history);
    }

    if let Some(account) = snapshots.load_account() {
        info!("Loaded prior account snapshot");
        store.set_account(account);
    }

    if let Some(positions) = snapshots.load_positions() {
        info!("Loaded {} active trades", positions.len());
        store.set_positions(positions);
    }

    match feed.load_json_signals() {
        Ok(Some((signals, bundle))) => {
            info!("Loaded {} signals from JSON feed", signals.len());
            store.set_signals(signals);
            store.set_bundle(bundle);
        }
        Ok(None) => match feed.load_csv_signals() {
            Ok(Some(signals)) => {
                info!("Loaded {} signals from CSV feed", signals.len());
                store.set_signals(signals);
            }
            Ok(None) => info!("No prediction files found"),
            Err(e) => tracing::warn!("Failed to load CSV feed: {}", e),
        },
        Err(e) => tracing::warn!("Failed to load JSON feed: {}", e),
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    info!("Shutdown signal received, stopping");
}
