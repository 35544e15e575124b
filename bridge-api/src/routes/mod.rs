//! API route definitions

mod health;
mod ingest;
mod orders;
mod signals;
pub mod ws;

use axum::Router;

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(signals::routes())
        .merge(ingest::routes())
        .merge(orders::routes())
}

/// Create WebSocket routes (separate from API)
pub fn ws_routes() -> Router<AppState> {
    ws::routes()
}
