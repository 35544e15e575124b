//! Ingest endpoints for the execution client

use axum::{extract::State, response::Json, routing::post, Router};
use serde_json::{json, Map, Value};

use crate::error::ApiError;
use crate::AppState;

/// Accept one market data point and acknowledge with the symbol's
/// current history depth.
async fn receive_market_data(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let ack = state.ingest.ingest_market_data(&payload)?;
    Ok(Json(json!({
        "status": "ok",
        "symbol": ack.symbol,
        "datapoints": ack.datapoints,
    })))
}

/// Accept an account snapshot.
async fn receive_account_data(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    state.ingest.ingest_account(payload)?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Accept the open position list.
async fn receive_positions(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let count = state.ingest.ingest_positions(&payload)?;
    Ok(Json(json!({ "status": "ok", "positions": count })))
}

/// Create ingest routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/market", post(receive_market_data))
        .route("/account", post(receive_account_data))
        .route("/positions", post(receive_positions))
}
