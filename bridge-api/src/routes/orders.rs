//! Order pass-through endpoints
//!
//! The relay does not execute orders itself; it validates the request
//! and hands back a tracking acknowledgment for the execution client
//! to act on.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use chrono::Utc;
use serde_json::{json, Map, Value};

use bridge_core::{BridgeError, BridgeResult};

use crate::error::ApiError;
use crate::AppState;

const REQUIRED_ORDER_FIELDS: [&str; 3] = ["symbol", "type", "volume"];

/// Validate an order request and build its acknowledgment. The order
/// id embeds the acceptance time so the client can correlate fills.
pub(crate) fn build_order_ack(payload: &Map<String, Value>) -> BridgeResult<Value> {
    if let Some(missing) = REQUIRED_ORDER_FIELDS
        .iter()
        .find(|field| !payload.contains_key(**field))
    {
        return Err(BridgeError::missing_field(*missing));
    }

    let now = Utc::now();
    Ok(json!({
        "status": "success",
        "order_id": format!("ORD{}", now.timestamp_millis()),
        "symbol": payload["symbol"],
        "type": payload["type"],
        "volume": payload["volume"],
        "timestamp": now,
    }))
}

async fn create_order(
    State(_state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let ack = build_order_ack(&payload)?;
    Ok((StatusCode::CREATED, Json(ack)))
}

async fn close_position(
    State(_state): State<AppState>,
    Path(position_id): Path<String>,
) -> Json<Value> {
    Json(json!({
        "status": "success",
        "position_id": position_id,
        "closed_at": Utc::now(),
    }))
}

/// Create order routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/order", post(create_order))
        .route("/close/{position_id}", post(close_position))
}
