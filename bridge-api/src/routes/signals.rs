//! Read endpoints for signals, trades, and predictions

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::AppState;

/// Current signal set, served as a bare array.
async fn get_signals(State(state): State<AppState>) -> Json<Value> {
    let signals = state.query.signals();
    Json(json!(signals))
}

/// Open trades. An empty list answers with an explicit "checked,
/// none" envelope rather than a bare `[]`.
async fn get_trades(State(state): State<AppState>) -> Json<Value> {
    let trades = state.query.trades();
    if trades.is_empty() {
        return Json(json!({
            "trades": [],
            "message": "No active trades",
            "timestamp": Utc::now(),
        }));
    }
    Json(json!(trades))
}

/// The predictions bundle, or an explicit empty envelope when no
/// feed has ever been seen.
async fn get_predictions(State(state): State<AppState>) -> Json<Value> {
    match state.query.predictions() {
        Some(bundle) => Json(bundle),
        None => Json(json!({
            "predictions": [],
            "signals": [],
            "message": "No predictions available",
            "timestamp": Utc::now(),
        })),
    }
}

/// Create signal/trade/prediction routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signals", get(get_signals))
        .route("/trades", get(get_trades))
        .route("/predictions", get(get_predictions))
}
