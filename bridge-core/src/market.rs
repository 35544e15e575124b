//! Execution-client data: market ticks plus account and position
//! snapshots streamed in by the trading terminal's automated agent.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum number of data points retained per symbol. Oldest entries
/// are evicted first once the bound is exceeded.
pub const MAX_HISTORY: usize = 500;

/// Key injected into every stored account snapshot at ingest time.
pub const LAST_UPDATE_KEY: &str = "last_update";

/// Account state supplied wholesale by the execution client.
/// Replaced entirely on each update, never merged.
pub type AccountSnapshot = Map<String, Value>;

/// Open positions supplied wholesale by the execution client.
pub type PositionList = Vec<Value>;

/// A single bid/ask observation for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub symbol: String,
    #[serde(default)]
    pub bid: f64,
    #[serde(default)]
    pub ask: f64,
    #[serde(default)]
    pub spread: f64,
    /// Unix seconds. Filled at ingest time when the client omits it.
    #[serde(default = "now_unix")]
    pub timestamp: i64,
}

fn now_unix() -> i64 {
    Utc::now().timestamp()
}

impl DataPoint {
    /// Build a data point from a raw client payload.
    ///
    /// Returns `None` when the payload carries no string `symbol`
    /// field; every other field falls back to a default.
    pub fn from_payload(payload: &Map<String, Value>) -> Option<Self> {
        let symbol = payload.get("symbol")?.as_str()?.to_string();
        Some(Self {
            symbol,
            bid: number_or_zero(payload.get("bid")),
            ask: number_or_zero(payload.get("ask")),
            spread: number_or_zero(payload.get("spread")),
            timestamp: payload
                .get("timestamp")
                .and_then(Value::as_i64)
                .unwrap_or_else(now_unix),
        })
    }
}

fn number_or_zero(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}
