//! WebSocket message types for the persistent transport
//!
//! These types define the wire protocol between the relay and its
//! subscribers. Every request/response operation of the HTTP side has
//! a named event here, plus the server-pushed `new_signals` event and
//! the connect lifecycle greeting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Signal;

// ============================================================================
// Client -> Server Messages
// ============================================================================

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Health/status request
    Health,
    /// Request the current signal set
    GetSignals,
    /// Request open trades
    GetTrades,
    /// Request the full predictions bundle
    GetPredictions,
    /// Push a market data point
    MarketData {
        #[serde(default)]
        data: Map<String, Value>,
    },
    /// Push an account snapshot (wholesale replacement)
    AccountData {
        #[serde(default)]
        data: Map<String, Value>,
    },
    /// Push the open position list (wholesale replacement)
    PositionsData {
        #[serde(default)]
        data: Map<String, Value>,
    },
    /// Create an order (stateless stub)
    CreateOrder {
        #[serde(default)]
        data: Map<String, Value>,
    },
    /// Close a position (stateless stub)
    ClosePosition { position_id: String },
    /// Ping to keep the connection alive
    Ping { timestamp: i64 },
}

// ============================================================================
// Server -> Client Messages
// ============================================================================

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Greeting sent right after the connection is registered
    Connected {
        server: String,
        timestamp: DateTime<Utc>,
    },
    /// Health/status response
    Health {
        status: String,
        websocket: String,
        connected_clients: usize,
        timestamp: DateTime<Utc>,
    },
    /// Response to `get_signals`
    Signals { signals: Vec<Signal> },
    /// Response to `get_trades`
    Trades {
        trades: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        timestamp: DateTime<Utc>,
    },
    /// Response to `get_predictions`; `data` is the feed bundle verbatim
    Predictions { data: Value },
    /// Market data accepted
    MarketDataAck {
        symbol: String,
        datapoints: usize,
        timestamp: DateTime<Utc>,
    },
    /// Account snapshot accepted
    AccountDataAck { status: String },
    /// Position list accepted
    PositionsDataAck { status: String, positions: usize },
    /// Synthesized order acknowledgment (stub)
    OrderAck { data: Value },
    /// Synthesized close acknowledgment (stub)
    PositionClosed {
        status: String,
        position_id: String,
        closed_at: DateTime<Utc>,
    },
    /// Server push: the signal feed changed
    NewSignals {
        signals: Vec<Signal>,
        timestamp: DateTime<Utc>,
    },
    /// Pong response to client ping
    Pong {
        client_timestamp: i64,
        server_timestamp: i64,
    },
    /// Error message
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_message_tags() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "market_data",
            "data": { "symbol": "EURUSD", "bid": 1.09 },
        }))
        .unwrap();

        match msg {
            ClientMessage::MarketData { data } => {
                assert_eq!(data.get("symbol"), Some(&json!("EURUSD")));
            }
            other => panic!("unexpected message: {other:?}"),
        }

        let msg: ClientMessage = serde_json::from_value(json!({ "type": "get_signals" })).unwrap();
        assert!(matches!(msg, ClientMessage::GetSignals));
    }

    #[test]
    fn test_client_message_data_defaults_to_empty() {
        let msg: ClientMessage =
            serde_json::from_value(json!({ "type": "account_data" })).unwrap();
        match msg {
            ClientMessage::AccountData { data } => assert!(data.is_empty()),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_server_message_round_trip() {
        let msg = ServerMessage::NewSignals {
            signals: vec![Signal {
                symbol: "EURUSD".to_string(),
                action: "BUY".to_string(),
                ..Default::default()
            }],
            timestamp: Utc::now(),
        };

        let text = serde_json::to_string(&msg).unwrap();
        assert!(text.contains(r#""type":"new_signals""#));

        let parsed: ServerMessage = serde_json::from_str(&text).unwrap();
        match parsed {
            ServerMessage::NewSignals { signals, .. } => {
                assert_eq!(signals.len(), 1);
                assert_eq!(signals[0].symbol, "EURUSD");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_trades_message_omits_empty_message_field() {
        let msg = ServerMessage::Trades {
            trades: vec![json!({"id": 1})],
            message: None,
            timestamp: Utc::now(),
        };
        let text = serde_json::to_string(&msg).unwrap();
        assert!(!text.contains("message"));
    }
}
