//! WebSocket route handler
//!
//! Handles WebSocket upgrade and connection management. Every HTTP
//! operation has a named event twin here, answered over the same
//! connection; the broadcaster's `new_signals` pushes arrive through
//! the subscriber's registry queue.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use bridge_core::{ClientMessage, ServerMessage};
use bridge_services::ClientId;

use super::orders::build_order_ack;
use crate::AppState;

const SERVER_NAME: &str = "QuantumTrader Bridge";

/// Create WebSocket routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (client_id, mut outgoing_rx) = state.registry.register();

    // Task: drain the registry queue into the socket
    let send_task = tokio::spawn(async move {
        while let Some(message) = outgoing_rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(j) => j,
                Err(e) => {
                    warn!("Failed to serialize message: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Greeting goes through the same queue so ordering matches later
    // pushes.
    state.registry.send(
        client_id,
        ServerMessage::Connected {
            server: SERVER_NAME.to_string(),
            timestamp: Utc::now(),
        },
    );

    // Receive loop: parse, dispatch, queue the reply.
    while let Some(result) = receiver.next().await {
        let msg = match result {
            Ok(msg) => msg,
            Err(e) => {
                debug!("WebSocket error for {}: {}", client_id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                let reply = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => dispatch(&state, client_msg),
                    Err(e) => ServerMessage::Error {
                        message: format!("Invalid message: {}", e),
                    },
                };
                if !state.registry.send(client_id, reply) {
                    break;
                }
            }
            Message::Binary(_) => {
                let sent = state.registry.send(
                    client_id,
                    ServerMessage::Error {
                        message: "Binary messages not supported".to_string(),
                    },
                );
                if !sent {
                    break;
                }
            }
            Message::Ping(_) | Message::Pong(_) => {
                debug!("Keepalive frame from {}", client_id);
            }
            Message::Close(_) => {
                debug!("Received close from {}", client_id);
                break;
            }
        }
    }

    cleanup(&state, client_id);
    send_task.abort();
}

fn cleanup(state: &AppState, client_id: ClientId) {
    state.registry.unregister(client_id);
    info!("WebSocket connection closed: {}", client_id);
}

/// Map a client message onto the shared services and build its reply.
fn dispatch(state: &AppState, msg: ClientMessage) -> ServerMessage {
    match msg {
        ClientMessage::Health => ServerMessage::Health {
            status: "ok".to_string(),
            websocket: "enabled".to_string(),
            connected_clients: state.query.subscriber_count(),
            timestamp: Utc::now(),
        },
        ClientMessage::GetSignals => ServerMessage::Signals {
            signals: state.query.signals(),
        },
        ClientMessage::GetTrades => {
            let trades = state.query.trades();
            let message = trades
                .is_empty()
                .then(|| "No active trades".to_string());
            ServerMessage::Trades {
                trades,
                message,
                timestamp: Utc::now(),
            }
        }
        ClientMessage::GetPredictions => {
            let data = state.query.predictions().unwrap_or_else(|| {
                serde_json::json!({
                    "predictions": [],
                    "signals": [],
                    "message": "No predictions available",
                    "timestamp": Utc::now(),
                })
            });
            ServerMessage::Predictions { data }
        }
        ClientMessage::MarketData { data } => match state.ingest.ingest_market_data(&data) {
            Ok(ack) => ServerMessage::MarketDataAck {
                symbol: ack.symbol,
                datapoints: ack.datapoints,
                timestamp: Utc::now(),
            },
            Err(e) => ServerMessage::Error {
                message: e.to_string(),
            },
        },
        ClientMessage::AccountData { data } => match state.ingest.ingest_account(data) {
            Ok(()) => ServerMessage::AccountDataAck {
                status: "ok".to_string(),
            },
            Err(e) => ServerMessage::Error {
                message: e.to_string(),
            },
        },
        ClientMessage::PositionsData { data } => match state.ingest.ingest_positions(&data) {
            Ok(positions) => ServerMessage::PositionsDataAck {
                status: "ok".to_string(),
                positions,
            },
            Err(e) => ServerMessage::Error {
                message: e.to_string(),
            },
        },
        ClientMessage::CreateOrder { data } => match build_order_ack(&data) {
            Ok(ack) => ServerMessage::OrderAck { data: ack },
            Err(e) => ServerMessage::Error {
                message: e.to_string(),
            },
        },
        ClientMessage::ClosePosition { position_id } => ServerMessage::PositionClosed {
            status: "success".to_string(),
            position_id,
            closed_at: Utc::now(),
        },
        ClientMessage::Ping { timestamp } => ServerMessage::Pong {
            client_timestamp: timestamp,
            server_timestamp: Utc::now().timestamp_millis(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};
    use std::sync::Arc;
    use tempfile::tempdir;

    use bridge_services::{
        ConnectionRegistry, IngestService, QueryService, SignalFeed, SnapshotStore, StateStore,
    };

    fn app_state(dir: &tempfile::TempDir) -> AppState {
        let store = Arc::new(StateStore::new());
        let snapshots = Arc::new(SnapshotStore::new(
            dir.path().join("data"),
            dir.path().join("predictions"),
        ));
        let feed = SignalFeed::new(dir.path().join("predictions"));
        let registry = Arc::new(ConnectionRegistry::new());
        AppState {
            ingest: Arc::new(IngestService::new(Arc::clone(&store), Arc::clone(&snapshots))),
            query: Arc::new(QueryService::new(store, snapshots, feed, Arc::clone(&registry))),
            registry,
        }
    }

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_health_reports_subscriber_count() {
        let dir = tempdir().unwrap();
        let state = app_state(&dir);
        let (_id, _rx) = state.registry.register();

        match dispatch(&state, ClientMessage::Health) {
            ServerMessage::Health {
                status,
                connected_clients,
                ..
            } => {
                assert_eq!(status, "ok");
                assert_eq!(connected_clients, 1);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_market_data_round_trips_through_dispatch() {
        let dir = tempdir().unwrap();
        let state = app_state(&dir);

        let reply = dispatch(
            &state,
            ClientMessage::MarketData {
                data: payload(json!({ "symbol": "GBPUSD", "bid": 1.27, "ask": 1.2702 })),
            },
        );

        match reply {
            ServerMessage::MarketDataAck {
                symbol, datapoints, ..
            } => {
                assert_eq!(symbol, "GBPUSD");
                assert_eq!(datapoints, 1);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_market_data_becomes_error_event() {
        let dir = tempdir().unwrap();
        let state = app_state(&dir);

        let reply = dispatch(
            &state,
            ClientMessage::MarketData {
                data: payload(json!({ "bid": 1.27 })),
            },
        );

        match reply {
            ServerMessage::Error { message } => assert_eq!(message, "Missing symbol"),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_get_trades_empty_carries_message() {
        let dir = tempdir().unwrap();
        let state = app_state(&dir);

        match dispatch(&state, ClientMessage::GetTrades) {
            ServerMessage::Trades {
                trades, message, ..
            } => {
                assert!(trades.is_empty());
                assert_eq!(message.as_deref(), Some("No active trades"));
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_close_position_echoes_id() {
        let dir = tempdir().unwrap();
        let state = app_state(&dir);

        match dispatch(
            &state,
            ClientMessage::ClosePosition {
                position_id: "12345".to_string(),
            },
        ) {
            ServerMessage::PositionClosed {
                status,
                position_id,
                ..
            } => {
                assert_eq!(status, "success");
                assert_eq!(position_id, "12345");
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_ping_pong() {
        let dir = tempdir().unwrap();
        let state = app_state(&dir);

        match dispatch(&state, ClientMessage::Ping { timestamp: 42 }) {
            ServerMessage::Pong {
                client_timestamp, ..
            } => assert_eq!(client_timestamp, 42),
            other => panic!("unexpected reply: {other:?}"),
        }
    }
}
