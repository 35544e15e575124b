//! Ingest service
//!
//! Shared by both transports: validates updates from the execution
//! client, routes them into the state store, write-throughs the
//! snapshot files, and produces acknowledgments. A failed flush is
//! logged and never fails the in-flight request — in-memory state is
//! the source of truth for serving.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use bridge_core::{
    AccountSnapshot, BridgeError, BridgeResult, DataPoint, PositionList, LAST_UPDATE_KEY,
};

use crate::snapshot::SnapshotStore;
use crate::store::StateStore;

/// Acknowledgment for an accepted market data point.
#[derive(Debug, Clone)]
pub struct MarketAck {
    pub symbol: String,
    pub datapoints: usize,
}

pub struct IngestService {
    store: Arc<StateStore>,
    snapshots: Arc<SnapshotStore>,
}

impl IngestService {
    pub fn new(store: Arc<StateStore>, snapshots: Arc<SnapshotStore>) -> Self {
        Self { store, snapshots }
    }

    /// Accept one market data point.
    ///
    /// The payload must carry a string `symbol` field; anything else
    /// defaults. Rejection leaves all prior state untouched.
    pub fn ingest_market_data(&self, payload: &Map<String, Value>) -> BridgeResult<MarketAck> {
        let point =
            DataPoint::from_payload(payload).ok_or_else(|| BridgeError::missing_field("symbol"))?;
        let symbol = point.symbol.clone();

        let history = self.store.push_market(point);
        if let Err(e) = self.snapshots.flush_market(&symbol, &history) {
            warn!("Failed to flush market snapshot for {}: {}", symbol, e);
        }

        debug!("Market data for {}: {} datapoints", symbol, history.len());
        Ok(MarketAck {
            symbol,
            datapoints: history.len(),
        })
    }

    /// Accept an account snapshot, replacing the stored one wholesale.
    /// A `last_update` timestamp is injected before storing.
    pub fn ingest_account(&self, mut snapshot: AccountSnapshot) -> BridgeResult<()> {
        if snapshot.is_empty() {
            return Err(BridgeError::EmptyPayload);
        }

        snapshot.insert(
            LAST_UPDATE_KEY.to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        self.store.set_account(snapshot.clone());
        if let Err(e) = self.snapshots.flush_account(&snapshot) {
            warn!("Failed to flush account snapshot: {}", e);
        }

        Ok(())
    }

    /// Accept the open position list, replacing the stored one
    /// wholesale. A payload without a `positions` key degrades to an
    /// empty list; an entirely empty payload is rejected.
    pub fn ingest_positions(&self, payload: &Map<String, Value>) -> BridgeResult<usize> {
        if payload.is_empty() {
            return Err(BridgeError::EmptyPayload);
        }

        let positions: PositionList = payload
            .get("positions")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let count = positions.len();
        self.store.set_positions(positions.clone());
        if let Err(e) = self.snapshots.flush_positions(&positions) {
            warn!("Failed to flush positions snapshot: {}", e);
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn service(dir: &tempfile::TempDir) -> IngestService {
        let snapshots = Arc::new(SnapshotStore::new(
            dir.path().join("data"),
            dir.path().join("predictions"),
        ));
        IngestService::new(Arc::new(StateStore::new()), snapshots)
    }

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_market_data_ack_counts_datapoints() {
        let dir = tempdir().unwrap();
        let ingest = service(&dir);

        for i in 0..3 {
            let ack = ingest
                .ingest_market_data(&payload(json!({
                    "symbol": "EURUSD",
                    "bid": 1.09,
                    "ask": 1.0902,
                    "timestamp": 1700000000 + i,
                })))
                .unwrap();
            assert_eq!(ack.symbol, "EURUSD");
            assert_eq!(ack.datapoints, (i + 1) as usize);
        }
    }

    #[test]
    fn test_market_data_without_symbol_is_rejected_without_mutation() {
        let dir = tempdir().unwrap();
        let ingest = service(&dir);

        ingest
            .ingest_market_data(&payload(json!({ "symbol": "EURUSD", "bid": 1.09 })))
            .unwrap();

        let err = ingest
            .ingest_market_data(&payload(json!({ "bid": 1.10 })))
            .unwrap_err();
        assert!(matches!(err, BridgeError::MissingField(_)));
        assert_eq!(err.to_string(), "Missing symbol");

        // Prior state for every symbol is unchanged.
        assert_eq!(ingest.store.market_history("EURUSD").len(), 1);
    }

    #[test]
    fn test_account_gets_last_update_injected() {
        let dir = tempdir().unwrap();
        let ingest = service(&dir);

        ingest
            .ingest_account(payload(json!({ "balance": 1000 })))
            .unwrap();

        let account = ingest.store.account();
        assert_eq!(account.get("balance"), Some(&json!(1000)));
        assert!(account.get(LAST_UPDATE_KEY).is_some());
    }

    #[test]
    fn test_empty_account_payload_is_rejected() {
        let dir = tempdir().unwrap();
        let ingest = service(&dir);

        let err = ingest.ingest_account(Map::new()).unwrap_err();
        assert!(matches!(err, BridgeError::EmptyPayload));
    }

    #[test]
    fn test_positions_stored_exactly() {
        let dir = tempdir().unwrap();
        let ingest = service(&dir);

        let count = ingest
            .ingest_positions(&payload(json!({
                "positions": [{ "id": 1 }, { "id": 2 }],
            })))
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            ingest.store.positions(),
            vec![json!({"id": 1}), json!({"id": 2})]
        );
    }

    #[test]
    fn test_positions_key_missing_degrades_to_empty_list() {
        let dir = tempdir().unwrap();
        let ingest = service(&dir);

        let count = ingest
            .ingest_positions(&payload(json!({ "account": 12345 })))
            .unwrap();

        assert_eq!(count, 0);
        assert!(ingest.store.positions().is_empty());
    }

    #[test]
    fn test_restart_reloads_flushed_account() {
        let dir = tempdir().unwrap();
        let snapshots = Arc::new(SnapshotStore::new(
            dir.path().join("data"),
            dir.path().join("predictions"),
        ));
        let ingest = IngestService::new(Arc::new(StateStore::new()), Arc::clone(&snapshots));
        ingest
            .ingest_account(payload(json!({ "balance": 2500 })))
            .unwrap();

        // A new store seeded from the same snapshot directory, with no
        // ingest since "restart".
        let store = StateStore::new();
        if let Some(account) = snapshots.load_account() {
            store.set_account(account);
        }

        let account = store.account();
        assert_eq!(account.get("balance"), Some(&json!(2500)));
        assert!(account.get(LAST_UPDATE_KEY).is_some());
    }
}
