//! In-memory state store
//!
//! Holds the latest value per data kind: bounded per-symbol market
//! history, the wholesale-replaced account and position snapshots, and
//! the last successfully parsed signal set. Market histories live in a
//! `DashMap` so writers to different symbols never block one another;
//! whole-value kinds sit behind their own locks so each key is
//! independent.

use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;

use bridge_core::{AccountSnapshot, DataPoint, PositionList, Signal, MAX_HISTORY};

/// In-memory source of truth for everything the relay serves.
///
/// Reads of never-populated keys return empty values, never errors.
#[derive(Default)]
pub struct StateStore {
    market: DashMap<String, Vec<DataPoint>>,
    account: RwLock<AccountSnapshot>,
    positions: RwLock<PositionList>,
    signals: RwLock<Vec<Signal>>,
    bundle: RwLock<Option<Value>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a data point to its symbol's history, trimming to the
    /// most recent [`MAX_HISTORY`] entries (FIFO eviction).
    ///
    /// Returns a snapshot of the updated history for write-through.
    pub fn push_market(&self, point: DataPoint) -> Vec<DataPoint> {
        let mut history = self.market.entry(point.symbol.clone()).or_default();
        history.push(point);
        if history.len() > MAX_HISTORY {
            let excess = history.len() - MAX_HISTORY;
            history.drain(..excess);
        }
        history.clone()
    }

    /// Current history for one symbol; empty if never populated.
    pub fn market_history(&self, symbol: &str) -> Vec<DataPoint> {
        self.market
            .get(symbol)
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Replace a symbol's history wholesale (used when seeding from a
    /// prior snapshot at startup).
    pub fn set_market_history(&self, symbol: impl Into<String>, mut history: Vec<DataPoint>) {
        if history.len() > MAX_HISTORY {
            let excess = history.len() - MAX_HISTORY;
            history.drain(..excess);
        }
        self.market.insert(symbol.into(), history);
    }

    pub fn set_account(&self, snapshot: AccountSnapshot) {
        *self.account.write() = snapshot;
    }

    /// Current account snapshot; empty map if never populated.
    pub fn account(&self) -> AccountSnapshot {
        self.account.read().clone()
    }

    pub fn set_positions(&self, positions: PositionList) {
        *self.positions.write() = positions;
    }

    pub fn positions(&self) -> PositionList {
        self.positions.read().clone()
    }

    pub fn set_signals(&self, signals: Vec<Signal>) {
        *self.signals.write() = signals;
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.signals.read().clone()
    }

    pub fn set_bundle(&self, bundle: Value) {
        *self.bundle.write() = Some(bundle);
    }

    pub fn bundle(&self) -> Option<Value> {
        self.bundle.read().clone()
    }
}
