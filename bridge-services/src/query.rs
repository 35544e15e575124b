//! Query service
//!
//! Read side of the relay: serves current state snapshots to poll
//! clients, reloading from the feed/snapshot files first where the
//! contract calls for it. A failed reload keeps the in-memory value —
//! stale-but-valid beats empty.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use bridge_core::{PositionList, Signal};

use crate::feed::SignalFeed;
use crate::registry::ConnectionRegistry;
use crate::snapshot::SnapshotStore;
use crate::store::StateStore;

pub struct QueryService {
    store: Arc<StateStore>,
    snapshots: Arc<SnapshotStore>,
    feed: SignalFeed,
    registry: Arc<ConnectionRegistry>,
}

impl QueryService {
    pub fn new(
        store: Arc<StateStore>,
        snapshots: Arc<SnapshotStore>,
        feed: SignalFeed,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            store,
            snapshots,
            feed,
            registry,
        }
    }

    /// Current subscriber count, for health reporting.
    pub fn subscriber_count(&self) -> usize {
        self.registry.count()
    }

    /// Current signal set. Reloads from the JSON feed first when the
    /// file is present; a parse failure keeps the in-memory set.
    pub fn signals(&self) -> Vec<Signal> {
        if self.feed.json_available() {
            match self.feed.load_json_signals() {
                Ok(Some((signals, bundle))) => {
                    self.store.set_signals(signals);
                    self.store.set_bundle(bundle);
                }
                Ok(None) => {}
                Err(e) => warn!("Signal feed reload failed: {}", e),
            }
        }
        self.store.signals()
    }

    /// Current open trades. Reloads the persisted positions file when
    /// present, else serves the in-memory list. An empty result is the
    /// caller's cue to answer "checked, none".
    pub fn trades(&self) -> PositionList {
        if self.snapshots.has_positions() {
            if let Some(positions) = self.snapshots.load_positions() {
                self.store.set_positions(positions);
            }
        }
        self.store.positions()
    }

    /// The predictions bundle: the structured JSON feed verbatim when
    /// it exists, else a bundle synthesized from the tabular feed,
    /// else the last bundle held in memory. `None` means the caller
    /// should answer with an explicit empty bundle.
    pub fn predictions(&self) -> Option<Value> {
        match self.feed.load_json_signals() {
            Ok(Some((signals, bundle))) => {
                self.store.set_signals(signals);
                self.store.set_bundle(bundle.clone());
                return Some(bundle);
            }
            Ok(None) => {}
            Err(e) => warn!("Predictions feed reload failed: {}", e),
        }

        match self.feed.load_csv_signals() {
            Ok(Some(signals)) => {
                self.store.set_signals(signals.clone());
                return Some(serde_json::json!({
                    "predictions": [],
                    "signals": signals,
                }));
            }
            Ok(None) => {}
            Err(e) => warn!("Tabular feed reload failed: {}", e),
        }

        self.store.bundle()
    }
}
