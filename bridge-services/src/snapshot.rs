//! Snapshot persistence
//!
//! Write-through of each state mutation to plain JSON files, one per
//! data kind, overwritten wholesale on each flush. Persistence is a
//! best-effort recovery aid: flush failures are logged by callers and
//! never roll back in-memory state, and loads at startup are lenient —
//! absent or malformed files seed an empty state, never a failure.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use bridge_core::{AccountSnapshot, DataPoint, PositionList};

/// Errors from the durable write path.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// JSON-file snapshot store.
///
/// Market and account snapshots live under `data_dir`; the position
/// list is shared with the prediction process under `predictions_dir`
/// as `trades.json`.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
    predictions_dir: PathBuf,
}

const MARKET_SUFFIX: &str = "_market.json";

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>, predictions_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            predictions_dir: predictions_dir.into(),
        }
    }

    fn market_path(&self, symbol: &str) -> PathBuf {
        // Symbols come from an external client; keep filenames tame.
        let safe: String = symbol
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        self.data_dir.join(format!("{safe}{MARKET_SUFFIX}"))
    }

    fn account_path(&self) -> PathBuf {
        self.data_dir.join("account.json")
    }

    fn positions_path(&self) -> PathBuf {
        self.predictions_dir.join("trades.json")
    }

    pub fn flush_market(&self, symbol: &str, history: &[DataPoint]) -> Result<(), SnapshotError> {
        write_json(&self.market_path(symbol), &history)
    }

    pub fn flush_account(&self, snapshot: &AccountSnapshot) -> Result<(), SnapshotError> {
        write_json(&self.account_path(), snapshot)
    }

    pub fn flush_positions(&self, positions: &PositionList) -> Result<(), SnapshotError> {
        write_json(&self.positions_path(), positions)
    }

    /// Whether a prior positions flush exists on disk.
    pub fn has_positions(&self) -> bool {
        self.positions_path().exists()
    }

    pub fn load_account(&self) -> Option<AccountSnapshot> {
        read_json(&self.account_path())
    }

    pub fn load_positions(&self) -> Option<PositionList> {
        read_json(&self.positions_path())
    }

    /// All per-symbol market histories flushed by a prior run.
    ///
    /// Unreadable files are skipped with a warning; they never block
    /// startup.
    pub fn load_markets(&self) -> Vec<(String, Vec<DataPoint>)> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut markets = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(symbol) = name.strip_suffix(MARKET_SUFFIX) else {
                continue;
            };
            if let Some(history) = read_json::<Vec<DataPoint>>(&entry.path()) {
                markets.push((symbol.to_string(), history));
            }
        }
        markets
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_vec_pretty(value)?;
    fs::write(path, body)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let body = fs::read(path).ok()?;
    match serde_json::from_slice(&body) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring malformed snapshot {}: {}", path.display(), e);
            None
        }
    }
}
