//! Signal feed reader
//!
//! The prediction process communicates through files: a structured
//! JSON bundle (`signal_output.json`, a superset of its `signals`
//! array) and a tabular fallback (`predictions.csv`). The relay only
//! ever reads these.
//!
//! Absent files are reported as `Ok(None)` (an empty result, not an
//! error); present-but-unparsable files are errors so callers can keep
//! the last-known-good set and back off.

use std::path::{Path, PathBuf};

use serde_json::Value;

use bridge_core::{Signal, SignalRow};

/// Errors from reading the feed files.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid feed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid feed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Reader over the two feed files the prediction process writes.
#[derive(Debug, Clone)]
pub struct SignalFeed {
    json_path: PathBuf,
    csv_path: PathBuf,
}

impl SignalFeed {
    pub fn new(predictions_dir: impl AsRef<Path>) -> Self {
        let dir = predictions_dir.as_ref();
        Self {
            json_path: dir.join("signal_output.json"),
            csv_path: dir.join("predictions.csv"),
        }
    }

    /// Whether the structured JSON feed currently exists.
    pub fn json_available(&self) -> bool {
        self.json_path.exists()
    }

    /// Whether the tabular fallback feed currently exists.
    pub fn csv_available(&self) -> bool {
        self.csv_path.exists()
    }

    /// Read the raw JSON bundle. `Ok(None)` when the file is absent.
    pub fn load_bundle(&self) -> Result<Option<Value>, FeedError> {
        if !self.json_path.exists() {
            return Ok(None);
        }
        let body = std::fs::read(&self.json_path)?;
        Ok(Some(serde_json::from_slice(&body)?))
    }

    /// Extract the typed signal set from a bundle. A bundle without a
    /// `signals` key yields an empty set.
    pub fn signals_from_bundle(bundle: &Value) -> Result<Vec<Signal>, FeedError> {
        match bundle.get("signals") {
            Some(signals) => Ok(serde_json::from_value(signals.clone())?),
            None => Ok(Vec::new()),
        }
    }

    /// Read the JSON feed and return both the typed signals and the
    /// verbatim bundle in a single pass over the file.
    pub fn load_json_signals(&self) -> Result<Option<(Vec<Signal>, Value)>, FeedError> {
        let Some(bundle) = self.load_bundle()? else {
            return Ok(None);
        };
        let signals = Self::signals_from_bundle(&bundle)?;
        Ok(Some((signals, bundle)))
    }

    /// Read the tabular fallback feed. `Ok(None)` when absent.
    pub fn load_csv_signals(&self) -> Result<Option<Vec<Signal>>, FeedError> {
        if !self.csv_path.exists() {
            return Ok(None);
        }
        let mut reader = csv::ReaderBuilder::new().from_path(&self.csv_path)?;
        let mut signals = Vec::new();
        for row in reader.deserialize::<SignalRow>() {
            signals.push(Signal::from(row?));
        }
        Ok(Some(signals))
    }
}
