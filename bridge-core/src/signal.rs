//! Trading signal records produced by the external prediction process.
//!
//! The relay is a passive reader of signal content: signals arrive
//! either through the structured JSON feed (`signal_output.json`) or
//! the tabular fallback feed (`predictions.csv`).

use serde::{Deserialize, Serialize};

/// ML metadata attached to a signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MlPrediction {
    #[serde(default)]
    pub entry_probability: f64,
    #[serde(default)]
    pub exit_probability: f64,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub predicted_window: i64,
}

/// A trading recommendation from the prediction process.
///
/// All fields carry serde defaults so partially-populated feed rows
/// still parse; the feed file is written by an external process the
/// relay has no control over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub trend: String,
    #[serde(default)]
    pub probability: f64,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub ml_prediction: MlPrediction,
}

/// One row of the tabular fallback feed. Column names match the file
/// header written by the prediction process.
#[derive(Debug, Deserialize)]
pub struct SignalRow {
    pub symbol: String,
    pub trend: String,
    pub probability: f64,
    pub action: String,
    pub timestamp: String,
    pub entry_prob: f64,
    pub exit_prob: f64,
    pub confidence: f64,
    pub predicted_window: i64,
}

impl From<SignalRow> for Signal {
    fn from(row: SignalRow) -> Self {
        Signal {
            symbol: row.symbol,
            trend: row.trend,
            probability: row.probability,
            action: row.action,
            timestamp: row.timestamp,
            ml_prediction: MlPrediction {
                entry_probability: row.entry_prob,
                exit_probability: row.exit_prob,
                confidence_score: row.confidence,
                predicted_window: row.predicted_window,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signal_parses_with_defaults() {
        let signal: Signal = serde_json::from_value(json!({
            "symbol": "EURUSD",
            "action": "BUY",
        }))
        .unwrap();

        assert_eq!(signal.symbol, "EURUSD");
        assert_eq!(signal.action, "BUY");
        assert_eq!(signal.probability, 0.0);
        assert_eq!(signal.ml_prediction, MlPrediction::default());
    }

    #[test]
    fn test_signal_parses_nested_prediction() {
        let signal: Signal = serde_json::from_value(json!({
            "symbol": "GBPUSD",
            "trend": "bullish",
            "probability": 0.82,
            "action": "BUY",
            "timestamp": "2024-01-01T00:00:00",
            "ml_prediction": {
                "entry_probability": 0.8,
                "exit_probability": 0.3,
                "confidence_score": 0.9,
                "predicted_window": 15,
            },
        }))
        .unwrap();

        assert_eq!(signal.ml_prediction.predicted_window, 15);
        assert_eq!(signal.ml_prediction.confidence_score, 0.9);
    }

    #[test]
    fn test_row_conversion() {
        let row = SignalRow {
            symbol: "USDJPY".to_string(),
            trend: "bearish".to_string(),
            probability: 0.71,
            action: "SELL".to_string(),
            timestamp: "2024-01-01T00:00:00".to_string(),
            entry_prob: 0.7,
            exit_prob: 0.4,
            confidence: 0.65,
            predicted_window: 30,
        };

        let signal = Signal::from(row);
        assert_eq!(signal.symbol, "USDJPY");
        assert_eq!(signal.ml_prediction.entry_probability, 0.7);
        assert_eq!(signal.ml_prediction.predicted_window, 30);
    }
}
