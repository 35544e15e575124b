//! Relay configuration derived from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub bind: String,
    pub port: u16,
    /// Directory for market/account snapshot files
    pub data_dir: PathBuf,
    /// Directory shared with the prediction process (feed + trades)
    pub predictions_dir: PathBuf,
    /// Broadcaster poll interval
    pub poll_interval: Duration,
    /// Broadcaster backoff after a bad feed read
    pub error_backoff: Duration,
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_secs(name: &str, default: u64) -> Duration {
    let secs = env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        Self {
            bind: env_str("BRIDGE_BIND", "0.0.0.0"),
            port: env_u16("BRIDGE_PORT", 8080),
            data_dir: PathBuf::from(env_str("BRIDGE_DATA_DIR", "bridge/data")),
            predictions_dir: PathBuf::from(env_str("BRIDGE_PREDICTIONS_DIR", "predictions")),
            poll_interval: env_secs("BRIDGE_POLL_SECS", 1),
            error_backoff: env_secs("BRIDGE_ERROR_BACKOFF_SECS", 5),
        }
    }
}
