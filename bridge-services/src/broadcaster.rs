//! Signal broadcaster
//!
//! Background task that polls the signal feed and, when the signal
//! count changes, pushes the full current set to every registered
//! subscriber. Change detection is count-only: a feed shrinking and
//! regrowing to the same count within one cycle is invisible. That is
//! the documented contract, not an oversight to fix with hashing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{info, warn};

use bridge_core::ServerMessage;

use crate::feed::{FeedError, SignalFeed};
use crate::registry::ConnectionRegistry;
use crate::store::StateStore;

/// Configuration for the broadcaster loop
#[derive(Debug, Clone)]
pub struct BroadcasterConfig {
    /// How often to poll the feed for changes
    pub poll_interval: Duration,
    /// How long to wait after an unreadable or malformed feed read
    pub error_backoff: Duration,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            error_backoff: Duration::from_secs(5),
        }
    }
}

/// Change-detecting fan-out task over the signal feed.
pub struct SignalBroadcaster {
    feed: SignalFeed,
    store: Arc<StateStore>,
    registry: Arc<ConnectionRegistry>,
    config: BroadcasterConfig,
    last_count: AtomicUsize,
}

impl SignalBroadcaster {
    pub fn new(
        feed: SignalFeed,
        store: Arc<StateStore>,
        registry: Arc<ConnectionRegistry>,
        config: BroadcasterConfig,
    ) -> Self {
        Self {
            feed,
            store,
            registry,
            config,
            last_count: AtomicUsize::new(0),
        }
    }

    /// Run until the shutdown channel closes or signals.
    ///
    /// Transient feed errors extend the sleep to `error_backoff`; they
    /// never terminate the loop.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<()>) {
        info!(
            "Starting signal broadcaster with {:?} poll interval",
            self.config.poll_interval
        );

        loop {
            let delay = match self.poll_once() {
                Ok(()) => self.config.poll_interval,
                Err(e) => {
                    warn!("Signal feed read failed: {}", e);
                    self.config.error_backoff
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {
                    info!("Signal broadcaster stopping");
                    break;
                }
            }
        }
    }

    /// One poll cycle: read the feed, compare counts, maybe push.
    ///
    /// An absent feed file is an empty result, not an error — only an
    /// unreadable or malformed file reaches the error backoff.
    pub fn poll_once(&self) -> Result<(), FeedError> {
        let Some((signals, bundle)) = self.feed.load_json_signals()? else {
            return Ok(());
        };

        let count = signals.len();
        if count == self.last_count.swap(count, Ordering::SeqCst) {
            return Ok(());
        }

        self.store.set_signals(signals.clone());
        self.store.set_bundle(bundle);

        let clients = self.registry.broadcast(ServerMessage::NewSignals {
            signals,
            timestamp: Utc::now(),
        });
        info!("Broadcasted {} signals to {} clients", count, clients);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;
    use tokio::time::timeout;

    const RECV_WINDOW: Duration = Duration::from_millis(500);

    fn write_feed(dir: &Path, count: usize) {
        let entries: Vec<Value> = (0..count)
            .map(|i| json!({ "symbol": format!("SYM{i}"), "action": "BUY" }))
            .collect();
        fs::write(
            dir.join("signal_output.json"),
            serde_json::to_vec(&json!({ "signals": entries })).unwrap(),
        )
        .unwrap();
    }

    fn broadcaster(
        dir: &Path,
    ) -> (Arc<SignalBroadcaster>, Arc<StateStore>, Arc<ConnectionRegistry>) {
        let store = Arc::new(StateStore::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Arc::new(SignalBroadcaster::new(
            SignalFeed::new(dir),
            Arc::clone(&store),
            Arc::clone(&registry),
            BroadcasterConfig {
                poll_interval: Duration::from_millis(20),
                error_backoff: Duration::from_millis(50),
            },
        ));
        (broadcaster, store, registry)
    }

    fn signal_count(msg: ServerMessage) -> usize {
        match msg {
            ServerMessage::NewSignals { signals, .. } => signals.len(),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_poll_updates_store_and_count_once_per_change() {
        let dir = tempdir().unwrap();
        write_feed(dir.path(), 3);
        let (broadcaster, store, _registry) = broadcaster(dir.path());

        broadcaster.poll_once().unwrap();
        assert_eq!(store.signals().len(), 3);

        // Same count again: store left alone, no re-push.
        store.set_signals(vec![]);
        broadcaster.poll_once().unwrap();
        assert!(store.signals().is_empty());

        write_feed(dir.path(), 5);
        broadcaster.poll_once().unwrap();
        assert_eq!(store.signals().len(), 5);
    }

    #[test]
    fn test_absent_feed_is_not_an_error() {
        let dir = tempdir().unwrap();
        let (broadcaster, _, _) = broadcaster(dir.path());
        assert!(broadcaster.poll_once().is_ok());
    }

    #[test]
    fn test_corrupt_feed_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("signal_output.json"), b"not json").unwrap();
        let (broadcaster, _, _) = broadcaster(dir.path());
        assert!(broadcaster.poll_once().is_err());
    }

    #[tokio::test]
    async fn test_count_change_pushes_to_subscribers_once() {
        let dir = tempdir().unwrap();
        write_feed(dir.path(), 3);

        let (broadcaster, _, registry) = broadcaster(dir.path());
        let (_id, mut rx) = registry.register();

        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let task = tokio::spawn(Arc::clone(&broadcaster).run(shutdown_rx));

        let first = timeout(RECV_WINDOW, rx.recv()).await.unwrap().unwrap();
        assert_eq!(signal_count(first), 3);

        write_feed(dir.path(), 5);
        let second = timeout(RECV_WINDOW, rx.recv()).await.unwrap().unwrap();
        assert_eq!(signal_count(second), 5);

        // Rewriting with the same count emits nothing further.
        write_feed(dir.path(), 5);
        assert!(timeout(Duration::from_millis(150), rx.recv()).await.is_err());

        drop(shutdown_tx);
        timeout(RECV_WINDOW, task).await.unwrap().unwrap();
    }
}
