//! Connection registry
//!
//! Tracks live subscriber connections so the broadcaster can fan out
//! pushes and health can report a connection count. Each subscriber
//! owns an outbound message queue; the transport layer drains it into
//! the socket. A subscriber whose queue has closed is dropped on the
//! next send touching it — no stale entries survive a disconnect.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use bridge_core::ServerMessage;

/// Outbound queue depth per subscriber.
const OUTGOING_CAPACITY: usize = 100;

/// Unique identifier for a subscriber connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

struct ConnectedClient {
    tx: mpsc::Sender<ServerMessage>,
    #[allow(dead_code)]
    connected_at: DateTime<Utc>,
}

/// Membership set of currently open subscriber connections.
#[derive(Default)]
pub struct ConnectionRegistry {
    next_client_id: AtomicU64,
    clients: DashMap<ClientId, ConnectedClient>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            next_client_id: AtomicU64::new(1),
            clients: DashMap::new(),
        }
    }

    /// Register a new subscriber, returning its id and the receiving
    /// end of its outbound queue.
    pub fn register(&self) -> (ClientId, mpsc::Receiver<ServerMessage>) {
        let client_id = ClientId(self.next_client_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = mpsc::channel(OUTGOING_CAPACITY);
        self.clients.insert(
            client_id,
            ConnectedClient {
                tx,
                connected_at: Utc::now(),
            },
        );
        info!("Client connected: {}", client_id);
        (client_id, rx)
    }

    /// Remove a subscriber (disconnect callback or send failure).
    pub fn unregister(&self, client_id: ClientId) {
        if self.clients.remove(&client_id).is_some() {
            info!("Client disconnected: {}", client_id);
        }
    }

    /// Queue a message for one subscriber. Returns false when the
    /// subscriber is gone (its entry is removed).
    pub fn send(&self, client_id: ClientId, message: ServerMessage) -> bool {
        let closed = match self.clients.get(&client_id) {
            Some(client) => match client.tx.try_send(message) {
                Ok(()) => return true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("Outbound queue full for {}, dropping message", client_id);
                    return true;
                }
                Err(mpsc::error::TrySendError::Closed(_)) => true,
            },
            None => false,
        };
        if closed {
            self.unregister(client_id);
        }
        false
    }

    /// Fan a message out to every registered subscriber.
    ///
    /// A subscriber whose queue has closed is dropped from the
    /// registry; failures never abort delivery to the rest. Returns
    /// the number of subscribers the message was queued for.
    pub fn broadcast(&self, message: ServerMessage) -> usize {
        let mut delivered = 0;
        let mut dead: Vec<ClientId> = Vec::new();

        for entry in self.clients.iter() {
            match entry.tx.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("Outbound queue full for {}, dropping push", entry.key());
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    dead.push(*entry.key());
                }
            }
        }

        for client_id in dead {
            debug!("Dropping disconnected subscriber {}", client_id);
            self.unregister(client_id);
        }

        delivered
    }

    /// Number of currently registered subscribers.
    pub fn count(&self) -> usize {
        self.clients.len()
    }
}
