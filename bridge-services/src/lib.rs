//! Relay core for the QuantumTrader bridge
//!
//! The pieces that sit between the execution client and the
//! prediction process: the in-memory state store, JSON snapshot
//! persistence, the signal feed reader, the subscriber registry, the
//! ingest/query services, and the change-detecting broadcaster task.

pub mod broadcaster;
pub mod feed;
pub mod ingest;
pub mod query;
pub mod registry;
pub mod snapshot;
pub mod store;

pub use broadcaster::{BroadcasterConfig, SignalBroadcaster};
pub use feed::{FeedError, SignalFeed};
pub use ingest::{IngestService, MarketAck};
pub use query::QueryService;
pub use registry::{ClientId, ConnectionRegistry};
pub use snapshot::{SnapshotError, SnapshotStore};
pub use store::StateStore;
