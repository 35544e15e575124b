//! Core types for the QuantumTrader bridge relay
//!
//! This crate defines the shared data structures used across the relay:
//! market data records, trading signals, the WebSocket wire protocol,
//! and the workspace-wide error type.

pub mod error;
pub mod market;
pub mod protocol;
pub mod signal;

pub use error::{BridgeError, BridgeResult};
pub use market::{AccountSnapshot, DataPoint, PositionList, LAST_UPDATE_KEY, MAX_HISTORY};
pub use protocol::{ClientMessage, ServerMessage};
pub use signal::{MlPrediction, Signal, SignalRow};
