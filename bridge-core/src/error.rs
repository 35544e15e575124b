//! Error types for the bridge relay

use thiserror::Error;

/// Relay-wide error type
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Missing {0}")]
    MissingField(String),

    #[error("No data provided")]
    EmptyPayload,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        BridgeError::MissingField(field.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        BridgeError::Parse(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        BridgeError::Internal(msg.into())
    }
}

/// Result type alias for relay operations
pub type BridgeResult<T> = Result<T, BridgeError>;
