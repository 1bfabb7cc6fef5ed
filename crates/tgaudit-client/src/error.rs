//! Error types for the client surface.

use std::path::PathBuf;

use thiserror::Error;

use crate::AUTH_KEY_LEN;

/// Errors surfaced by a protocol client implementation.
///
/// The audit state machine matches on these variants to classify an
/// account, so implementations must map their transport faults onto them
/// rather than inventing parallel types.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network-level failure while establishing or keeping a connection
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// The remote service reports the account as deactivated or banned
    #[error("account deactivated by the remote service")]
    Deactivated,

    /// RPC-level fault, carrying the service's uppercase error tag
    #[error("rpc error: {tag}")]
    Rpc { tag: String },

    /// The operation did not complete within the configured timeout
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The client configuration was rejected at construction
    #[error("invalid client config: {0}")]
    InvalidConfig(String),

    /// Local session material could not be loaded
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ClientError {
    pub fn connection(message: impl Into<String>) -> Self {
        ClientError::Connection {
            message: message.into(),
        }
    }

    pub fn rpc(tag: impl Into<String>) -> Self {
        ClientError::Rpc { tag: tag.into() }
    }

    /// Short uppercase cause tag for classification strings.
    ///
    /// Carries no payload: classification strings end up in batch reports
    /// and must never leak addresses, key material, or message text.
    pub fn cause_tag(&self) -> String {
        match self {
            ClientError::Connection { .. } => "CONNECTION_ERROR".to_string(),
            ClientError::Deactivated => "USER_DEACTIVATED".to_string(),
            ClientError::Rpc { tag } => tag.clone(),
            ClientError::Timeout { .. } => "TIMEOUT".to_string(),
            ClientError::InvalidConfig(_) => "INVALID_CONFIG".to_string(),
            ClientError::Session(_) => "SESSION_ERROR".to_string(),
        }
    }
}

/// Errors reading or decoding local session material.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session file not found: {0}")]
    NotFound(PathBuf),

    #[error("session database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("session file holds no session row")]
    Empty,

    #[error("session has no auth key")]
    MissingAuthKey,

    #[error("auth key must be {AUTH_KEY_LEN} bytes, got {len}")]
    MalformedKey { len: usize },

    #[error("invalid server address: {0}")]
    InvalidAddress(String),

    #[error("unsupported session string version: {0:?}")]
    UnsupportedVersion(char),

    #[error("session string is truncated or malformed")]
    Truncated,

    #[error("session string encoding: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
