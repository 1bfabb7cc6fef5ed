//! Protocol client trait definitions.
//!
//! The audit pipeline never speaks the wire protocol itself. It builds a
//! `ClientConfig` from account metadata, asks a `ClientFactory` for a
//! client, and drives it through `ProtocolClient`. Transport
//! implementations live outside this workspace.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::proxy::ProxyConfig;
use crate::session::SessionInfo;

/// Where the session state for a client comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRef {
    /// File-backed SQLite artifact
    File(PathBuf),
    /// Portable string-session text
    Text(String),
}

/// Constructor-shaped bundle for building one client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub session: SessionRef,
    pub api_id: i64,
    pub api_hash: String,
    pub device_model: String,
    pub system_version: String,
    pub app_version: String,
    pub lang_code: String,
    pub system_lang_code: String,
    pub connection_retries: u32,
    pub request_retries: u32,
    pub proxy: Option<ProxyConfig>,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Reject configs the remote service would refuse outright.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.api_id == 0 {
            return Err(ClientError::InvalidConfig(
                "api id cannot be zero".to_string(),
            ));
        }
        if self.api_hash.is_empty() {
            return Err(ClientError::InvalidConfig(
                "api hash cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Language pack the init request advertises for this app identity.
    pub fn lang_pack(&self) -> &'static str {
        lang_pack_for(self.api_id)
    }
}

/// Language pack advertised per well-known app identity.
pub fn lang_pack_for(api_id: i64) -> &'static str {
    match api_id {
        4 | 5 | 6 | 21724 | 16623 => "android",
        8 => "ios",
        2834 => "macos",
        2040 | 17349 => "tdesktop",
        2496 => "",
        _ => "android",
    }
}

/// Device model advertised when a record carries none.
pub fn default_device_model() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "PC 64bit",
        "x86" => "PC 32bit",
        other => other,
    }
}

/// Black-box handle on one account's connection to the remote service.
///
/// One client serves exactly one account for one check or conversion;
/// instances are never shared across accounts.
#[async_trait]
pub trait ProtocolClient: Send {
    /// Establish the connection. Retry policy lives inside the
    /// implementation, configured through [`ClientConfig`].
    async fn connect(&mut self) -> Result<(), ClientError>;

    /// Whether the session's credentials are currently authorized.
    async fn is_authorized(&mut self) -> Result<bool, ClientError>;

    /// Tear the connection down. Best-effort: the result is advisory and
    /// callers treat failures as non-fatal cleanup noise. Must be safe to
    /// call when never connected or already disconnected.
    async fn disconnect(&mut self) -> Result<(), ClientError>;

    /// Raw fields of the underlying session.
    fn session(&self) -> &SessionInfo;
}

/// Construction seam for protocol clients.
pub trait ClientFactory: Send + Sync {
    type Client: ProtocolClient;

    fn open(&self, config: ClientConfig) -> Result<Self::Client, ClientError>;
}
