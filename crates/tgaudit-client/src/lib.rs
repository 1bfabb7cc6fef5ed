//! # tgaudit-client
//!
//! Remote protocol client surface for tgaudit.
//!
//! This crate provides:
//! - Session representations: the file-backed SQLite artifact reader and
//!   the portable string-session codec
//! - Proxy specification parsing and its metadata wire shape
//! - The `ProtocolClient` / `ClientFactory` traits the audit pipeline is
//!   generic over
//!
//! The transport protocol itself (handshake, encryption, updates) lives
//! behind `ProtocolClient`; this crate only defines the seam and the local
//! session formats.

pub mod error;
pub mod proxy;
pub mod session;
pub mod traits;

pub use error::{ClientError, SessionError};
pub use proxy::{ProxyConfig, ProxyParseError, ProxyScheme};
pub use session::{AuthKey, FileSession, SessionInfo, StringSession};
pub use traits::{ClientConfig, ClientFactory, ProtocolClient, SessionRef};

/// Auth key size in bytes (256 bytes = 2048 bits)
pub const AUTH_KEY_LEN: usize = 256;
