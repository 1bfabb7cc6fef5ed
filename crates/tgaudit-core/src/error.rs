//! Error types for tgaudit.
//!
//! Field-resolution errors carry fixed uppercase tags because downstream
//! batch tooling matches on them as stable classification strings.

use thiserror::Error;

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tgaudit-core.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metadata field resolution error
    #[error("{0}")]
    Metadata(#[from] MetadataError),
}

/// A required metadata field was absent (or empty) while the accessor
/// layer was constructed in strict mode.
///
/// The `Display` form is exactly the classification tag, nothing else.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataError {
    #[error("ERROR_SESSION_FILE")]
    SessionFile,

    #[error("ERROR_STRING_SESSION")]
    StringSession,

    #[error("ERROR_APP_ID")]
    AppId,

    #[error("ERROR_APP_HASH")]
    AppHash,

    #[error("ERROR_DEVICE")]
    Device,

    #[error("ERROR_SDK")]
    Sdk,

    #[error("ERROR_APP_VERSION")]
    AppVersion,

    #[error("ERROR_PROXY")]
    Proxy,
}
