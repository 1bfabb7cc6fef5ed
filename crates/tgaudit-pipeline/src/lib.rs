//! # tgaudit-pipeline
//!
//! Session discovery, authentication checking and format migration.
//!
//! This crate provides:
//! - [`store::SessionStore`] - on-disk discovery of session/metadata pairs
//! - [`authenticator::SessionAuthenticator`] - the per-account
//!   connect/authorize state machine with guaranteed teardown
//! - [`converter::SessionFormatConverter`] - file-backed to portable
//!   string-session migration
//! - [`runner::check_directory`] - bounded-concurrency batch checking
//!
//! The pipeline is generic over [`tgaudit_client::ProtocolClient`]; it
//! never speaks the wire protocol itself.

pub mod authenticator;
pub mod converter;
pub mod runner;
pub mod store;

pub use authenticator::{AuthError, AuthSettings, CheckOutcome, SessionAuthenticator};
pub use converter::{ConvertError, ConvertedPair, SessionFormatConverter};
pub use runner::{check_directory, CheckReport};
pub use store::{SessionArtifactPair, SessionStore};
