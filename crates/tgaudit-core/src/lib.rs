//! # tgaudit-core
//!
//! Core types and abstractions for tgaudit - the session audit and
//! migration toolkit.
//!
//! This crate provides:
//! - The account metadata record and its typed accessor layer
//! - The field-resolution error taxonomy
//! - Configuration system

pub mod config;
pub mod error;
pub mod metadata;

pub use config::Config;
pub use error::{Error, MetadataError, Result};
pub use metadata::AccountMetadata;
