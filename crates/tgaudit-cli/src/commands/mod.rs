//! Command handlers.

use std::path::PathBuf;

use tgaudit_core::Config;
use tgaudit_pipeline::SessionStore;

pub mod config;
pub mod convert;
pub mod scan;

/// Open the session store at the configured directories, with an optional
/// base-directory override from the command line.
pub(crate) fn open_store(config: &Config, dir: Option<PathBuf>) -> anyhow::Result<SessionStore> {
    let mut dirs = config.dirs.clone();
    if let Some(dir) = dir {
        dirs.base = dir;
    }
    Ok(SessionStore::from_dirs(&dirs)?)
}
