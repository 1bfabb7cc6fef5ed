//! Bounded-concurrency batch checking.
//!
//! One account's full check cycle stays strictly sequential; across
//! accounts, latency is dominated by network round-trips, so the runner
//! keeps a bounded number of checks in flight. Each account owns exactly
//! one client; the runner is the caller that receives an authorized
//! account's live client, and it closes it before reporting.

use std::io;
use std::path::PathBuf;

use futures::stream::{self, StreamExt};

use tgaudit_client::ClientFactory;

use crate::authenticator::{AuthSettings, SessionAuthenticator};
use crate::store::{SessionArtifactPair, SessionStore};

/// Per-account result of a batch check.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub session_path: PathBuf,
    pub metadata_path: PathBuf,
    pub classification: String,
}

/// Check every discovered account under the store's base directory.
///
/// Construction failures (missing metadata fields) surface as that
/// account's classification string; no account's failure stops the batch.
/// Discovery errors stay on the store's error set for the caller to
/// report alongside.
pub async fn check_directory<F>(
    store: &SessionStore,
    factory: &F,
    settings: &AuthSettings,
    concurrency: usize,
) -> io::Result<Vec<CheckReport>>
where
    F: ClientFactory,
{
    let pairs: Vec<SessionArtifactPair> = store.discover()?.collect();

    let reports = stream::iter(pairs)
        .map(|pair| check_one(factory, settings, pair))
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    Ok(reports)
}

async fn check_one<F>(
    factory: &F,
    settings: &AuthSettings,
    pair: SessionArtifactPair,
) -> CheckReport
where
    F: ClientFactory,
{
    let metadata = pair.account_metadata(true);
    let classification =
        match SessionAuthenticator::open(factory, metadata, Some(&pair.session_path), settings) {
            Ok(mut auth) => {
                let outcome = auth.check().await;
                if outcome.is_authorized() {
                    // The runner owns the live client of an authorized
                    // account; close it before reporting.
                    auth.disconnect().await;
                }
                outcome.classification()
            }
            Err(err) => err.to_string(),
        };

    tracing::info!(
        target: "tgaudit::check",
        session = %pair.session_path.display(),
        classification = %classification,
    );

    CheckReport {
        session_path: pair.session_path,
        metadata_path: pair.metadata_path,
        classification,
    }
}
