//! Per-account authentication checking.
//!
//! One authenticator owns one metadata record and one protocol client,
//! for the lifetime of one check. The outcome is an explicit variant, not
//! an error: failing to authorize is a normal result of the state
//! machine, and only construction-time field resolution may fail.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;

use tgaudit_client::{
    ClientConfig, ClientError, ClientFactory, ProtocolClient, ProxyConfig, SessionRef,
};
use tgaudit_core::{config::ClientTuning, AccountMetadata, MetadataError};

/// Result of one account check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Credentials are live; the connection was intentionally left open.
    Authorized,
    /// Not authorized, deactivated or banned - the service gives no way
    /// to tell a logged-out account from a banned one at this layer.
    Banned,
    /// The service was unreachable.
    ConnectionFailed,
    /// Anything else, carrying a short cause tag.
    Unexpected(String),
}

impl CheckOutcome {
    pub fn is_authorized(&self) -> bool {
        matches!(self, CheckOutcome::Authorized)
    }

    /// Stable classification string for batch reports.
    pub fn classification(&self) -> String {
        match self {
            CheckOutcome::Authorized => "OK".to_string(),
            CheckOutcome::Banned => "ERROR_AUTH:BAN_ERROR".to_string(),
            CheckOutcome::ConnectionFailed => "ERROR_AUTH:CONNECTION_ERROR".to_string(),
            CheckOutcome::Unexpected(cause) => format!("ERROR_AUTH:{cause}"),
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.classification())
    }
}

/// Construction-time failures. These propagate to the caller handling the
/// account; the check state machine itself never returns an error.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Client tuning shared by every account in a run.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub connection_retries: u32,
    pub request_retries: u32,
    pub timeout: Duration,
    pub debug: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self::from(&ClientTuning::default())
    }
}

impl From<&ClientTuning> for AuthSettings {
    fn from(tuning: &ClientTuning) -> Self {
        Self {
            connection_retries: tuning.connection_retries,
            request_retries: tuning.request_retries,
            timeout: Duration::from_secs(tuning.timeout_secs),
            debug: tuning.debug,
        }
    }
}

/// Resolve a [`ClientConfig`] from account metadata.
///
/// Field resolution honors the metadata's strict flag; with a strict
/// record every missing field surfaces as its classification tag. When
/// `session_file` is given the client is file-backed, otherwise the
/// record must carry a portable session string.
pub fn client_config(
    metadata: &AccountMetadata,
    session_file: Option<&Path>,
    settings: &AuthSettings,
) -> Result<ClientConfig, AuthError> {
    // Fields resolve in constructor-argument order so a record missing
    // several of them always reports the same tag.
    let session = match session_file {
        Some(path) => SessionRef::File(path.to_path_buf()),
        None => SessionRef::Text(metadata.string_session()?),
    };
    let api_id = metadata.app_id()?;
    let api_hash = metadata.app_hash()?;
    let device_model = metadata.device_model()?;
    let system_version = metadata.system_version()?;
    let app_version = metadata.app_version()?;

    // Proxy stays optional at construction even for strict records: the
    // migration run stamps one in, but a bare record is still checkable.
    // A proxy that is present but unreadable is another matter.
    let lax = AccountMetadata::new(metadata.record().clone(), false);
    let proxy = match lax.proxy().unwrap_or(None) {
        Some(value) => {
            Some(ProxyConfig::from_value(&value).map_err(|_| MetadataError::Proxy)?)
        }
        None => None,
    };

    let config = ClientConfig {
        session,
        api_id,
        api_hash,
        device_model,
        system_version,
        app_version,
        lang_code: metadata.lang_pack(),
        system_lang_code: metadata.system_lang_code(),
        connection_retries: settings.connection_retries,
        request_retries: settings.request_retries,
        proxy,
        timeout: settings.timeout,
    };
    config.validate()?;
    Ok(config)
}

/// Owns one client for one account check.
pub struct SessionAuthenticator<C: ProtocolClient> {
    metadata: AccountMetadata,
    client: C,
    debug: bool,
}

impl<C: ProtocolClient> SessionAuthenticator<C> {
    /// Build an authenticator around an already-constructed client.
    pub fn new(metadata: AccountMetadata, client: C, debug: bool) -> Self {
        Self {
            metadata,
            client,
            debug,
        }
    }

    /// Resolve the client config from `metadata` and open a client.
    ///
    /// A missing required field fails here, before any network work, and
    /// must be handled per account by the caller.
    pub fn open<F>(
        factory: &F,
        metadata: AccountMetadata,
        session_file: Option<&Path>,
        settings: &AuthSettings,
    ) -> Result<Self, AuthError>
    where
        F: ClientFactory<Client = C>,
    {
        let config = client_config(&metadata, session_file, settings)?;
        let client = factory.open(config)?;
        Ok(Self::new(metadata, client, settings.debug))
    }

    pub fn metadata(&self) -> &AccountMetadata {
        &self.metadata
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Hand the live client to the caller, e.g. after an authorized check.
    pub fn into_client(self) -> C {
        self.client
    }

    /// Run the connect / authorize state machine once.
    ///
    /// Every exit path tears the connection down except `Authorized`,
    /// which deliberately leaves it open - the caller owns the live
    /// client from that point.
    pub async fn check(&mut self) -> CheckOutcome {
        if let Err(err) = self.client.connect().await {
            let outcome = self.classify(err);
            self.disconnect().await;
            return outcome;
        }

        match self.client.is_authorized().await {
            Ok(true) => CheckOutcome::Authorized,
            Ok(false) => {
                self.disconnect().await;
                CheckOutcome::Banned
            }
            Err(err) => {
                let outcome = self.classify(err);
                self.disconnect().await;
                outcome
            }
        }
    }

    /// Best-effort teardown. Failures here are cleanup noise and must
    /// never replace the check's classification; they are swallowed and
    /// at most logged as auxiliary diagnostics.
    pub async fn disconnect(&mut self) {
        if let Err(err) = self.client.disconnect().await {
            tracing::debug!(
                target: "tgaudit::auth",
                error = %err,
                "ignoring teardown failure"
            );
        }
    }

    /// Scoped use: run the check, hand the body the live authenticator
    /// only when authorized, and always disconnect on the way out - even
    /// if the body already disconnected on its own.
    pub async fn with_session<T>(
        mut self,
        body: impl for<'a> FnOnce(&'a mut SessionAuthenticator<C>) -> BoxFuture<'a, T> + Send,
    ) -> (CheckOutcome, Option<T>) {
        let outcome = self.check().await;
        if !outcome.is_authorized() {
            return (outcome, None);
        }
        let value = body(&mut self).await;
        self.disconnect().await;
        (outcome, Some(value))
    }

    fn classify(&self, err: ClientError) -> CheckOutcome {
        match err {
            ClientError::Connection { .. } => CheckOutcome::ConnectionFailed,
            ClientError::Deactivated => CheckOutcome::Banned,
            other => {
                if self.debug {
                    tracing::debug!(
                        target: "tgaudit::auth",
                        error = ?other,
                        "unexpected failure during check"
                    );
                }
                CheckOutcome::Unexpected(other.cause_tag())
            }
        }
    }
}
