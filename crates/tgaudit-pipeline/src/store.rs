//! Session pair discovery.
//!
//! A session artifact (`<id>.session`) is only useful together with its
//! metadata sidecar (`<id>.json`). Discovery pairs the two, quarantines
//! malformed candidates into an in-memory error set, and never lets one
//! broken record abort a scan.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};

use tgaudit_core::{config::DirsConfig, AccountMetadata};

const SESSION_EXT: &str = "session";
const METADATA_EXT: &str = "json";

/// One discovered account: session artifact plus parsed metadata record.
#[derive(Debug, Clone)]
pub struct SessionArtifactPair {
    pub session_path: PathBuf,
    pub metadata_path: PathBuf,
    pub metadata: Map<String, Value>,
}

impl SessionArtifactPair {
    /// Wrap the record in the typed accessor layer.
    pub fn account_metadata(&self, strict: bool) -> AccountMetadata {
        AccountMetadata::new(self.metadata.clone(), strict)
    }
}

/// Enumerates session/metadata pairs under a base directory.
///
/// The error set lives for the lifetime of the store and deduplicates by
/// metadata path, so repeated scans of the same broken directory record
/// each bad file once.
pub struct SessionStore {
    base_dir: PathBuf,
    errors_dir: PathBuf,
    banned_dir: PathBuf,
    errors: Mutex<BTreeSet<PathBuf>>,
}

impl SessionStore {
    /// Open a store, provisioning the three working directories.
    ///
    /// Creation is idempotent. The errors and banned directories are only
    /// provisioned here; moving files into them is the operator's job.
    pub fn open(
        base_dir: impl Into<PathBuf>,
        errors_dir: impl Into<PathBuf>,
        banned_dir: impl Into<PathBuf>,
    ) -> io::Result<Self> {
        let base_dir = base_dir.into();
        let errors_dir = errors_dir.into();
        let banned_dir = banned_dir.into();

        fs::create_dir_all(&base_dir)?;
        fs::create_dir_all(&errors_dir)?;
        fs::create_dir_all(&banned_dir)?;

        Ok(Self {
            base_dir,
            errors_dir,
            banned_dir,
            errors: Mutex::new(BTreeSet::new()),
        })
    }

    /// Open a store at the configured directories.
    pub fn from_dirs(dirs: &DirsConfig) -> io::Result<Self> {
        Self::open(&dirs.base, &dirs.errors, &dirs.banned)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn errors_dir(&self) -> &Path {
        &self.errors_dir
    }

    pub fn banned_dir(&self) -> &Path {
        &self.banned_dir
    }

    /// Lazily enumerate valid pairs, scanning the directory fresh.
    ///
    /// Enumeration order is whatever the filesystem yields; consumers must
    /// not rely on it. Candidates with missing or malformed metadata are
    /// recorded in the error set and skipped.
    pub fn discover(&self) -> io::Result<Discover<'_>> {
        Ok(Discover {
            entries: fs::read_dir(&self.base_dir)?,
            store: self,
        })
    }

    /// Snapshot of metadata paths that failed to load, sorted.
    pub fn json_errors(&self) -> Vec<PathBuf> {
        self.errors.lock().iter().cloned().collect()
    }

    fn record_error(&self, metadata_path: PathBuf) {
        tracing::debug!(
            target: "tgaudit::store",
            path = %metadata_path.display(),
            "metadata missing or malformed, skipping candidate"
        );
        self.errors.lock().insert(metadata_path);
    }

    fn load_pair(&self, session_path: PathBuf) -> Option<SessionArtifactPair> {
        let metadata_path = session_path.with_extension(METADATA_EXT);
        if !metadata_path.is_file() {
            self.record_error(metadata_path);
            return None;
        }

        let text = match fs::read_to_string(&metadata_path) {
            Ok(text) => text,
            Err(_) => {
                self.record_error(metadata_path);
                return None;
            }
        };

        let metadata = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) if !map.is_empty() => map,
            _ => {
                self.record_error(metadata_path);
                return None;
            }
        };

        Some(SessionArtifactPair {
            session_path,
            metadata_path,
            metadata,
        })
    }
}

/// Lazy pair iterator returned by [`SessionStore::discover`].
pub struct Discover<'a> {
    entries: fs::ReadDir,
    store: &'a SessionStore,
}

impl Iterator for Discover<'_> {
    type Item = SessionArtifactPair;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(_) => continue,
            };
            let path = entry.path();
            if path.extension().and_then(OsStr::to_str) != Some(SESSION_EXT) {
                continue;
            }
            if !path.is_file() {
                continue;
            }
            if let Some(pair) = self.store.load_pair(path) {
                return Some(pair);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::open(
            dir.path().join("base"),
            dir.path().join("errors"),
            dir.path().join("banned"),
        )
        .unwrap()
    }

    fn seed(store: &SessionStore, name: &str, json: Option<&str>) {
        fs::write(store.base_dir().join(format!("{name}.session")), b"blob").unwrap();
        if let Some(json) = json {
            fs::write(store.base_dir().join(format!("{name}.json")), json).unwrap();
        }
    }

    #[test]
    fn test_open_provisions_directories() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.base_dir().is_dir());
        assert!(store.errors_dir().is_dir());
        assert!(store.banned_dir().is_dir());

        // Idempotent on re-open.
        assert!(store_in(&dir).base_dir().is_dir());
    }

    #[test]
    fn test_discover_yields_valid_pairs() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        seed(&store, "alice", Some(r#"{"api_id": 1}"#));
        seed(&store, "bob", Some(r#"{"api_id": 2}"#));
        fs::write(store.base_dir().join("notes.txt"), b"ignored").unwrap();

        let mut pairs: Vec<_> = store.discover().unwrap().collect();
        pairs.sort_by(|a, b| a.session_path.cmp(&b.session_path));

        assert_eq!(pairs.len(), 2);
        assert!(pairs[0].session_path.ends_with("alice.session"));
        assert!(pairs[0].metadata_path.ends_with("alice.json"));
        assert_eq!(pairs[1].metadata["api_id"], 2);
        assert!(store.json_errors().is_empty());
    }

    #[test]
    fn test_missing_metadata_is_recorded_and_skipped() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        seed(&store, "ghost", None);

        assert_eq!(store.discover().unwrap().count(), 0);
        let errors = store.json_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with("ghost.json"));
    }

    #[test]
    fn test_unparsable_metadata_is_recorded_once_across_scans() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        seed(&store, "broken", Some("{not json"));

        assert_eq!(store.discover().unwrap().count(), 0);
        assert_eq!(store.discover().unwrap().count(), 0);
        assert_eq!(store.json_errors().len(), 1);
    }

    #[test]
    fn test_empty_and_non_object_metadata_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        seed(&store, "empty", Some("{}"));
        seed(&store, "list", Some("[1, 2]"));

        assert_eq!(store.discover().unwrap().count(), 0);
        assert_eq!(store.json_errors().len(), 2);
    }

    #[test]
    fn test_discover_is_restartable_and_sees_new_files() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        seed(&store, "alice", Some(r#"{"api_id": 1}"#));
        assert_eq!(store.discover().unwrap().count(), 1);

        seed(&store, "bob", Some(r#"{"api_id": 2}"#));
        assert_eq!(store.discover().unwrap().count(), 2);
    }
}
