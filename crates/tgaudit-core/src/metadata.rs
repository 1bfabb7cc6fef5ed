//! Typed accessor layer over an account metadata record.
//!
//! Metadata records are loose JSON objects produced by several generations
//! of account tooling, so most logical fields can live under more than one
//! key. Every accessor resolves its fallback chain explicitly, on every
//! call, straight from the underlying record - there is no caching, so a
//! `set` is observable immediately.

use serde_json::{Map, Value};

use crate::error::MetadataError;

/// Typed, validating view over one account's metadata record.
///
/// The `strict` flag is fixed at construction: with `strict` set, a missing
/// required field fails with its classification tag; without it, the
/// accessor degrades to the documented default and never fails. The
/// authenticate and migrate pipelines use opposite settings for some
/// fields, which is why this is a constructor argument and not per-call.
#[derive(Debug, Clone)]
pub struct AccountMetadata {
    record: Map<String, Value>,
    strict: bool,
}

impl AccountMetadata {
    pub fn new(record: Map<String, Value>, strict: bool) -> Self {
        Self { record, strict }
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    /// The underlying record, as currently stored.
    pub fn record(&self) -> &Map<String, Value> {
        &self.record
    }

    pub fn into_record(self) -> Map<String, Value> {
        self.record
    }

    /// Update or insert a field. No validation happens at write time.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.record.insert(key.into(), value);
    }

    /// Session file reference, when the account is file-backed.
    pub fn session_file(&self) -> Result<String, MetadataError> {
        self.required_str(&["session_file"], MetadataError::SessionFile)
    }

    /// Portable string-session text, when the account was migrated.
    pub fn string_session(&self) -> Result<String, MetadataError> {
        self.required_str(&["string_session"], MetadataError::StringSession)
    }

    /// Api id. Older records store it under `app_id`, sometimes as a
    /// string; zero counts as missing.
    pub fn app_id(&self) -> Result<i64, MetadataError> {
        for key in ["api_id", "app_id"] {
            if let Some(id) = self.record.get(key).and_then(int_value) {
                if id != 0 {
                    return Ok(id);
                }
            }
        }
        if self.strict {
            Err(MetadataError::AppId)
        } else {
            Ok(0)
        }
    }

    /// Api hash.
    pub fn app_hash(&self) -> Result<String, MetadataError> {
        self.required_str(&["api_hash", "app_hash"], MetadataError::AppHash)
    }

    /// Device model.
    pub fn device_model(&self) -> Result<String, MetadataError> {
        self.required_str(&["device_model", "device"], MetadataError::Device)
    }

    /// System version.
    pub fn system_version(&self) -> Result<String, MetadataError> {
        self.required_str(&["system_version", "sdk"], MetadataError::Sdk)
    }

    /// App version.
    pub fn app_version(&self) -> Result<String, MetadataError> {
        self.required_str(&["app_version"], MetadataError::AppVersion)
    }

    /// Language pack code. Never required.
    pub fn lang_pack(&self) -> String {
        self.str_field(&["lang_code", "lang_pack"])
            .unwrap_or_else(|| "en".to_string())
    }

    /// System language code. Never required.
    pub fn system_lang_code(&self) -> String {
        self.str_field(&["system_lang_code", "system_lang_pack"])
            .unwrap_or_else(|| "en-us".to_string())
    }

    /// Two-factor secret, if the account has one on record.
    pub fn two_factor(&self) -> Option<String> {
        self.str_field(&["password", "twoFA", "twostep"])
    }

    /// Proxy configuration as stored. `None` means "no proxy on record",
    /// which is only acceptable outside strict mode.
    pub fn proxy(&self) -> Result<Option<Value>, MetadataError> {
        match self.record.get("proxy") {
            Some(value) if !is_empty_value(value) => Ok(Some(value.clone())),
            _ if self.strict => Err(MetadataError::Proxy),
            _ => Ok(None),
        }
    }

    fn required_str(&self, keys: &[&str], err: MetadataError) -> Result<String, MetadataError> {
        match self.str_field(keys) {
            Some(value) => Ok(value),
            None if self.strict => Err(err),
            None => Ok(String::new()),
        }
    }

    fn str_field(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| {
            self.record
                .get(*key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    }
}

/// Integers arrive either as JSON numbers or as numeric strings.
fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Empty-ish values count as absent, matching how upstream tooling writes
/// placeholder fields.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn full_record() -> Map<String, Value> {
        record(json!({
            "api_id": 123,
            "api_hash": "h",
            "device_model": "PC",
            "system_version": "1",
            "app_version": "1.0",
        }))
    }

    #[test]
    fn test_client_fields_resolve_from_primary_keys() {
        let meta = AccountMetadata::new(full_record(), true);
        assert_eq!(meta.app_id().unwrap(), 123);
        assert_eq!(meta.app_hash().unwrap(), "h");
        assert_eq!(meta.device_model().unwrap(), "PC");
        assert_eq!(meta.system_version().unwrap(), "1");
        assert_eq!(meta.app_version().unwrap(), "1.0");
    }

    #[test]
    fn test_fallback_keys_resolve() {
        let meta = AccountMetadata::new(
            record(json!({
                "app_id": "456",
                "app_hash": "hh",
                "device": "Laptop",
                "sdk": "11",
                "app_version": "2.0",
            })),
            true,
        );
        assert_eq!(meta.app_id().unwrap(), 456);
        assert_eq!(meta.app_hash().unwrap(), "hh");
        assert_eq!(meta.device_model().unwrap(), "Laptop");
        assert_eq!(meta.system_version().unwrap(), "11");
    }

    #[test]
    fn test_primary_key_wins_over_fallback() {
        let meta = AccountMetadata::new(
            record(json!({"api_id": 1, "app_id": 2, "lang_code": "de", "lang_pack": "en"})),
            false,
        );
        assert_eq!(meta.app_id().unwrap(), 1);
        assert_eq!(meta.lang_pack(), "de");
    }

    #[test]
    fn test_missing_app_id_is_classified() {
        let mut rec = full_record();
        rec.remove("api_id");
        let meta = AccountMetadata::new(rec, true);
        assert_eq!(meta.app_id(), Err(MetadataError::AppId));
    }

    #[test]
    fn test_zero_app_id_counts_as_missing() {
        let meta = AccountMetadata::new(record(json!({"api_id": 0})), true);
        assert_eq!(meta.app_id(), Err(MetadataError::AppId));
    }

    #[test]
    fn test_each_required_field_has_its_own_tag() {
        let meta = AccountMetadata::new(Map::new(), true);
        assert_eq!(meta.session_file(), Err(MetadataError::SessionFile));
        assert_eq!(meta.string_session(), Err(MetadataError::StringSession));
        assert_eq!(meta.app_id(), Err(MetadataError::AppId));
        assert_eq!(meta.app_hash(), Err(MetadataError::AppHash));
        assert_eq!(meta.device_model(), Err(MetadataError::Device));
        assert_eq!(meta.system_version(), Err(MetadataError::Sdk));
        assert_eq!(meta.app_version(), Err(MetadataError::AppVersion));
        assert_eq!(meta.proxy(), Err(MetadataError::Proxy));
    }

    #[test]
    fn test_lax_mode_degrades_to_defaults() {
        let meta = AccountMetadata::new(Map::new(), false);
        assert!(!meta.strict());
        assert_eq!(meta.session_file().unwrap(), "");
        assert_eq!(meta.string_session().unwrap(), "");
        assert_eq!(meta.app_id().unwrap(), 0);
        assert_eq!(meta.app_hash().unwrap(), "");
        assert_eq!(meta.device_model().unwrap(), "");
        assert_eq!(meta.proxy().unwrap(), None);
    }

    #[test]
    fn test_optional_fields_never_fail() {
        let meta = AccountMetadata::new(Map::new(), true);
        assert_eq!(meta.lang_pack(), "en");
        assert_eq!(meta.system_lang_code(), "en-us");
        assert_eq!(meta.two_factor(), None);
    }

    #[test]
    fn test_two_factor_fallback_chain() {
        let meta = AccountMetadata::new(record(json!({"twoFA": "secret"})), true);
        assert_eq!(meta.two_factor().as_deref(), Some("secret"));
        let meta = AccountMetadata::new(record(json!({"twostep": "s2"})), true);
        assert_eq!(meta.two_factor().as_deref(), Some("s2"));
    }

    #[test]
    fn test_empty_proxy_object_counts_as_missing() {
        let meta = AccountMetadata::new(record(json!({"proxy": {}})), true);
        assert_eq!(meta.proxy(), Err(MetadataError::Proxy));
    }

    #[test]
    fn test_set_is_visible_immediately() {
        let mut meta = AccountMetadata::new(Map::new(), true);
        assert!(meta.string_session().is_err());
        meta.set("string_session", json!("1AAbb"));
        assert_eq!(meta.string_session().unwrap(), "1AAbb");
    }
}
