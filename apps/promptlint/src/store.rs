//! Rule configuration store.
//!
//! A `RuleStore` reads its rule document once, caches the parsed
//! `LinterConfig` behind a mutex, and hands out shared `Arc`s. The first
//! caller to `load` populates the cache while holding the lock, so racing
//! first calls parse the document exactly once. `reset_cache` drops the cached
//! value; the next `load` re-reads the source.
//!
//! The process-wide default store is backed by the rule document embedded in
//! the binary.

use crate::error::ConfigLoadError;
use crate::models::rules::{CheckSpec, LinterConfig};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

/// Rule document shipped with the crate.
pub const EMBEDDED_RULES: &str = include_str!("../rules/prompt-lint.v1.json");

static DEFAULT_STORE: LazyLock<RuleStore> = LazyLock::new(RuleStore::embedded);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Where a store reads its rule document from.
pub enum RuleSource {
    Embedded(&'static str),
    File(PathBuf),
    Inline(String),
}

impl RuleSource {
    fn origin(&self) -> String {
        match self {
            RuleSource::Embedded(_) => "<embedded>".to_string(),
            RuleSource::File(p) => p.to_string_lossy().to_string(),
            RuleSource::Inline(_) => "<inline>".to_string(),
        }
    }

    fn read(&self) -> Result<LinterConfig, ConfigLoadError> {
        let origin = self.origin();
        match self {
            RuleSource::Embedded(s) => parse_config(s, &origin),
            RuleSource::Inline(s) => parse_config(s, &origin),
            RuleSource::File(path) => {
                let data = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                parse_config(&data, &origin)
            }
        }
    }
}

/// Lazily loaded, resettable cache of one rule document.
#[derive(Debug)]
pub struct RuleStore {
    source: RuleSource,
    cached: Mutex<Option<Arc<LinterConfig>>>,
}

impl RuleStore {
    pub fn new(source: RuleSource) -> Self {
        Self {
            source,
            cached: Mutex::new(None),
        }
    }

    pub fn embedded() -> Self {
        Self::new(RuleSource::Embedded(EMBEDDED_RULES))
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(RuleSource::File(path.into()))
    }

    pub fn source(&self) -> &RuleSource {
        &self.source
    }

    /// Return the cached rule document, reading it on first use.
    ///
    /// A failed read is not cached; the next call tries again.
    pub fn load(&self) -> Result<Arc<LinterConfig>, ConfigLoadError> {
        let mut slot = self.cached.lock();
        if let Some(cfg) = slot.as_ref() {
            return Ok(Arc::clone(cfg));
        }
        let cfg = Arc::new(self.source.read()?);
        debug!(
            origin = %self.source.origin(),
            version = %cfg.version,
            rules = cfg.rules.len(),
            "loaded rule document"
        );
        *slot = Some(Arc::clone(&cfg));
        Ok(cfg)
    }

    pub fn reset_cache(&self) {
        if self.cached.lock().take().is_some() {
            info!(origin = %self.source.origin(), "rule cache cleared");
        }
    }
}

/// The process-wide store backed by the embedded rule document.
pub fn default_store() -> &'static RuleStore {
    &DEFAULT_STORE
}

/// Load the default rule document (cached after the first call).
pub fn load() -> Result<Arc<LinterConfig>, ConfigLoadError> {
    default_store().load()
}

/// Clear the default store's cache.
pub fn reset_cache() {
    default_store().reset_cache()
}

/// Parse and validate a rule document.
pub fn parse_config(data: &str, origin: &str) -> Result<LinterConfig, ConfigLoadError> {
    let cfg: LinterConfig =
        serde_json::from_str(data).map_err(|source| ConfigLoadError::Parse {
            origin: origin.to_string(),
            source,
        })?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &LinterConfig) -> Result<(), ConfigLoadError> {
    if cfg.version.trim().is_empty() {
        return Err(ConfigLoadError::invalid("`version` must not be empty"));
    }
    if cfg.metadata.fallback_locale.trim().is_empty() {
        return Err(ConfigLoadError::invalid(
            "`metadata.fallbackLocale` must not be empty",
        ));
    }
    let mut codes: HashSet<&str> = HashSet::new();
    for rule in &cfg.rules {
        if rule.code.trim().is_empty() {
            return Err(ConfigLoadError::invalid("rule with empty `code`"));
        }
        if !codes.insert(rule.code.as_str()) {
            return Err(ConfigLoadError::invalid(format!(
                "duplicate rule code '{}'",
                rule.code
            )));
        }
    }
    for rule in &cfg.rules {
        for target in &rule.suppress_other_rules {
            if !codes.contains(target.as_str()) {
                return Err(ConfigLoadError::invalid(format!(
                    "rule '{}' suppresses unknown rule '{}'",
                    rule.code, target
                )));
            }
        }
        let unsupported = rule
            .checks
            .iter()
            .filter(|c| matches!(c, CheckSpec::Unsupported { .. }))
            .count();
        if unsupported > 0 {
            debug!(code = %rule.code, unsupported, "rule has checks that always pass");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOC: &str = r#"{
        "version": "test-1",
        "metadata": {"fallbackLocale": "en"},
        "rules": [
            {"code": "A", "severity": "error", "checks": [{"type": "max_length", "limit": 3}]},
            {"code": "B", "severity": "success", "suppressOtherRules": ["A"]}
        ]
    }"#;

    #[test]
    fn test_embedded_document_is_valid() {
        let cfg = parse_config(EMBEDDED_RULES, "<embedded>").unwrap();
        assert!(!cfg.version.is_empty());
        assert!(cfg.rule("PROMPT_ROLE_MISSING").is_some());
        assert!(cfg.rules.iter().any(|r| r.is_suppressor()));
    }

    #[test]
    fn test_load_is_cached_until_reset() {
        let store = RuleStore::new(RuleSource::Inline(DOC.to_string()));
        let first = store.load().unwrap();
        let second = store.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        store.reset_cache();
        let third = store.load().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
    }

    #[test]
    fn test_file_source_rereads_after_reset() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", DOC).unwrap();
        let store = RuleStore::from_path(file.path());
        assert_eq!(store.load().unwrap().version, "test-1");

        let updated = DOC.replace("test-1", "test-2");
        std::fs::write(file.path(), updated).unwrap();
        // Still cached.
        assert_eq!(store.load().unwrap().version, "test-1");
        store.reset_cache();
        assert_eq!(store.load().unwrap().version, "test-2");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let store = RuleStore::from_path("/definitely/not/here/rules.json");
        assert!(matches!(store.load(), Err(ConfigLoadError::Io { .. })));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let store = RuleStore::new(RuleSource::Inline("{ not json".into()));
        assert!(matches!(store.load(), Err(ConfigLoadError::Parse { .. })));
        let store = RuleStore::new(RuleSource::Inline(r#"{"rules": []}"#.into()));
        assert!(matches!(store.load(), Err(ConfigLoadError::Parse { .. })));
    }

    #[test]
    fn test_validation_rejects_duplicates_and_dangling_suppression() {
        let dup = r#"{"version": "1", "rules": [
            {"code": "A", "severity": "info"}, {"code": "A", "severity": "info"}]}"#;
        assert!(matches!(
            parse_config(dup, "t"),
            Err(ConfigLoadError::Invalid(_))
        ));
        let dangling = r#"{"version": "1", "rules": [
            {"code": "A", "severity": "info", "suppressOtherRules": ["Z"]}]}"#;
        assert!(matches!(
            parse_config(dangling, "t"),
            Err(ConfigLoadError::Invalid(_))
        ));
        let blank = r#"{"version": " ", "rules": []}"#;
        assert!(matches!(
            parse_config(blank, "t"),
            Err(ConfigLoadError::Invalid(_))
        ));
    }

    #[test]
    fn test_concurrent_first_load_shares_one_value() {
        let store = Arc::new(RuleStore::new(RuleSource::Inline(DOC.to_string())));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.load().unwrap())
            })
            .collect();
        let loaded: Vec<Arc<LinterConfig>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(loaded.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
