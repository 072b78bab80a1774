//! Rule document schema.
//!
//! Key components:
//! - `LinterConfig`: versioned root holding `metadata` and ordered `rules`.
//! - `LintRule`: one declarative rule with localized texts and `checks`.
//! - `CheckSpec`: checks tagged by `type` (`must_include_any`,
//!   `placeholder_consistency`, `max_length`). Anything else, or a known type
//!   with parameters that do not fit, becomes `Unsupported` and passes.
//! - `LocalizedText`: locale -> text map that keeps document order, which the
//!   "first available entry" fallback depends on.

use crate::models::Severity;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// Root rule document.
pub struct LinterConfig {
    pub version: String,
    #[serde(default)]
    pub metadata: ConfigMetadata,
    #[serde(default)]
    pub rules: Vec<LintRule>,
}

impl LinterConfig {
    /// Whether a result stored under `stored_version` was produced by this
    /// rule set. Versions are opaque; only equality is meaningful.
    pub fn is_current(&self, stored_version: &str) -> bool {
        self.version == stored_version
    }

    pub fn rule(&self, code: &str) -> Option<&LintRule> {
        self.rules.iter().find(|r| r.code == code)
    }

    /// Resolve a category's display label for `locale`.
    pub fn category_label(&self, category: &str, locale: &str) -> Option<&str> {
        self.metadata
            .categories
            .get(category)
            .and_then(|t| t.resolve(locale, &self.metadata.fallback_locale))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMetadata {
    #[serde(default = "default_fallback_locale")]
    pub fallback_locale: String,
    #[serde(default = "default_severity_order")]
    pub severity_order: Vec<Severity>,
    /// Category id -> localized display label.
    #[serde(default)]
    pub categories: BTreeMap<String, LocalizedText>,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        Self {
            fallback_locale: default_fallback_locale(),
            severity_order: default_severity_order(),
            categories: BTreeMap::new(),
        }
    }
}

fn default_fallback_locale() -> String {
    "en".to_string()
}

fn default_severity_order() -> Vec<Severity> {
    Severity::ALL.to_vec()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A declarative rule. `checks` are combined with logical AND.
pub struct LintRule {
    pub code: String,
    #[serde(default)]
    pub category: String,
    pub severity: Severity,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub fix_hint: LocalizedText,
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub suppress_other_rules: Vec<String>,
}

impl LintRule {
    /// Rules carrying a suppression list run in the suppression pass and
    /// report when they *pass*.
    pub fn is_suppressor(&self) -> bool {
        !self.suppress_other_rules.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Locale -> text entries in document order.
pub struct LocalizedText(Vec<(String, String)>);

impl LocalizedText {
    pub fn from_pairs<L, T>(pairs: impl IntoIterator<Item = (L, T)>) -> Self
    where
        L: Into<String>,
        T: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(l, t)| (l.into(), t.into()))
                .collect(),
        )
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(l, t)| l == locale && !t.trim().is_empty())
            .map(|(_, t)| t.as_str())
    }

    /// Fallback chain: requested locale, then `fallback`, then the first
    /// non-empty entry in document order.
    pub fn resolve(&self, locale: &str, fallback: &str) -> Option<&str> {
        self.get(locale)
            .or_else(|| self.get(fallback))
            .or_else(|| {
                self.0
                    .iter()
                    .map(|(_, t)| t.as_str())
                    .find(|t| !t.trim().is_empty())
            })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LocalizedVisitor;

        impl<'de> Visitor<'de> for LocalizedVisitor {
            type Value = LocalizedText;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of locale to text, or a plain string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(LocalizedText(vec![(String::new(), v.to_string())]))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((locale, text)) = map.next_entry::<String, String>()? {
                    entries.push((locale, text));
                }
                Ok(LocalizedText(entries))
            }
        }

        deserializer.deserialize_any(LocalizedVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Passes when at least `min_matches` patterns match.
pub struct MustIncludeAny {
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default = "default_min_matches")]
    pub min_matches: usize,
    /// Trimmed prompts shorter than this fail before any matching.
    #[serde(default)]
    pub min_length: Option<usize>,
}

fn default_min_matches() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// Passes when each placeholder is always spelled the same way.
pub struct PlaceholderConsistency {
    /// Placeholder patterns; the first capture group, when present, is the
    /// placeholder name. Empty means the built-in `{{}}`, `<<>>`, `[]` set.
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MaxLength {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
/// Check primitives supported by the engine.
pub enum CheckSpec {
    MustIncludeAny(MustIncludeAny),
    PlaceholderConsistency(PlaceholderConsistency),
    MaxLength(MaxLength),
    /// Unrecognized `type` or malformed parameters; always passes.
    Unsupported { kind: String },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum KnownCheck {
    MustIncludeAny(MustIncludeAny),
    PlaceholderConsistency(PlaceholderConsistency),
    MaxLength(MaxLength),
}

impl<'de> Deserialize<'de> for CheckSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Json::deserialize(deserializer)?;
        match KnownCheck::deserialize(&raw) {
            Ok(KnownCheck::MustIncludeAny(c)) => Ok(CheckSpec::MustIncludeAny(c)),
            Ok(KnownCheck::PlaceholderConsistency(c)) => Ok(CheckSpec::PlaceholderConsistency(c)),
            Ok(KnownCheck::MaxLength(c)) => Ok(CheckSpec::MaxLength(c)),
            Err(err) => {
                let kind = raw
                    .get("type")
                    .and_then(Json::as_str)
                    .unwrap_or("<missing>")
                    .to_string();
                warn!(check_type = %kind, error = %err, "unsupported check, it will always pass");
                Ok(CheckSpec::Unsupported { kind })
            }
        }
    }
}
