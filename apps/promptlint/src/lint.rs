//! Rule evaluation engine and batch runner.
//!
//! `RuleEngine` evaluates a `LinterConfig` in two passes:
//! 1. Suppression pass: rules with `suppressOtherRules` emit an issue when all
//!    their checks *pass*, and their listed codes are suppressed for this run.
//!    A passing suppression rule that another passing suppression rule lists
//!    is suppressed too, and its own list is ignored.
//! 2. Standard pass: every other rule, in document order, emits an issue when
//!    any check *fails*, unless suppressed.
//!
//! Messages, fix hints and category labels are resolved per locale with the
//! document's fallback locale. The summary is always recomputed from the issue
//! list.

use crate::checks;
use crate::error::{ConfigLoadError, PromptLintError};
use crate::locate;
use crate::models::rules::{CheckSpec, LintRule, LinterConfig};
use crate::models::{Fix, LintIssue, LintRange, LintSummary, LinterResponse, PromptReport};
use crate::sections::SectionLinter;
use crate::store::{self, RuleStore};
use crate::utils::text_stats;
use chrono::Utc;
use glob::glob;
use rayon::prelude::*;
use serde_json::{Map, Value as Json};
use std::collections::HashSet;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintOptions {
    /// Requested locale; the rule document's fallback locale when absent.
    pub locale: Option<String>,
}

impl LintOptions {
    pub fn with_locale(locale: impl Into<String>) -> Self {
        Self {
            locale: Some(locale.into()),
        }
    }
}

/// A linting strategy. Both strategies share the `LinterResponse` shape.
pub trait PromptLinter: Send + Sync {
    fn lint(&self, text: &str, options: &LintOptions) -> Result<LinterResponse, PromptLintError>;

    /// Locate the part of `text` that satisfies `key`, or `None` when nothing
    /// matches or the key is unknown.
    fn locate_section(&self, text: &str, key: &str) -> Option<LintRange>;

    /// Version string to persist alongside stored results.
    fn version(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Which strategy the caller selected.
pub enum LintMode {
    /// Rule document driven, with suppression and placeholder checks.
    #[default]
    Rules,
    /// Fixed six-section heuristic.
    Sections,
}

impl FromStr for LintMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" | "config" => Ok(LintMode::Rules),
            "sections" | "simple" => Ok(LintMode::Sections),
            other => Err(format!("unknown mode '{}' (expected rules|sections)", other)),
        }
    }
}

impl LintMode {
    /// Build the linter for this mode. Only `Rules` touches the store.
    pub fn linter(self, store: &RuleStore) -> Result<Box<dyn PromptLinter>, ConfigLoadError> {
        Ok(match self {
            LintMode::Rules => Box::new(RuleEngine::from_store(store)?),
            LintMode::Sections => Box::new(SectionLinter::new()),
        })
    }
}

/// Config-driven strategy over a loaded rule document.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    config: Arc<LinterConfig>,
}

impl RuleEngine {
    pub fn new(config: Arc<LinterConfig>) -> Self {
        Self { config }
    }

    pub fn from_store(store: &RuleStore) -> Result<Self, ConfigLoadError> {
        Ok(Self::new(store.load()?))
    }

    pub fn config(&self) -> &LinterConfig {
        &self.config
    }

    /// Full evaluation including timestamp and text statistics.
    pub fn evaluate(&self, text: &str, options: &LintOptions) -> LinterResponse {
        let locale = options
            .locale
            .as_deref()
            .unwrap_or(&self.config.metadata.fallback_locale);
        let issues = self.issues(text, locale);
        LinterResponse {
            summary: LintSummary::from_issues(&issues),
            issues,
            generated_at: Utc::now(),
            config_version: self.config.version.clone(),
            stats: text_stats(text),
            sections: None,
        }
    }

    /// Deterministic issue list for `text` in `locale`.
    pub fn issues(&self, text: &str, locale: &str) -> Vec<LintIssue> {
        let mut issues = Vec::new();

        let passing: Vec<&LintRule> = self
            .config
            .rules
            .iter()
            .filter(|r| r.is_suppressor())
            .filter(|r| r.checks.iter().all(|c| checks::evaluate(c, text)))
            .collect();
        // A passing suppressor listed by another passing suppressor is itself
        // suppressed: it emits nothing and its own list does not apply.
        let targeted: HashSet<&str> = passing
            .iter()
            .flat_map(|r| r.suppress_other_rules.iter().map(String::as_str))
            .collect();
        let mut suppressed: HashSet<&str> = HashSet::new();
        for rule in passing {
            if targeted.contains(rule.code.as_str()) {
                debug!(code = %rule.code, "suppression rule suppressed");
                continue;
            }
            debug!(
                code = %rule.code,
                suppressed = ?rule.suppress_other_rules,
                "suppression rule matched"
            );
            let span = rule.checks.iter().find_map(|c| checks::match_span(c, text));
            issues.push(self.build_issue(rule, locale, span, text));
            suppressed.extend(rule.suppress_other_rules.iter().map(String::as_str));
        }

        for rule in self.config.rules.iter().filter(|r| !r.is_suppressor()) {
            if suppressed.contains(rule.code.as_str()) {
                debug!(code = %rule.code, "rule suppressed");
                continue;
            }
            if let Some(failed) = rule.checks.iter().find(|c| !checks::evaluate(c, text)) {
                let span = checks::failure_span(failed, text);
                issues.push(self.build_issue(rule, locale, span, text));
            }
        }
        issues
    }

    fn build_issue(
        &self,
        rule: &LintRule,
        locale: &str,
        span: Option<Range<usize>>,
        text: &str,
    ) -> LintIssue {
        let fallback = self.config.metadata.fallback_locale.as_str();
        let title = rule.title.resolve(locale, fallback);
        let description = rule.description.resolve(locale, fallback);
        let message = match (title, description) {
            (Some(t), Some(d)) => format!("{}: {}", t, d),
            (Some(only), None) | (None, Some(only)) => only.to_string(),
            (None, None) => rule.code.clone(),
        };
        let fix = rule
            .fix_hint
            .resolve(locale, fallback)
            .map(|hint| Fix {
                hint: hint.to_string(),
            });

        let mut metadata = Map::new();
        metadata.insert("category".into(), Json::String(rule.category.clone()));
        metadata.insert("target".into(), Json::String(rule.target.clone()));
        if let Some(label) = self.config.category_label(&rule.category, locale) {
            metadata.insert("categoryLabel".into(), Json::String(label.to_string()));
        }

        LintIssue {
            code: rule.code.clone(),
            severity: rule.severity,
            message,
            range: span.map(|s| locate::range_for_bytes(text, s)),
            fix,
            tags: rule.tags.clone(),
            metadata,
        }
    }
}

impl PromptLinter for RuleEngine {
    fn lint(&self, text: &str, options: &LintOptions) -> Result<LinterResponse, PromptLintError> {
        Ok(self.evaluate(text, options))
    }

    /// `key` is a rule code; the location is the first pattern hit among the
    /// rule's presence checks.
    fn locate_section(&self, text: &str, key: &str) -> Option<LintRange> {
        let rule = self.config.rule(key)?;
        rule.checks
            .iter()
            .filter(|c| matches!(c, CheckSpec::MustIncludeAny(_)))
            .find_map(|c| checks::match_span(c, text))
            .map(|span| locate::range_for_bytes(text, span))
    }

    fn version(&self) -> &str {
        &self.config.version
    }
}

/// Lint `text` against the process-wide rule document.
pub fn lint_prompt(text: &str, options: &LintOptions) -> Result<LinterResponse, PromptLintError> {
    let engine = RuleEngine::new(store::load()?);
    engine.lint(text, options)
}

/// Version of the process-wide rule document.
pub fn config_version() -> Result<String, ConfigLoadError> {
    Ok(store::load()?.version.clone())
}

/// Expand glob patterns relative to `root` into existing files, sorted and
/// deduplicated.
pub fn collect_targets(root: &Path, patterns: &[String]) -> (Vec<PathBuf>, Vec<String>) {
    let mut targets: Vec<PathBuf> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    for pat in patterns {
        let abs = if Path::new(pat).is_absolute() {
            PathBuf::from(pat)
        } else {
            root.join(pat)
        };
        let pattern = abs.to_string_lossy().to_string();
        match glob(&pattern) {
            Ok(paths) => {
                let before = targets.len();
                targets.extend(paths.flatten().filter(|p| p.is_file()));
                if targets.len() == before {
                    errors.push(format!("no prompt files matched '{}'", pat));
                }
            }
            Err(e) => errors.push(format!("invalid pattern '{}': {}", pat, e)),
        }
    }
    targets.sort();
    targets.dedup();
    (targets, errors)
}

/// Lint prompt files in parallel.
///
/// Unreadable files are reported in the error list instead of aborting the
/// batch. Reports are ordered by file path.
pub fn lint_files(
    linter: &dyn PromptLinter,
    paths: &[PathBuf],
    options: &LintOptions,
) -> (Vec<PromptReport>, Vec<String>) {
    let outcomes: Vec<Result<PromptReport, String>> = paths
        .par_iter()
        .map(|path| {
            let file = path.to_string_lossy().to_string();
            let text = fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {}", file, e))?;
            let response = linter
                .lint(&text, options)
                .map_err(|e| format!("failed to lint {}: {}", file, e))?;
            Ok(PromptReport { file, response })
        })
        .collect();

    let mut reports = Vec::new();
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(r) => reports.push(r),
            Err(e) => errors.push(e),
        }
    }
    reports.sort_by(|a, b| a.file.cmp(&b.file));
    (reports, errors)
}
