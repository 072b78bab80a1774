//! Shared data models for lint outputs and the rule document schema.

pub mod rules;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Importance of a lint issue.
pub enum Severity {
    Error,
    Warning,
    Info,
    Success,
}

impl Severity {
    /// Canonical ordering used when a rule document does not declare one.
    pub const ALL: [Severity; 4] = [
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Success,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Success => "success",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            "success" => Ok(Severity::Success),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// A point in prompt text: 1-based line and column, 0-based offset.
///
/// Offsets and columns count `char`s, not bytes.
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Highlightable span of prompt text.
pub struct LintRange {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    pub hint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One triggered rule in a single evaluation.
pub struct LintIssue {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<LintRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form data echoed from the rule (`category`, `target`, ...).
    #[serde(default)]
    pub metadata: Map<String, Json>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Per-severity counts derived from an issue list.
pub struct LintSummary {
    pub total_issues: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub successes: usize,
}

impl LintSummary {
    /// Fold issues into severity buckets. The only way a summary is built.
    pub fn from_issues(issues: &[LintIssue]) -> Self {
        let mut summary = LintSummary::default();
        for issue in issues {
            match issue.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
                Severity::Success => summary.successes += 1,
            }
        }
        summary.total_issues = issues.len();
        summary
    }

    /// Merge another summary into this one (used for multi-file runs).
    pub fn absorb(&mut self, other: &LintSummary) {
        self.total_issues += other.total_issues;
        self.errors += other.errors;
        self.warnings += other.warnings;
        self.infos += other.infos;
        self.successes += other.successes;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Basic size statistics of a prompt.
pub struct TextStats {
    pub lines: usize,
    pub words: usize,
    pub chars: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Which of the six structural sections were detected.
pub struct SectionCoverage {
    pub role: bool,
    pub task: bool,
    pub constraints: bool,
    pub output_format: bool,
    pub variables: bool,
    pub guardrails: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Result of linting one prompt.
pub struct LinterResponse {
    pub issues: Vec<LintIssue>,
    pub summary: LintSummary,
    #[serde(serialize_with = "serialize_millis")]
    pub generated_at: DateTime<Utc>,
    /// Version of the rule set that produced `issues`; persist it to detect
    /// stale stored results.
    pub config_version: String,
    pub stats: TextStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<SectionCoverage>,
}

/// RFC 3339 in UTC with millisecond precision, e.g. `2024-06-01T12:00:00.123Z`.
fn serialize_millis<S: serde::Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Clone, Serialize)]
/// A linted prompt file in a CLI batch run.
pub struct PromptReport {
    pub file: String,
    #[serde(flatten)]
    pub response: LinterResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(code: &str, severity: Severity) -> LintIssue {
        LintIssue {
            code: code.into(),
            severity,
            message: code.into(),
            range: None,
            fix: None,
            tags: vec![],
            metadata: Map::new(),
        }
    }

    #[test]
    fn test_summary_counts_every_bucket() {
        let issues = vec![
            issue("A", Severity::Error),
            issue("B", Severity::Error),
            issue("C", Severity::Warning),
            issue("D", Severity::Success),
        ];
        let s = LintSummary::from_issues(&issues);
        assert_eq!(s.total_issues, 4);
        assert_eq!(s.errors, 2);
        assert_eq!(s.warnings, 1);
        assert_eq!(s.infos, 0);
        assert_eq!(s.successes, 1);
        assert_eq!(s.errors + s.warnings + s.infos + s.successes, s.total_issues);
    }

    #[test]
    fn test_issue_json_omits_absent_range_and_fix() {
        let out = serde_json::to_value(issue("X", Severity::Info)).unwrap();
        assert!(out.get("range").is_none());
        assert!(out.get("fix").is_none());
        assert_eq!(out["severity"], "info");
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let out = serde_json::to_value(LintSummary::default()).unwrap();
        assert_eq!(out["totalIssues"], 0);
        assert_eq!(out["successes"], 0);
    }

    #[test]
    fn test_severity_parses_warn_alias() {
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_generated_at_serializes_with_millis_and_z() {
        use chrono::{Duration, TimeZone};
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + Duration::nanoseconds(123_456_789);
        let response = LinterResponse {
            issues: vec![],
            summary: LintSummary::default(),
            generated_at: ts,
            config_version: "v".into(),
            stats: TextStats::default(),
            sections: None,
        };
        let out = serde_json::to_value(&response).unwrap();
        assert_eq!(out["generatedAt"], "2024-06-01T12:00:00.123Z");
        let back: LinterResponse = serde_json::from_value(out).unwrap();
        assert_eq!(back.generated_at, Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + Duration::milliseconds(123));
    }
}
