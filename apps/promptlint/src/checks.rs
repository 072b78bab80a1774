//! Check evaluators.
//!
//! Each evaluator is a pure `(spec, text) -> bool`. `evaluate` dispatches on
//! the `CheckSpec` variant; `Unsupported` checks pass so a rule document from
//! a newer schema does not block evaluation of everything else.
//!
//! `match_span` and `failure_span` return byte spans used to attach a range to
//! an emitted issue. They never affect pass/fail.

use crate::models::rules::{CheckSpec, MaxLength, MustIncludeAny, PlaceholderConsistency};
use parking_lot::Mutex;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Prefix that folds a pattern to case-insensitive matching.
pub const CASE_INSENSITIVE_MARKER: &str = "(?i)";

/// Placeholder shapes recognised when a check lists no patterns:
/// `{{name}}`, `<<name>>` and `[name]`.
pub const DEFAULT_PLACEHOLDER_PATTERNS: [&str; 3] = [
    r"\{\{\s*([^{}]+?)\s*\}\}",
    r"<<\s*([^<>]+?)\s*>>",
    r"\[([A-Za-z_][\w .-]*)\]",
];

/// Process-wide cache of compiled patterns, keyed by pattern source.
///
/// Failed compilations are cached as `None` so an invalid pattern is reported
/// once rather than on every evaluation.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: Mutex<HashMap<String, Option<Regex>>>,
}

impl PatternCache {
    pub fn get(&self, source: &str) -> Option<Regex> {
        let mut compiled = self.compiled.lock();
        if let Some(hit) = compiled.get(source) {
            return hit.clone();
        }
        let re = build_pattern(source);
        compiled.insert(source.to_string(), re.clone());
        re
    }

    pub fn len(&self) -> usize {
        self.compiled.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static PATTERNS: LazyLock<PatternCache> = LazyLock::new(PatternCache::default);

/// Compile a rule pattern, honouring the case-insensitivity marker.
///
/// Invalid patterns are logged once and skipped (treated as never matching).
pub fn compile_pattern(source: &str) -> Option<Regex> {
    PATTERNS.get(source)
}

fn build_pattern(source: &str) -> Option<Regex> {
    let (body, fold) = match source.strip_prefix(CASE_INSENSITIVE_MARKER) {
        Some(rest) => (rest, true),
        None => (source, false),
    };
    match RegexBuilder::new(body).case_insensitive(fold).build() {
        Ok(re) => Some(re),
        Err(err) => {
            warn!(pattern = source, error = %err, "skipping invalid pattern");
            None
        }
    }
}

/// Evaluate one check against prompt text.
pub fn evaluate(check: &CheckSpec, text: &str) -> bool {
    match check {
        CheckSpec::MustIncludeAny(spec) => must_include_any(spec, text),
        CheckSpec::PlaceholderConsistency(spec) => placeholder_consistency(spec, text),
        CheckSpec::MaxLength(spec) => max_length(spec, text),
        CheckSpec::Unsupported { kind } => {
            debug!(check_type = %kind, "unsupported check passes");
            true
        }
    }
}

/// At least `min_matches` of the patterns must match.
pub fn must_include_any(spec: &MustIncludeAny, text: &str) -> bool {
    if let Some(min_length) = spec.min_length {
        if text.trim().chars().count() < min_length {
            return false;
        }
    }
    if spec.min_matches == 0 {
        return true;
    }
    let mut matched = 0usize;
    for re in spec.patterns.iter().filter_map(|p| compile_pattern(p)) {
        if re.is_match(text) {
            matched += 1;
            if matched >= spec.min_matches {
                return true;
            }
        }
    }
    false
}

/// Every placeholder keeps one raw spelling across the text.
pub fn placeholder_consistency(spec: &PlaceholderConsistency, text: &str) -> bool {
    find_placeholder_conflict(spec, text).is_none()
}

/// Char length is within `limit`; vacuously true without a limit.
pub fn max_length(spec: &MaxLength, text: &str) -> bool {
    match spec.limit {
        Some(limit) => text.chars().count() <= limit,
        None => true,
    }
}

/// Collapse a placeholder name to its semantic form.
///
/// camelCase boundaries and every non-alphanumeric run become one space; the
/// result is trimmed and lowercased. `UserName`, `user_name` and `User Name`
/// all yield `user name`.
pub fn normalize_placeholder(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if ch.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_numeric()) {
                spaced.push(' ');
            }
            spaced.push(ch);
        } else {
            spaced.push(' ');
        }
        prev = Some(ch);
    }
    spaced
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A placeholder found in prompt text.
pub struct PlaceholderHit {
    /// Placeholder name as written (capture group, or whole match).
    pub raw: String,
    pub normalized: String,
    /// Byte span of the whole placeholder including delimiters.
    pub span: Range<usize>,
}

/// All placeholder occurrences, ordered by position.
pub fn placeholder_hits(spec: &PlaceholderConsistency, text: &str) -> Vec<PlaceholderHit> {
    let compiled: Vec<Regex> = if spec.patterns.is_empty() {
        DEFAULT_PLACEHOLDER_PATTERNS
            .iter()
            .filter_map(|p| compile_pattern(p))
            .collect()
    } else {
        spec.patterns.iter().filter_map(|p| compile_pattern(p)).collect()
    };
    let mut hits = Vec::new();
    for re in &compiled {
        for caps in re.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let raw = caps.get(1).unwrap_or(whole).as_str().trim().to_string();
            let normalized = normalize_placeholder(&raw);
            if normalized.is_empty() {
                continue;
            }
            hits.push(PlaceholderHit {
                raw,
                normalized,
                span: whole.range(),
            });
        }
    }
    hits.sort_by_key(|h| (h.span.start, h.span.end));
    hits
}

/// First occurrence whose spelling differs from an earlier occurrence of the
/// same normalized placeholder.
pub fn find_placeholder_conflict(
    spec: &PlaceholderConsistency,
    text: &str,
) -> Option<PlaceholderHit> {
    let mut first_spelling: HashMap<String, String> = HashMap::new();
    for hit in placeholder_hits(spec, text) {
        match first_spelling.get(&hit.normalized) {
            Some(seen) if *seen != hit.raw => return Some(hit),
            Some(_) => {}
            None => {
                first_spelling.insert(hit.normalized.clone(), hit.raw.clone());
            }
        }
    }
    None
}

/// Span of the first pattern hit of a presence check, in pattern order.
pub fn match_span(check: &CheckSpec, text: &str) -> Option<Range<usize>> {
    match check {
        CheckSpec::MustIncludeAny(spec) => spec
            .patterns
            .iter()
            .filter_map(|p| compile_pattern(p))
            .find_map(|re| re.find(text).map(|m| m.range())),
        _ => None,
    }
}

/// Span explaining why `check` failed, when the failure has a location.
pub fn failure_span(check: &CheckSpec, text: &str) -> Option<Range<usize>> {
    match check {
        CheckSpec::PlaceholderConsistency(spec) => {
            find_placeholder_conflict(spec, text).map(|hit| hit.span)
        }
        CheckSpec::MaxLength(MaxLength { limit: Some(limit) }) => text
            .char_indices()
            .nth(*limit)
            .map(|(byte_idx, _)| byte_idx..text.len()),
        _ => None,
    }
}
