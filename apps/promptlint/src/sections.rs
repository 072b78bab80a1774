//! Six-section heuristic linter.
//!
//! A lighter strategy that needs no rule document: it looks for role, task,
//! constraints, output format, variables and guardrails with a fixed list of
//! regexes and keywords (first hit wins), and flags non-empty prompts below a
//! minimum length. There is no suppression here.
//!
//! The built-in rule table is keyed by code. Asking for a code that is not in
//! the table is a bug, reported as `PromptLintError::UnknownRule`.

use crate::checks::compile_pattern;
use crate::error::PromptLintError;
use crate::lint::{LintOptions, PromptLinter};
use crate::locate;
use crate::models::rules::LocalizedText;
use crate::models::{
    Fix, LintIssue, LintRange, LintSummary, LinterResponse, SectionCoverage, Severity,
};
use crate::utils::text_stats;
use chrono::Utc;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value as Json};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;

/// Version reported for responses from this strategy.
pub const SECTIONS_VERSION: &str = "sections-1";

/// Trimmed prompts shorter than this (and not empty) are flagged.
pub const SHORT_PROMPT_MIN_CHARS: usize = 50;

const FALLBACK_LOCALE: &str = "en";
const SHORT_RULE_CODE: &str = "PROMPT_TOO_SHORT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKey {
    Role,
    Task,
    Constraints,
    OutputFormat,
    Variables,
    Guardrails,
}

impl SectionKey {
    pub const ALL: [SectionKey; 6] = [
        SectionKey::Role,
        SectionKey::Task,
        SectionKey::Constraints,
        SectionKey::OutputFormat,
        SectionKey::Variables,
        SectionKey::Guardrails,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Role => "role",
            SectionKey::Task => "task",
            SectionKey::Constraints => "constraints",
            SectionKey::OutputFormat => "outputFormat",
            SectionKey::Variables => "variables",
            SectionKey::Guardrails => "guardrails",
        }
    }

    /// Code of the issue emitted when the section is missing.
    pub fn rule_code(&self) -> &'static str {
        match self {
            SectionKey::Role => "ROLE_MISSING",
            SectionKey::Task => "TASK_MISSING",
            SectionKey::Constraints => "CONSTRAINTS_MISSING",
            SectionKey::OutputFormat => "OUTPUT_FORMAT_MISSING",
            SectionKey::Variables => "VARIABLES_MISSING",
            SectionKey::Guardrails => "GUARDRAILS_MISSING",
        }
    }

    fn patterns(&self) -> &'static [&'static str] {
        match self {
            SectionKey::Role => &[
                r"(?i)\b(you are|act as|your role is)\b",
                r"(?i)\bas an? \w+ (expert|assistant|specialist)\b",
            ],
            SectionKey::Task => &[
                r"(?i)\b(your task|the task|goal|objective)\b",
                r"(?im)^\s*(please\s+)?(write|summari[sz]e|generate|create|explain|analy[sz]e|translate|review|classify|extract|draft)\b",
            ],
            SectionKey::Constraints => &[
                r"(?i)\b(must not|do not|don't|never|at most|no more than|avoid)\b",
            ],
            SectionKey::OutputFormat => &[
                r"(?i)\b(respond|reply|answer|output|return)\s+(with|in|as)\b",
                r"(?i)\b(json|markdown|yaml|csv|table|bullet points?)\b",
            ],
            SectionKey::Variables => &[
                r"\{\{\s*[^{}]+?\s*\}\}",
                r"<<\s*[^<>]+?\s*>>",
                r"\$\{[A-Za-z_]\w*\}",
            ],
            SectionKey::Guardrails => &[
                r"(?i)\bif (you are|you're) (unsure|not sure|uncertain)\b",
                r"(?i)\b(do not|don't) (make up|invent|fabricate|hallucinate)\b",
                r"(?i)\bsay (that )?you don'?t know\b",
            ],
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            SectionKey::Role => &["role:", "persona", "你是", "角色"],
            SectionKey::Task => &["task:", "任务", "请"],
            SectionKey::Constraints => &["constraints", "requirements", "限制", "不要", "必须"],
            SectionKey::OutputFormat => &["output format", "format:", "输出格式", "格式"],
            SectionKey::Variables => &["variables", "inputs:", "变量"],
            SectionKey::Guardrails => &["guardrail", "safety", "refuse", "不确定", "不要编造"],
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKey {
    type Err = PromptLintError;

    /// Accepts camelCase, snake_case and kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "role" => Ok(SectionKey::Role),
            "task" => Ok(SectionKey::Task),
            "constraints" => Ok(SectionKey::Constraints),
            "outputformat" | "format" => Ok(SectionKey::OutputFormat),
            "variables" => Ok(SectionKey::Variables),
            "guardrails" => Ok(SectionKey::Guardrails),
            _ => Err(PromptLintError::UnknownSection(s.to_string())),
        }
    }
}

impl SectionCoverage {
    pub fn get(&self, key: SectionKey) -> bool {
        match key {
            SectionKey::Role => self.role,
            SectionKey::Task => self.task,
            SectionKey::Constraints => self.constraints,
            SectionKey::OutputFormat => self.output_format,
            SectionKey::Variables => self.variables,
            SectionKey::Guardrails => self.guardrails,
        }
    }

    fn set(&mut self, key: SectionKey, present: bool) {
        let slot = match key {
            SectionKey::Role => &mut self.role,
            SectionKey::Task => &mut self.task,
            SectionKey::Constraints => &mut self.constraints,
            SectionKey::OutputFormat => &mut self.output_format,
            SectionKey::Variables => &mut self.variables,
            SectionKey::Guardrails => &mut self.guardrails,
        };
        *slot = present;
    }
}

/// A rule of the built-in table.
#[derive(Debug)]
pub struct BuiltinRule {
    pub code: &'static str,
    pub severity: Severity,
    pub category: &'static str,
    pub target: &'static str,
    title: [(&'static str, &'static str); 2],
    hint: [(&'static str, &'static str); 2],
}

impl BuiltinRule {
    pub fn title(&self) -> LocalizedText {
        LocalizedText::from_pairs(self.title)
    }

    pub fn hint(&self) -> LocalizedText {
        LocalizedText::from_pairs(self.hint)
    }
}

static BUILTIN_RULES: &[BuiltinRule] = &[
    BuiltinRule {
        code: "ROLE_MISSING",
        severity: Severity::Error,
        category: "structure",
        target: "role",
        title: [("en", "Missing role definition"), ("zh-CN", "缺少角色定义")],
        hint: [
            ("en", "Start with \"You are ...\" to give the model a role."),
            ("zh-CN", "以“你是……”开头，为模型设定角色。"),
        ],
    },
    BuiltinRule {
        code: "TASK_MISSING",
        severity: Severity::Error,
        category: "structure",
        target: "task",
        title: [("en", "Missing task statement"), ("zh-CN", "缺少任务说明")],
        hint: [
            ("en", "Say what the model should do, e.g. \"Summarize the text below\"."),
            ("zh-CN", "说明模型要做什么，例如“请总结下面的文本”。"),
        ],
    },
    BuiltinRule {
        code: "CONSTRAINTS_MISSING",
        severity: Severity::Warning,
        category: "clarity",
        target: "constraints",
        title: [("en", "No constraints given"), ("zh-CN", "没有给出约束")],
        hint: [
            ("en", "Add limits such as length, tone or topics to avoid."),
            ("zh-CN", "加入长度、语气或需要避免的话题等限制。"),
        ],
    },
    BuiltinRule {
        code: "OUTPUT_FORMAT_MISSING",
        severity: Severity::Warning,
        category: "clarity",
        target: "outputFormat",
        title: [("en", "Output format not specified"), ("zh-CN", "未指定输出格式")],
        hint: [
            ("en", "Describe the expected output, e.g. a JSON object or a bullet list."),
            ("zh-CN", "描述期望的输出，例如 JSON 对象或项目列表。"),
        ],
    },
    BuiltinRule {
        code: "VARIABLES_MISSING",
        severity: Severity::Info,
        category: "variables",
        target: "variables",
        title: [("en", "No variables declared"), ("zh-CN", "没有声明变量")],
        hint: [
            ("en", "Use placeholders like {{input}} for the parts that change."),
            ("zh-CN", "对变化的部分使用 {{input}} 之类的占位符。"),
        ],
    },
    BuiltinRule {
        code: "GUARDRAILS_MISSING",
        severity: Severity::Info,
        category: "safety",
        target: "guardrails",
        title: [("en", "No guardrails"), ("zh-CN", "缺少防护说明")],
        hint: [
            ("en", "Tell the model what to do when unsure, e.g. \"Say you don't know\"."),
            ("zh-CN", "告诉模型不确定时怎么做，例如“如果不确定，请直接说明”。"),
        ],
    },
    BuiltinRule {
        code: SHORT_RULE_CODE,
        severity: Severity::Warning,
        category: "length",
        target: "prompt",
        title: [("en", "Prompt is very short"), ("zh-CN", "提示过短")],
        hint: [
            ("en", "Add background, audience and the expected result."),
            ("zh-CN", "补充背景、受众以及期望的结果。"),
        ],
    },
];

/// Look up a built-in rule by code.
pub fn builtin_rule(code: &str) -> Result<&'static BuiltinRule, PromptLintError> {
    BUILTIN_RULES
        .iter()
        .find(|r| r.code == code)
        .ok_or_else(|| PromptLintError::UnknownRule(code.to_string()))
}

pub fn builtin_rules() -> &'static [BuiltinRule] {
    BUILTIN_RULES
}

/// Section matchers in priority order: regexes first, then keywords.
static MATCHERS: LazyLock<Vec<(SectionKey, Vec<Regex>)>> = LazyLock::new(|| {
    SectionKey::ALL
        .iter()
        .map(|key| {
            let mut matchers: Vec<Regex> =
                key.patterns().iter().filter_map(|p| compile_pattern(p)).collect();
            matchers.extend(key.keywords().iter().filter_map(|kw| {
                RegexBuilder::new(&regex::escape(kw))
                    .case_insensitive(true)
                    .build()
                    .ok()
            }));
            (*key, matchers)
        })
        .collect()
});

fn section_span(text: &str, key: SectionKey) -> Option<Range<usize>> {
    MATCHERS
        .iter()
        .find(|(k, _)| *k == key)
        .and_then(|(_, matchers)| matchers.iter().find_map(|re| re.find(text)))
        .map(|m| m.range())
}

/// Where `key` is satisfied in `text`, or `None`.
pub fn locate_section(text: &str, key: SectionKey) -> Option<LintRange> {
    section_span(text, key).map(|span| locate::range_for_bytes(text, span))
}

/// String-keyed variant of [`locate_section`] for callers holding raw keys.
pub fn locate_section_by_name(
    text: &str,
    key: &str,
) -> Result<Option<LintRange>, PromptLintError> {
    Ok(locate_section(text, key.parse()?))
}

/// The six-section strategy.
#[derive(Debug, Clone)]
pub struct SectionLinter {
    min_chars: usize,
}

impl Default for SectionLinter {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionLinter {
    pub fn new() -> Self {
        Self {
            min_chars: SHORT_PROMPT_MIN_CHARS,
        }
    }

    pub fn with_min_chars(min_chars: usize) -> Self {
        Self { min_chars }
    }

    fn issue(
        &self,
        code: &str,
        locale: &str,
        range: Option<LintRange>,
    ) -> Result<LintIssue, PromptLintError> {
        let rule = builtin_rule(code)?;
        let message = rule
            .title()
            .resolve(locale, FALLBACK_LOCALE)
            .unwrap_or(rule.code)
            .to_string();
        let fix = rule
            .hint()
            .resolve(locale, FALLBACK_LOCALE)
            .map(|h| Fix {
                hint: h.to_string(),
            });
        let mut metadata = Map::new();
        metadata.insert("category".into(), Json::String(rule.category.to_string()));
        metadata.insert("target".into(), Json::String(rule.target.to_string()));
        Ok(LintIssue {
            code: rule.code.to_string(),
            severity: rule.severity,
            message,
            range,
            fix,
            tags: vec![rule.category.to_string()],
            metadata,
        })
    }
}

impl PromptLinter for SectionLinter {
    fn lint(&self, text: &str, options: &LintOptions) -> Result<LinterResponse, PromptLintError> {
        let locale = options.locale.as_deref().unwrap_or(FALLBACK_LOCALE);
        let mut coverage = SectionCoverage::default();
        let mut issues = Vec::new();
        for key in SectionKey::ALL {
            let present = section_span(text, key).is_some();
            coverage.set(key, present);
            if !present {
                issues.push(self.issue(key.rule_code(), locale, None)?);
            }
        }

        let trimmed_len = text.trim().chars().count();
        if trimmed_len > 0 && trimmed_len < self.min_chars {
            let whole = locate::range_for_match(text, 0, text.chars().count());
            issues.push(self.issue(SHORT_RULE_CODE, locale, Some(whole))?);
        }

        Ok(LinterResponse {
            summary: LintSummary::from_issues(&issues),
            issues,
            generated_at: Utc::now(),
            config_version: SECTIONS_VERSION.to_string(),
            stats: text_stats(text),
            sections: Some(coverage),
        })
    }

    fn locate_section(&self, text: &str, key: &str) -> Option<LintRange> {
        key.parse().ok().and_then(|k| locate_section(text, k))
    }

    fn version(&self) -> &str {
        SECTIONS_VERSION
    }
}
