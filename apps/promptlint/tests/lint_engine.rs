use pretty_assertions::assert_eq;
use promptlint::locate::position_at;
use promptlint::store::parse_config;
use promptlint::{
    lint_prompt, LintMode, LintOptions, LintSummary, PromptLinter, RuleEngine, RuleSource,
    RuleStore, Severity,
};
use std::sync::Arc;

fn engine(doc: &str) -> RuleEngine {
    RuleEngine::new(Arc::new(parse_config(doc, "test").unwrap()))
}

fn codes(issues: &[promptlint::LintIssue]) -> Vec<String> {
    issues.iter().map(|i| i.code.clone()).collect()
}

#[test]
fn repeated_runs_are_identical_apart_from_timestamp() {
    let text = "You are a chef. Write a recipe for {{dish}} and list {{Dish}} ingredients.";
    let opts = LintOptions::with_locale("zh-CN");
    let a = lint_prompt(text, &opts).unwrap();
    let b = lint_prompt(text, &opts).unwrap();
    assert_eq!(a.issues, b.issues);
    assert_eq!(a.summary, b.summary);
    assert_eq!(a.config_version, b.config_version);
    assert_eq!(
        serde_json::to_string(&a.issues).unwrap(),
        serde_json::to_string(&b.issues).unwrap()
    );
}

#[test]
fn summary_always_matches_issue_list() {
    for text in [
        "",
        "hi",
        "You are a helpful assistant. Summarize the article below in JSON. Do not invent facts.",
        "## Context\n<instructions>Step 1: read. Step 2: answer.</instructions>",
    ] {
        for mode in [LintMode::Rules, LintMode::Sections] {
            let linter = mode.linter(promptlint::store::default_store()).unwrap();
            let r = linter.lint(text, &LintOptions::default()).unwrap();
            let s = r.summary;
            assert_eq!(s.errors + s.warnings + s.infos + s.successes, s.total_issues);
            assert_eq!(s.total_issues, r.issues.len());
            assert_eq!(s, LintSummary::from_issues(&r.issues));
        }
    }
}

#[test]
fn consistent_placeholder_passes() {
    let text = "You are a concierge. Greet {{user_name}} by name and thank {{user_name}} at the end.";
    let r = lint_prompt(text, &LintOptions::default()).unwrap();
    assert!(!codes(&r.issues).contains(&"PROMPT_PLACEHOLDER_INCONSISTENT".to_string()));
}

#[test]
fn inconsistent_placeholder_is_reported_with_range() {
    let text = "You are a concierge.\nGreet {{user_name}} and thank {{UserName}}.";
    let r = lint_prompt(text, &LintOptions::default()).unwrap();
    let issue = r
        .issues
        .iter()
        .find(|i| i.code == "PROMPT_PLACEHOLDER_INCONSISTENT")
        .expect("placeholder issue");
    assert_eq!(issue.severity, Severity::Warning);
    let range = issue.range.unwrap();
    assert_eq!(range.start.line, 2);
    let start = text.chars().skip(range.start.offset).take(12).collect::<String>();
    assert_eq!(start, "{{UserName}}");
}

#[test]
fn guidance_rule_suppresses_short_prompt_rule() {
    let doc = r#"{
        "version": "t",
        "rules": [
            {
                "code": "PROMPT_COMPLEX_GUIDANCE_DETECTED",
                "severity": "success",
                "title": {"en": "Advanced usage"},
                "checks": [{"type": "must_include_any", "patterns": ["(?i)<context>", "(?i)step \\d"], "minMatches": 2}],
                "suppressOtherRules": ["PROMPT_TOO_SHORT"]
            },
            {
                "code": "PROMPT_TOO_SHORT",
                "severity": "warning",
                "checks": [{"type": "must_include_any", "patterns": ["\\S"], "minLength": 200}]
            }
        ]
    }"#;
    let e = engine(doc);
    let r = e.evaluate("<CONTEXT>x</CONTEXT> Step 1", &LintOptions::default());
    assert_eq!(codes(&r.issues), vec!["PROMPT_COMPLEX_GUIDANCE_DETECTED".to_string()]);
    assert_eq!(r.summary.successes, 1);

    let r = e.evaluate("<context>only one signal</context>", &LintOptions::default());
    assert_eq!(codes(&r.issues), vec!["PROMPT_TOO_SHORT".to_string()]);
}

#[test]
fn missing_locale_falls_back_to_configured_locale() {
    let doc = r#"{
        "version": "t",
        "metadata": {"fallbackLocale": "en"},
        "rules": [{
            "code": "ROLE_MISSING", "severity": "error",
            "title": {"en": "Missing role"},
            "checks": [{"type": "must_include_any", "patterns": ["you are"]}]
        }]
    }"#;
    let r = engine(doc).evaluate("hello", &LintOptions::with_locale("zh"));
    assert_eq!(r.issues[0].message, "Missing role");
}

#[test]
fn range_positions_for_line_starts() {
    let text = "first\nsecond\nthird";
    let p = position_at(text, 0);
    assert_eq!((p.line, p.column, p.offset), (1, 1, 0));
    let p = position_at(text, 6);
    assert_eq!((p.line, p.column), (2, 1));
}

#[test]
fn empty_prompt_reports_presence_rules_only() {
    let r = lint_prompt("", &LintOptions::default()).unwrap();
    let got = codes(&r.issues);
    for expected in [
        "PROMPT_ROLE_MISSING",
        "PROMPT_TASK_MISSING",
        "PROMPT_OUTPUT_FORMAT_MISSING",
        "PROMPT_CONSTRAINTS_MISSING",
        "PROMPT_TOO_SHORT",
    ] {
        assert!(got.contains(&expected.to_string()), "missing {}", expected);
    }
    assert!(!got.contains(&"PROMPT_TOO_LONG".to_string()));
    assert!(!got.contains(&"PROMPT_PLACEHOLDER_INCONSISTENT".to_string()));
    assert!(!got.contains(&"PROMPT_COMPLEX_GUIDANCE_DETECTED".to_string()));
}

#[test]
fn end_to_end_two_rule_document() {
    let doc = r#"{
        "version": "e2e-1",
        "rules": [
            {
                "code": "ROLE_MISSING", "severity": "error",
                "title": {"en": "Role missing"},
                "checks": [{"type": "must_include_any", "patterns": ["you are", "act as"]}]
            },
            {
                "code": "TOO_LONG", "severity": "warning",
                "checks": [{"type": "max_length", "limit": 500}]
            }
        ]
    }"#;
    let store = RuleStore::new(RuleSource::Inline(doc.to_string()));
    let linter = LintMode::Rules.linter(&store).unwrap();
    let r = linter
        .lint("Please write a summary.", &LintOptions::default())
        .unwrap();
    assert_eq!(r.issues.len(), 1);
    assert_eq!(r.issues[0].code, "ROLE_MISSING");
    assert_eq!(r.issues[0].severity, Severity::Error);
    assert_eq!(
        r.summary,
        LintSummary {
            total_issues: 1,
            errors: 1,
            warnings: 0,
            infos: 0,
            successes: 0,
        }
    );
    assert_eq!(r.config_version, "e2e-1");
}

#[test]
fn reset_then_load_yields_equal_content() {
    let before = promptlint::load().unwrap();
    promptlint::reset_cache();
    let after = promptlint::load().unwrap();
    assert_eq!(*before, *after);
    assert_eq!(promptlint::config_version().unwrap(), after.version);
}

#[test]
fn locate_section_in_both_strategies() {
    let text = "Context first.\nAct as a translator.";
    let r = promptlint::locate_section(text, promptlint::SectionKey::Role).unwrap();
    assert_eq!((r.start.line, r.start.column), (2, 1));

    let linter = LintMode::Rules
        .linter(promptlint::store::default_store())
        .unwrap();
    let r = linter.locate_section(text, "PROMPT_ROLE_MISSING").unwrap();
    assert_eq!((r.start.line, r.start.column), (2, 1));
    assert!(linter.locate_section("nothing", "PROMPT_ROLE_MISSING").is_none());
}
