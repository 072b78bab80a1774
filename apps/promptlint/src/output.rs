//! Output rendering for lint, locate, and rules commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-file results and a top-level summary.

use crate::models::rules::LinterConfig;
use crate::models::{LintIssue, LintRange, LintSummary, PromptReport, Severity};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn severity_tag(severity: Severity, color: bool) -> String {
    let label = match severity {
        Severity::Error => "⟦error⟧",
        Severity::Warning => "⟦warn⟧",
        Severity::Info => "⟦info⟧",
        Severity::Success => "⟦ok⟧",
    };
    if !color {
        return label.to_string();
    }
    match severity {
        Severity::Error => label.red().bold().to_string(),
        Severity::Warning => label.yellow().bold().to_string(),
        Severity::Info => label.blue().bold().to_string(),
        Severity::Success => label.green().bold().to_string(),
    }
}

fn severity_icon(severity: Severity) -> String {
    match severity {
        Severity::Error => "✖".red().to_string(),
        Severity::Warning => "▲".yellow().to_string(),
        Severity::Info => "◆".blue().to_string(),
        Severity::Success => "✔".green().to_string(),
    }
}

/// Issues of one report grouped by `order`; severities missing from `order`
/// go last. Evaluation order is kept within a group.
fn ordered_issues<'a>(issues: &'a [LintIssue], order: &[Severity]) -> Vec<&'a LintIssue> {
    let rank = |s: Severity| order.iter().position(|o| *o == s).unwrap_or(order.len());
    let mut sorted: Vec<&LintIssue> = issues.iter().collect();
    sorted.sort_by_key(|i| rank(i.severity));
    sorted
}

/// Print lint results in the requested format.
pub fn print_lint(reports: &[PromptReport], output: &str, errors: &[String], order: &[Severity]) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_lint_json(reports, errors)).unwrap_or_default()
        ),
        _ => {
            let color = use_colors(output);
            for e in errors {
                eprintln!("{} {}", crate::utils::error_prefix(), e);
            }
            for r in reports {
                for is in ordered_issues(&r.response.issues, order) {
                    let loc = match is.range {
                        Some(range) => format!(
                            "{}:{}:{}",
                            r.file, range.start.line, range.start.column
                        ),
                        None => r.file.clone(),
                    };
                    let loc = if color { loc.bold().to_string() } else { loc };
                    let icon = if color {
                        severity_icon(is.severity)
                    } else {
                        String::new()
                    };
                    println!(
                        "{} {} {} ❲{}❳ — {}",
                        icon,
                        severity_tag(is.severity, color),
                        loc,
                        is.code,
                        is.message
                    );
                    if let Some(fix) = &is.fix {
                        if color {
                            println!("    {} {}", "fix:".bright_black(), fix.hint);
                        } else {
                            println!("    fix: {}", fix.hint);
                        }
                    }
                }
            }
            let total = total_summary(reports);
            let summary = format!(
                "— Summary — errors={} warnings={} infos={} successes={} files={}",
                total.errors,
                total.warnings,
                total.infos,
                total.successes,
                reports.len()
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

fn total_summary(reports: &[PromptReport]) -> LintSummary {
    let mut total = LintSummary::default();
    for r in reports {
        total.absorb(&r.response.summary);
    }
    total
}

/// Compose lint JSON object (pure) for testing/snapshot purposes.
pub fn compose_lint_json(reports: &[PromptReport], errors: &[String]) -> JsonVal {
    let total = total_summary(reports);
    json!({
        "results": reports,
        "errors": errors,
        "summary": {
            "totalIssues": total.total_issues,
            "errors": total.errors,
            "warnings": total.warnings,
            "infos": total.infos,
            "successes": total.successes,
            "files": reports.len(),
        },
    })
}

/// Print a located range as JSON, `null` when absent.
pub fn print_range(range: Option<&LintRange>) {
    println!(
        "{}",
        serde_json::to_string_pretty(&compose_range_json(range)).unwrap_or_default()
    );
}

pub fn compose_range_json(range: Option<&LintRange>) -> JsonVal {
    match range {
        Some(r) => json!(r),
        None => JsonVal::Null,
    }
}

/// Print the rules of a rule document.
pub fn print_rules(config: &LinterConfig, locale: &str, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_rules_json(config, locale)).unwrap_or_default()
        ),
        _ => {
            let color = use_colors(output);
            let header = format!("rule set {} ({} rules)", config.version, config.rules.len());
            if color {
                println!("{}", header.bold());
            } else {
                println!("{}", header);
            }
            for rule in &config.rules {
                let title = rule
                    .title
                    .resolve(locale, &config.metadata.fallback_locale)
                    .unwrap_or("");
                let suppresses = if rule.is_suppressor() {
                    format!(" (suppresses {})", rule.suppress_other_rules.join(", "))
                } else {
                    String::new()
                };
                println!(
                    "  {} {:<36} {}{}",
                    severity_tag(rule.severity, color),
                    rule.code,
                    title,
                    suppresses
                );
            }
        }
    }
}

/// Compose rules JSON object (pure) for testing/snapshot purposes.
pub fn compose_rules_json(config: &LinterConfig, locale: &str) -> JsonVal {
    let fallback = config.metadata.fallback_locale.as_str();
    let items: Vec<_> = config
        .rules
        .iter()
        .map(|r| {
            json!({
                "code": r.code,
                "severity": r.severity,
                "category": r.category,
                "target": r.target,
                "title": r.title.resolve(locale, fallback),
                "checks": r.checks.len(),
                "tags": r.tags,
                "suppressOtherRules": r.suppress_other_rules,
            })
        })
        .collect();
    json!({"version": config.version, "rules": items})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinterResponse, Position, TextStats};
    use crate::store::{parse_config, EMBEDDED_RULES};
    use chrono::Utc;
    use serde_json::Map;

    fn issue(code: &str, severity: Severity) -> LintIssue {
        LintIssue {
            code: code.into(),
            severity,
            message: "msg".into(),
            range: None,
            fix: None,
            tags: vec![],
            metadata: Map::new(),
        }
    }

    fn report(file: &str, issues: Vec<LintIssue>) -> PromptReport {
        PromptReport {
            file: file.into(),
            response: LinterResponse {
                summary: LintSummary::from_issues(&issues),
                issues,
                generated_at: Utc::now(),
                config_version: "v".into(),
                stats: TextStats::default(),
                sections: None,
            },
        }
    }

    #[test]
    fn test_compose_lint_json_shape() {
        let reports = vec![
            report("a.txt", vec![issue("A", Severity::Error)]),
            report(
                "b.txt",
                vec![issue("B", Severity::Warning), issue("C", Severity::Success)],
            ),
        ];
        let out = compose_lint_json(&reports, &["failed to read c.txt".to_string()]);
        assert_eq!(out["summary"]["totalIssues"], 3);
        assert_eq!(out["summary"]["errors"], 1);
        assert_eq!(out["summary"]["successes"], 1);
        assert_eq!(out["summary"]["files"], 2);
        assert_eq!(out["results"][0]["file"], "a.txt");
        assert_eq!(out["results"][0]["issues"][0]["code"], "A");
        assert_eq!(out["results"][1]["configVersion"], "v");
        assert_eq!(out["errors"][0], "failed to read c.txt");
    }

    #[test]
    fn test_ordered_issues_groups_by_severity_order() {
        let issues = vec![
            issue("S", Severity::Success),
            issue("W", Severity::Warning),
            issue("E1", Severity::Error),
            issue("E2", Severity::Error),
        ];
        let order = Severity::ALL;
        let codes: Vec<&str> = ordered_issues(&issues, &order)
            .iter()
            .map(|i| i.code.as_str())
            .collect();
        assert_eq!(codes, vec!["E1", "E2", "W", "S"]);
        let partial = [Severity::Success];
        let codes: Vec<&str> = ordered_issues(&issues, &partial)
            .iter()
            .map(|i| i.code.as_str())
            .collect();
        assert_eq!(codes, vec!["S", "W", "E1", "E2"]);
    }

    #[test]
    fn test_compose_range_json() {
        assert!(compose_range_json(None).is_null());
        let p = Position {
            line: 2,
            column: 1,
            offset: 4,
        };
        let out = compose_range_json(Some(&LintRange { start: p, end: p }));
        assert_eq!(out["start"]["line"], 2);
        assert_eq!(out["end"]["offset"], 4);
    }

    #[test]
    fn test_compose_rules_json_localizes_titles() {
        let cfg = parse_config(EMBEDDED_RULES, "<embedded>").unwrap();
        let out = compose_rules_json(&cfg, "zh-CN");
        assert_eq!(out["version"], cfg.version.as_str());
        let role = out["rules"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["code"] == "PROMPT_ROLE_MISSING")
            .unwrap();
        assert_eq!(role["title"], "缺少角色定义");
        assert_eq!(role["severity"], "error");
    }
}
