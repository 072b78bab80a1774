//! promptlint CLI binary entry point.
//! Delegates to the library for lint/locate/rules and prints results.

use clap::Parser;
use promptlint::cli::{Cli, Commands};
use promptlint::lint::{self, LintMode, LintOptions};
use promptlint::models::{PromptReport, Severity};
use promptlint::store::{self, RuleStore};
use promptlint::{config, output, sections, utils};
use std::fmt::Display;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const STDIN_LABEL: &str = "<stdin>";

fn main() {
    // Logs go to stderr so JSON on stdout stays parseable.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("PROMPTLINT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Lint {
            files,
            repo_root,
            rules,
            locale,
            mode,
            output,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                rules.as_deref(),
                locale.as_deref(),
                output.as_deref(),
                mode.as_deref(),
            );
            if eff.output != "json" && config::load_config(&eff.repo_root).is_none() {
                eprintln!(
                    "{} {}",
                    utils::note_prefix(),
                    "No promptlint.toml found; using defaults."
                );
            }
            let mode = parse_mode(&eff.mode);
            let owned_store;
            let store: &RuleStore = match &eff.rules {
                Some(p) => {
                    owned_store = RuleStore::from_path(p);
                    &owned_store
                }
                None => store::default_store(),
            };
            let linter = mode.linter(store).unwrap_or_else(|e| fail(e));
            let order = match mode {
                LintMode::Rules => store
                    .load()
                    .map(|c| c.metadata.severity_order.clone())
                    .unwrap_or_else(|e| fail(e)),
                LintMode::Sections => Severity::ALL.to_vec(),
            };
            let options = LintOptions {
                locale: eff.locale.clone(),
            };

            // CLI paths resolve against the working directory, config
            // patterns against the repository root.
            let (inputs, base) = if files.is_empty() {
                (eff.patterns.clone(), eff.repo_root.clone())
            } else {
                (files, Path::new(".").to_path_buf())
            };

            let (reports, errors) = if inputs.is_empty() || inputs.iter().all(|f| f == "-") {
                let text = read_stdin();
                let response = linter.lint(&text, &options).unwrap_or_else(|e| fail(e));
                (
                    vec![PromptReport {
                        file: STDIN_LABEL.to_string(),
                        response,
                    }],
                    Vec::new(),
                )
            } else {
                let (targets, mut errors) = lint::collect_targets(&base, &inputs);
                let (reports, lint_errors) = lint::lint_files(linter.as_ref(), &targets, &options);
                errors.extend(lint_errors);
                (reports, errors)
            };

            output::print_lint(&reports, &eff.output, &errors, &order);
            if reports.iter().any(|r| r.response.summary.errors > 0) {
                std::process::exit(1);
            }
            if reports.is_empty() && !errors.is_empty() {
                std::process::exit(2);
            }
        }
        Commands::Locate {
            file,
            section,
            repo_root,
            rules,
            mode,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                rules.as_deref(),
                None,
                None,
                mode.as_deref(),
            );
            let text = match file.as_deref() {
                None | Some("-") => read_stdin(),
                Some(path) => std::fs::read_to_string(path)
                    .unwrap_or_else(|e| fail(format!("failed to read {}: {}", path, e))),
            };
            let range = match parse_mode(&eff.mode) {
                LintMode::Sections => {
                    sections::locate_section_by_name(&text, &section).unwrap_or_else(|e| fail(e))
                }
                LintMode::Rules => {
                    let store = match &eff.rules {
                        Some(p) => RuleStore::from_path(p),
                        None => RuleStore::embedded(),
                    };
                    let engine = lint::RuleEngine::from_store(&store).unwrap_or_else(|e| fail(e));
                    if engine.config().rule(&section).is_none() {
                        fail(format!("unknown rule code: {}", section));
                    }
                    lint::PromptLinter::locate_section(&engine, &text, &section)
                }
            };
            output::print_range(range.as_ref());
        }
        Commands::Rules {
            repo_root,
            rules,
            locale,
            output,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                rules.as_deref(),
                locale.as_deref(),
                output.as_deref(),
                None,
            );
            let cfg = match &eff.rules {
                Some(p) => RuleStore::from_path(p).load(),
                None => store::load(),
            }
            .unwrap_or_else(|e| fail(e));
            let locale = eff
                .locale
                .clone()
                .unwrap_or_else(|| cfg.metadata.fallback_locale.clone());
            output::print_rules(&cfg, &locale, &eff.output);
        }
    }
}

fn parse_mode(raw: &str) -> LintMode {
    raw.parse().unwrap_or_else(|e: String| fail(e))
}

fn read_stdin() -> String {
    let mut buf = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
        fail(format!("failed to read stdin: {}", e));
    }
    buf
}

fn fail(err: impl Display) -> ! {
    eprintln!("{} {}", utils::error_prefix(), err);
    std::process::exit(2);
}
