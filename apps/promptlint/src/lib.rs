//! promptlint core library.
//!
//! This crate lints prompt text (instructions for large language models)
//! against a versioned, declarative rule document and reports issues with
//! localized messages, highlight ranges, and a severity summary.
//!
//! High-level modules:
//! - `store`: Cached, resettable loading of the rule document.
//! - `checks`: Check evaluators (`must_include_any`, `placeholder_consistency`,
//!   `max_length`).
//! - `lint`: Two-pass rule evaluation engine, strategy selection, batch runs.
//! - `sections`: Six-section heuristic strategy and `locate_section`.
//! - `locate`: Offset to line/column conversion.
//! - `models`: Output records and the rule document schema.
//! - `config`: Discovery and effective configuration resolution for the CLI.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `output`: Human/JSON printers.
//! - `error`: Error types.
//! - `utils`: Supporting helpers.
pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod lint;
pub mod locate;
pub mod models;
pub mod output;
pub mod sections;
pub mod store;
pub mod utils;

pub use error::{ConfigLoadError, PromptLintError};
pub use lint::{config_version, lint_prompt, LintMode, LintOptions, PromptLinter, RuleEngine};
pub use models::{LintIssue, LintRange, LintSummary, LinterResponse, Position, Severity};
pub use sections::{locate_section, SectionKey, SectionLinter};
pub use store::{load, reset_cache, RuleSource, RuleStore};
