//! Configuration discovery and effective settings resolution.
//!
//! promptlint reads `promptlint.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `rules`: the embedded rule document
//! - `locale`: the rule document's fallback locale
//! - `output`: `human`
//! - `mode`: `rules`
//! - `patterns`: none (prompt files must be passed or piped on stdin)
//!
//! Overrides precedence: CLI > config file > defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const CONFIG_FILES: [&str; 3] = ["promptlint.toml", "promptlint.yaml", "promptlint.yml"];

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
/// Root configuration loaded from `promptlint.toml|yaml`.
pub struct PromptlintConfig {
    /// Path to a rule document, relative to the repository root.
    pub rules: Option<String>,
    pub locale: Option<String>,
    pub output: Option<String>,
    pub mode: Option<String>,
    /// Default prompt file globs when none are passed on the command line.
    #[serde(default)]
    pub patterns: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    /// `None` selects the embedded rule document.
    pub rules: Option<PathBuf>,
    pub locale: Option<String>,
    pub output: String,
    pub mode: String,
    pub patterns: Vec<String>,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `promptlint.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `PromptlintConfig` from `promptlint.toml` or `promptlint.yaml|yml`.
///
/// An unparsable file is logged and ignored.
pub fn load_config(root: &Path) -> Option<PromptlintConfig> {
    let toml_path = root.join("promptlint.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        return match toml::from_str::<PromptlintConfig>(&s) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!(path = %toml_path.display(), error = %e, "ignoring invalid config");
                None
            }
        };
    }
    for yml in ["promptlint.yaml", "promptlint.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            return match serde_yaml::from_str::<PromptlintConfig>(&s) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "ignoring invalid config");
                    None
                }
            };
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_rules: Option<&str>,
    cli_locale: Option<&str>,
    cli_output: Option<&str>,
    cli_mode: Option<&str>,
) -> Effective {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root).unwrap_or_default();

    // CLI paths are taken as given; config paths are relative to the root.
    let rules = match cli_rules {
        Some(p) => Some(PathBuf::from(p)),
        None => cfg.rules.map(|p| repo_root.join(p)),
    };

    let locale = cli_locale.map(|s| s.to_string()).or(cfg.locale);

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let mode = cli_mode
        .map(|s| s.to_string())
        .or(cfg.mode)
        .unwrap_or_else(|| "rules".to_string());

    Effective {
        repo_root,
        rules,
        locale,
        output,
        mode,
        patterns: cfg.patterns.unwrap_or_default(),
    }
}
