//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "promptlint",
    version,
    about = "Lint LLM prompts against a versioned rule set",
    long_about = "promptlint checks prompt text for structural weaknesses: missing role or output format, inconsistent placeholders, excessive length.\n\nConfiguration precedence: CLI > promptlint.toml > defaults.",
    after_help = "Examples:\n  promptlint lint prompts/*.md\n  cat prompt.txt | promptlint lint --locale zh-CN --output json\n  promptlint lint --mode sections prompt.txt\n  promptlint locate --mode sections --section role prompt.txt\n  promptlint locate --section PROMPT_ROLE_MISSING prompt.txt\n  promptlint rules --rules lint/rules.json",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current promptlint version.")]
    Version,
    /// Lint prompt files
    #[command(
        about = "Run lint checks",
        long_about = "Lint prompt files (globs accepted) or stdin. Exits 1 when any error-severity issue is found.",
        after_help = "Examples:\n  promptlint lint prompts/**/*.txt\n  promptlint lint - --output json < prompt.txt"
    )]
    Lint {
        #[arg(help = "Prompt files or globs; '-' or nothing reads stdin")]
        files: Vec<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to a rule document (default: embedded rules)")]
        rules: Option<String>,
        #[arg(long, help = "Locale for messages, e.g. en, zh-CN")]
        locale: Option<String>,
        #[arg(long, help = "Strategy: rules|sections (default: rules)")]
        mode: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Locate a section in a prompt
    #[command(
        about = "Locate a section",
        long_about = "Print the range of the first match for a section key (sections mode) or rule code (rules mode), or null.",
        after_help = "Examples:\n  promptlint locate --section outputFormat --mode sections prompt.txt\n  promptlint locate --section PROMPT_ROLE_MISSING prompt.txt"
    )]
    Locate {
        #[arg(help = "Prompt file; '-' or nothing reads stdin")]
        file: Option<String>,
        #[arg(long, help = "Section key or rule code")]
        section: String,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to a rule document (default: embedded rules)")]
        rules: Option<String>,
        #[arg(long, help = "Strategy: rules|sections (default: rules)")]
        mode: Option<String>,
    },
    /// List active rules
    #[command(
        about = "List rules",
        long_about = "List the rules of the active rule document with severity and localized title."
    )]
    Rules {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to a rule document (default: embedded rules)")]
        rules: Option<String>,
        #[arg(long, help = "Locale for titles, e.g. en, zh-CN")]
        locale: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}
