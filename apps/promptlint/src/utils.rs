//! Supporting helpers: colored message prefixes and text statistics.

use crate::models::TextStats;
use owo_colors::OwoColorize;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if colors_enabled() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if colors_enabled() {
        "note:".yellow().bold().to_string()
    } else {
        "note:".to_string()
    }
}

pub fn info_prefix() -> String {
    if colors_enabled() {
        "info:".blue().bold().to_string()
    } else {
        "info:".to_string()
    }
}

/// Line, word and char counts. Empty text has zero lines.
pub fn text_stats(text: &str) -> TextStats {
    let lines = if text.is_empty() {
        0
    } else {
        text.lines().count().max(1)
    };
    TextStats {
        lines,
        words: text.split_whitespace().count(),
        chars: text.chars().count(),
    }
}
