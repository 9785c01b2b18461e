//! Terminal output formatting.
//!
//! Human-readable lines use colored symbols; with `--json` every line is a
//! JSON object `{"type": ..., "payload": ...}` for scripting. The output
//! settings are passed to each handler rather than held globally.

use std::fmt::Display;

use owo_colors::OwoColorize;
use serde_json::json;

/// Output settings for one CLI invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
}

impl Output {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    fn suppressed(self) -> bool {
        !self.json && self.quiet
    }

    /// Emit a JSON line with type and payload structure.
    pub fn json_line(self, kind: &str, payload: serde_json::Value) {
        println!("{}", json!({ "type": kind, "payload": payload }));
    }

    /// Print a section header.
    pub fn section(self, title: &str) {
        if self.json {
            self.json_line("section", json!({ "title": title }));
            return;
        }
        if self.suppressed() {
            return;
        }
        println!();
        println!("{}", title.bold());
    }

    /// Print a labeled value.
    pub fn field(self, label: &str, value: impl Display) {
        let value = value.to_string();
        if self.json {
            self.json_line("field", json!({ "label": label, "value": value }));
            return;
        }
        if self.suppressed() {
            return;
        }
        println!("  {:<14} {}", label.dimmed(), value);
    }

    /// Print a preformatted block, indented.
    pub fn block(self, kind: &str, text: &str) {
        if self.json {
            self.json_line(kind, json!({ "text": text }));
            return;
        }
        if self.suppressed() {
            return;
        }
        for line in text.lines() {
            println!("  {line}");
        }
    }

    /// Print a success line.
    pub fn success(self, message: &str) {
        if self.json {
            self.json_line("success", json!({ "message": message }));
            return;
        }
        if self.suppressed() {
            return;
        }
        println!("  {} {}", "✓".green(), message);
    }

    /// Print a warning line.
    pub fn warning(self, message: &str) {
        if self.json {
            self.json_line("warning", json!({ "message": message }));
            return;
        }
        println!("  {} {}", "⚠".yellow(), message);
    }

    /// Format a highlighted value in cyan.
    #[must_use]
    pub fn highlight(self, value: impl Display) -> String {
        let value = value.to_string();
        if self.json {
            return value;
        }
        format!("{}", value.cyan())
    }

    /// Format a dimmed value.
    #[must_use]
    pub fn muted(self, value: impl Display) -> String {
        let value = value.to_string();
        if self.json {
            return value;
        }
        format!("{}", value.dimmed())
    }
}
