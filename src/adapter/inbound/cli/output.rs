//! CLI output formatting.
//!
//! Human-readable output uses colored symbols and `tabled` tables. With
//! `--json` every command instead prints exactly one JSON document on
//! stdout, so scripts can pipe it straight into `jq`.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

use crate::error::Result;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_config(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// Human output is suppressed in quiet mode; JSON is never suppressed.
fn suppressed(config: OutputConfig) -> bool {
    config.json || config.quiet
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    write_config(config);
}

#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

#[must_use]
pub fn is_quiet() -> bool {
    read_config().quiet
}

/// Print the application header with name and version.
pub fn header(version: &str) {
    if suppressed(read_config()) {
        return;
    }
    println!("{} {}", "wagerbook".bold(), version.dimmed());
    println!();
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    if suppressed(read_config()) {
        return;
    }
    println!("  {:<14} {}", label.dimmed(), value);
}

/// Print a success line.
pub fn success(message: &str) {
    if suppressed(read_config()) {
        return;
    }
    println!("  {} {}", "✓".green(), message);
}

/// Print a warning line. Shown even in quiet mode.
pub fn warning(message: &str) {
    if read_config().json {
        return;
    }
    println!("  {} {}", "⚠".yellow(), message);
}

/// Print an error line on stderr.
pub fn error(message: &str) {
    if read_config().json {
        eprintln!(
            "{}",
            json!({
                "type": "error",
                "payload": { "message": message },
            })
        );
        return;
    }
    eprintln!("  {} {}", "×".red(), message);
}

/// Print a section header.
pub fn section(title: &str) {
    if suppressed(read_config()) {
        return;
    }
    println!();
    println!("{}", title.bold());
}

/// Print a dimmed note.
pub fn note(message: &str) {
    if suppressed(read_config()) {
        return;
    }
    println!("  {}", message.dimmed());
}

/// Print multiple lines of content, each indented.
pub fn lines(content: &str) {
    if suppressed(read_config()) {
        return;
    }
    for line in content.lines() {
        println!("  {line}");
    }
}

/// Emit the JSON document for `command`.
///
/// The payload is flattened into an object tagged with the command name.
pub fn json_output(command: &str, payload: impl Serialize) -> Result<()> {
    let mut value = serde_json::to_value(payload)?;
    match value.as_object_mut() {
        Some(object) => {
            object.insert("command".to_string(), json!(command));
        }
        None => value = json!({ "command": command, "result": value }),
    }
    println!("{value}");
    Ok(())
}

/// Format a signed credit amount, green when positive and red when negative.
pub fn signed(value: i64) -> String {
    let text = if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    };
    if is_json() {
        return text;
    }
    match value.signum() {
        1 => format!("{}", text.green()),
        -1 => format!("{}", text.red()),
        _ => text,
    }
}

/// Format a dimmed/muted value.
pub fn muted(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    format!("{}", value.dimmed())
}

/// Format a percentage from a ratio.
#[must_use]
pub fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_formats_one_decimal() {
        assert_eq!(percent(0.5), "50.0%");
        assert_eq!(percent(-0.125), "-12.5%");
        assert_eq!(percent(0.0), "0.0%");
    }
}
