//! Terminal styling for pretty output.

use colored::Colorize;

/// Markers and colours shared by every command's pretty output.
pub(crate) struct Theme;

impl Theme {
    pub(crate) fn header(text: &str) -> String {
        text.bold().cyan().to_string()
    }

    /// A fulfilled outcome or a verified check.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {text}", "ok".green().bold())
    }

    /// A rejected outcome or a failed step.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "error".red().bold(), text.red())
    }

    /// A result that was produced but not verified.
    pub(crate) fn info(text: &str) -> String {
        format!("{} {text}", "=>".blue())
    }

    pub(crate) fn dimmed(text: &str) -> String {
        text.dimmed().to_string()
    }

    pub(crate) fn separator() -> String {
        "-".repeat(48).dimmed().to_string()
    }
}
