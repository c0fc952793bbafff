//! Terminal UI helpers for muncher.
//!
//! Everything except the live status line goes through the `log` facade at
//! `info` level, so the CLI's logger decides where the text ends up. The
//! status line itself writes to stdout directly (see [`crate::progress`]).

use console::{Term, style};
use log::info;
use owo_colors::OwoColorize;
use std::path::Path;

use crate::utils::{compact_time, display_name};

/// Visual hierarchy levels in the CLI output.
#[derive(Debug, Clone, Copy)]
pub enum OutputLevel {
    /// Key-value status information
    Status,
    /// Additional details
    Detail,
}

impl OutputLevel {
    fn indent(self) -> &'static str {
        match self {
            OutputLevel::Status => "      ",
            OutputLevel::Detail => "        ",
        }
    }
}

/// Current column count of the terminal attached to stdout.
///
/// Returns `None` when stdout is not a terminal or the size cannot be read.
#[must_use]
pub fn terminal_columns() -> Option<usize> {
    Term::stdout()
        .size_checked()
        .map(|(_rows, cols)| usize::from(cols))
        .filter(|&cols| cols > 0)
}

/// Check if color should be used (respects NO_COLOR environment variable)
#[must_use]
pub fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Print an item at the specified hierarchy level
pub fn print_item(level: OutputLevel, symbol: Option<&str>, text: &str, bold: bool) {
    let indent = level.indent();
    let prefix = symbol.map(|sym| format!("{sym} ")).unwrap_or_default();

    if should_use_color() && bold {
        info!("{indent}{prefix}{}", style(text).bold());
    } else {
        info!("{indent}{prefix}{text}");
    }
}

/// Print a sub-item under a processing step
pub fn print_sub_item(message: &str) {
    print_item(OutputLevel::Detail, None, message, false);
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let label_width = 15;
    let label_len = label.chars().count();
    let padding = if label_len < label_width {
        label_width - label_len
    } else {
        1
    };
    let indent = OutputLevel::Status.indent();

    if should_use_color() && highlight {
        info!("{indent}{label}:{} {}", " ".repeat(padding), value.bold());
    } else {
        info!("{indent}{label}:{} {value}", " ".repeat(padding));
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    if should_use_color() {
        info!("  ✓ {}", message.green());
    } else {
        info!("  ✓ {message}");
    }
}

/// Print a warning message
pub fn print_warning(message: &str) {
    if should_use_color() {
        info!("  ⚠ {}", message.yellow());
    } else {
        info!("  ⚠ {message}");
    }
}

/// Print an error message
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    if should_use_color() {
        info!("  ✗ {}", title.red().bold());
    } else {
        info!("  ✗ {title}");
    }
    info!("    {message}");

    if let Some(suggestion_text) = suggestion {
        info!("    Suggestion: {suggestion_text}");
    }
}

/// Print the `[n/m] Encoding file X to Y` header of a queued job.
///
/// The counter is left out when the queue holds a single file.
pub fn print_encoding_header(position: usize, total: usize, input: &Path, output: &Path) {
    let counter = if total > 1 {
        format!("[{position}/{total}] ")
    } else {
        String::new()
    };
    if should_use_color() {
        info!(
            "{}Encoding file {} to {}",
            counter.bold(),
            display_name(input).cyan(),
            display_name(output).cyan()
        );
    } else {
        info!(
            "{counter}Encoding file {} to {}",
            display_name(input),
            display_name(output)
        );
    }
}

/// Print the completion line of a job.
pub fn print_job_finished(output: &Path, elapsed_secs: f64) {
    print_success(&format!(
        "Finished encoding {} in {}",
        display_name(output),
        compact_time(elapsed_secs)
    ));
}

/// Print the stderr of an encoder that exited successfully but complained.
pub fn print_possible_encoder_error(stderr: &str) {
    print_warning("Possible encoder error:");
    for line in stderr.lines().filter(|line| !line.trim().is_empty()) {
        print_sub_item(line);
    }
}

/// Print the stderr of an encoder that exited with an error.
pub fn print_encoder_failure(exit_code: Option<i32>, stderr: &str) {
    let title = match exit_code {
        Some(code) => format!("Encoder exited with code {code}"),
        None => "Encoder was terminated by a signal".to_string(),
    };
    let mut lines = stderr.lines().filter(|line| !line.trim().is_empty()).peekable();
    if lines.peek().is_none() {
        print_error(&title, "no diagnostics were printed", None);
        return;
    }

    if should_use_color() {
        info!("  ✗ {}", title.red().bold());
    } else {
        info!("  ✗ {title}");
    }
    for line in lines {
        print_sub_item(line);
    }
}

/// Print the wall time of the whole run.
pub fn print_total_time(elapsed_secs: f64) {
    info!("");
    print_status("Total time elapsed", &compact_time(elapsed_secs), true);
}
