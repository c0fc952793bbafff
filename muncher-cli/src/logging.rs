// ============================================================================
// muncher-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: fern Dispatch for Console and Log File
//
// The core library prints its user-facing text through `log::info!`, so the
// console chain prints Info records bare and only labels warnings, errors and
// debug output. Records logged while the status line is live use the
// `muncher::progress` target and skip the console. The optional file chain
// gets every record with a timestamp and level, with ANSI escapes removed.
//
// KEY COMPONENTS:
// - init_logging: installs the global logger
// - use_color: NO_COLOR plus terminal colour support detection

use crate::error::{CliErrorContext, CliResult};

use log::{Level, LevelFilter};
use owo_colors::OwoColorize;
use supports_color::Stream;

use std::path::Path;

/// Target of records emitted while a status line is being redrawn. They would
/// break the in-place display, so only the log file receives them.
const PROGRESS_TARGET: &str = "muncher::progress";

fn shown_on_console(target: &str) -> bool {
    target != PROGRESS_TARGET
}

/// Whether the console output should carry colour.
///
/// Honours `NO_COLOR` and falls back to plain text when stdout is not a
/// colour-capable terminal.
#[must_use]
pub fn use_color() -> bool {
    muncher_core::terminal::should_use_color() && supports_color::on(Stream::Stdout).is_some()
}

/// Removes ANSI escape sequences from a rendered log message.
fn strip_ansi(message: &str) -> String {
    strip_ansi_escapes::strip_str(message)
}

/// Console label for a record, `None` for plain Info output.
fn console_label(level: Level, color: bool) -> Option<String> {
    let label = match level {
        Level::Error => "Error:",
        Level::Warn => "Warning:",
        Level::Info => return None,
        Level::Debug => "[debug]",
        Level::Trace => "[trace]",
    };
    if !color {
        return Some(label.to_string());
    }
    Some(match level {
        Level::Error => label.red().bold().underline().to_string(),
        Level::Warn => label.yellow().bold().to_string(),
        _ => label.dimmed().to_string(),
    })
}

/// Installs the global logger.
///
/// `debug` lowers the level to Debug. With `log_file` every record is also
/// appended to that file.
pub fn init_logging(debug: bool, log_file: Option<&Path>, color: bool) -> CliResult<()> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let console = fern::Dispatch::new()
        .filter(|metadata| shown_on_console(metadata.target()))
        .format(move |out, message, record| {
            let text = message.to_string();
            let text = if color { text } else { strip_ansi(&text) };
            match console_label(record.level(), color) {
                Some(label) => out.finish(format_args!("{label} {text}")),
                None => out.finish(format_args!("{text}")),
            }
        })
        .chain(std::io::stdout());

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        .level_for("ffmpeg_sidecar", LevelFilter::Warn)
        .chain(console);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .cli_with_context(|| format!("Failed to create log directory '{}'", parent.display()))?;
        }
        let file = fern::log_file(path)
            .cli_with_context(|| format!("Failed to open log file '{}'", path.display()))?;

        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} [{}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                        record.level(),
                        strip_ansi(&message.to_string())
                    ))
                })
                .chain(file),
        );
    }

    dispatch.apply().map_err(|e| {
        muncher_core::CoreError::OperationFailed(format!("Failed to initialise logging: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_labels() {
        assert_eq!(console_label(Level::Info, false), None);
        assert_eq!(console_label(Level::Warn, false).as_deref(), Some("Warning:"));
        assert_eq!(console_label(Level::Error, false).as_deref(), Some("Error:"));

        let colored = console_label(Level::Error, true).unwrap();
        assert_eq!(strip_ansi(&colored), "Error:");
    }

    #[test]
    fn test_progress_records_stay_off_the_console() {
        assert!(!shown_on_console("muncher::progress"));
        assert!(shown_on_console("muncher_core::orchestrator"));
        assert!(shown_on_console("muncher_cli::commands::encode"));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[32mFinished\x1b[0m encoding"), "Finished encoding");
    }
}
