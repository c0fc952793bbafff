// ============================================================================
// muncher-cli/src/main.rs
// ============================================================================
//
// MUNCHER CLI: Main Entry Point
//
// Parses the arguments, installs the logger and runs the encode queue. The
// process exits with status 1 when the options are invalid, a dependency is
// missing, or any queued input failed.

use clap::Parser;
use muncher_cli::{Cli, init_logging, run_encode, use_color};
use owo_colors::OwoColorize;
use std::process;

fn report_fatal(error: &dyn std::fmt::Display, color: bool) {
    if color {
        eprintln!("{} {error}", "Error:".red().bold());
    } else {
        eprintln!("Error: {error}");
    }
}

fn main() {
    let cli = Cli::parse();
    let color = use_color();

    if let Err(e) = init_logging(cli.debug, cli.log_file.as_deref(), color) {
        report_fatal(&e, color);
        process::exit(1);
    }

    match run_encode(&cli, color) {
        Ok(summary) if summary.is_success() => {}
        Ok(summary) => {
            log::debug!("{} input(s) failed", summary.failed);
            process::exit(1);
        }
        Err(e) => {
            report_fatal(&e, color);
            process::exit(1);
        }
    }
}
