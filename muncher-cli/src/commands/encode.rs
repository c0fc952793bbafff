//! Implementation of the encode command.
//!
//! Inputs are processed strictly one after another. A problem with one input
//! (missing file, unusable streams, encoder failure) is reported and the queue
//! moves on; only invalid options abort the whole run.

use crate::cli::Cli;
use crate::error::{CliErrorContext, CliResult};

use muncher_core::external::{CrateFfprobeExecutor, SidecarSpawner};
use muncher_core::progress::stdout_status_line;
use muncher_core::{JobOutcome, check_dependencies, encode_input, plan_input, terminal};

use console::Term;
use log::{debug, info};
use serde::Serialize;

use std::path::Path;
use std::time::Instant;

/// Outcome counts of a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub encoded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Logs `value` as pretty JSON at debug level.
fn debug_dump<T: Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => debug!("{label}: {json}"),
        Err(e) => debug!("{label}: <unserializable: {e}>"),
    }
}

/// Asks whether `output` may be overwritten. Anything but `y` declines,
/// including a closed or non-interactive stdin.
fn confirm_overwrite(term: &Term, output: &Path) -> CliResult<bool> {
    terminal::print_warning(&format!(
        "The output file {} already exists! Overwrite? [Y/N]",
        output.display()
    ));
    let answer = term
        .read_line()
        .cli_context("Failed to read the overwrite confirmation")?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Runs the encode queue described by `cli`.
pub fn run_encode(cli: &Cli, color: bool) -> CliResult<RunSummary> {
    let run_start = Instant::now();
    let config = cli.to_config();
    config.validate()?;
    debug_dump("Options", &config);

    let prober = CrateFfprobeExecutor::new();
    let spawner = SidecarSpawner;
    let term = Term::stdout();

    let queue_len = cli.inputs.len();
    let multiple_inputs = queue_len > 1;
    let mut dependencies_checked = false;
    let mut summary = RunSummary::default();

    for (index, input) in cli.inputs.iter().enumerate() {
        let position = index + 1;
        debug!("Input #{position}: {}", input.display());

        if !input.exists() {
            terminal::print_error(
                "Input file does not exist",
                &input.display().to_string(),
                Some("Check the path passed to --input"),
            );
            summary.failed += 1;
            continue;
        }

        if !dependencies_checked {
            check_dependencies()?;
            dependencies_checked = true;
        }

        let plan = match plan_input(&prober, &config, input, cli.output.as_deref(), multiple_inputs) {
            Ok(plan) => plan,
            Err(e) => {
                terminal::print_error(
                    &format!("Cannot encode {}", input.display()),
                    &e.to_string(),
                    None,
                );
                summary.failed += 1;
                continue;
            }
        };
        debug_dump("Input metadata", &plan.metadata);
        debug!("Output: {} ({})", plan.output.display(), plan.kind);

        if plan.output.exists() && !config.overwrite {
            debug!("Output file already exists");
            if !confirm_overwrite(&term, &plan.output)? {
                info!("Aborted by user - output file already exists");
                summary.skipped += 1;
                continue;
            }
        }

        terminal::print_encoding_header(position, queue_len, input, &plan.output);
        let mut line = stdout_status_line(color);
        let report = match encode_input(&spawner, &config, &plan, position, queue_len, line.as_mut()) {
            Ok(report) => report,
            Err(e) => {
                terminal::print_error("Encoding failed", &e.to_string(), None);
                summary.failed += 1;
                continue;
            }
        };

        match report.outcome {
            JobOutcome::Success => {
                terminal::print_job_finished(&plan.output, report.elapsed.as_secs_f64());
                summary.encoded += 1;
            }
            JobOutcome::EncoderWarning { stderr } => {
                terminal::print_possible_encoder_error(&stderr);
                terminal::print_job_finished(&plan.output, report.elapsed.as_secs_f64());
                summary.encoded += 1;
            }
            JobOutcome::EncoderFailed { exit, stderr } => {
                terminal::print_encoder_failure(exit.code, &stderr);
                summary.failed += 1;
            }
        }
    }

    terminal::print_total_time(run_start.elapsed().as_secs_f64());
    debug!("Run summary: {summary:?}");
    Ok(summary)
}
