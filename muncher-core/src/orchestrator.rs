// ============================================================================
// muncher-core/src/orchestrator.rs
// ============================================================================
//
// PROCESS ORCHESTRATOR: Running One Encoder Job
//
// Starts the encoder, feeds its stdout to the progress parser and drains its
// stderr, each on its own scoped thread, while this thread waits for the
// process to exit. Once all three are done the exit status, the diagnostics
// and the output file are reconciled into a JobReport.
//
// Both orderings of "pipe closed" and "process exited" are valid: nothing
// here depends on which happens first.

use std::io::Read;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{CoreError, CoreResult};
use crate::external::{EncoderProcess, EncoderSpawner, OutputPipe, ProcessExit};
use crate::job::{EncodingJob, JobPhase};
use crate::progress::{ParseSummary, ProgressState, ProgressStreamParser, StatusLine};

/// How an encoder run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Clean exit without diagnostics.
    Success,
    /// Clean exit, but the encoder printed diagnostics.
    EncoderWarning { stderr: String },
    /// The encoder exited with an error.
    EncoderFailed { exit: ProcessExit, stderr: String },
}

impl JobOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, JobOutcome::EncoderFailed { .. })
    }
}

/// Result of a reconciled job.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub outcome: JobOutcome,
    /// Wall time from spawn to reconciliation.
    pub elapsed: Duration,
    pub summary: ParseSummary,
}

/// Classifies an exit status together with the captured stderr.
#[must_use]
pub fn reconcile_exit(exit: ProcessExit, stderr: String) -> JobOutcome {
    if !exit.success {
        JobOutcome::EncoderFailed { exit, stderr }
    } else if stderr.trim().is_empty() {
        JobOutcome::Success
    } else {
        JobOutcome::EncoderWarning { stderr }
    }
}

/// Runs `job` to completion, drawing progress on `line`.
///
/// Encoder failures are reported through [`JobOutcome`]; only problems outside
/// the encoder (spawn failures, a missing output file after a clean exit) are
/// errors.
pub fn run_encoding_job<S: EncoderSpawner>(
    spawner: &S,
    job: EncodingJob,
    line: &mut dyn StatusLine,
) -> CoreResult<JobReport> {
    let mut phase = JobPhase::NotStarted;
    log::debug!(
        "Starting job {}/{}: {} -> {}",
        job.position,
        job.queue_len,
        job.input.display(),
        job.output.display()
    );
    if job.debug {
        log::debug!("Encoder arguments: {:?}", job.args);
    }

    let started = Instant::now();
    let mut process = spawner.spawn(&job.args)?;
    phase = phase.advance(JobPhase::Running)?;

    let stdout = take_pipe(process.take_stdout(), "stdout")?;
    let stderr = take_pipe(process.take_stderr(), "stderr")?;

    let state = ProgressState::new(job.total_duration, job.bar_width, started);
    let mut parser = ProgressStreamParser::new(state, line);
    if let Err(e) = parser.draw_initial() {
        log::debug!("Initial status line draw failed: {e}");
    }

    let (summary, stderr_text, exit) = thread::scope(|scope| {
        let stderr_reader = scope.spawn(move || drain_to_string(stderr));
        let progress_reader = scope.spawn(|| parser.run(stdout));

        let exit = process.wait();

        let summary = progress_reader.join().map_err(|_| {
            CoreError::OperationFailed("Progress parser thread panicked".to_string())
        });
        let stderr_text = stderr_reader.join().map_err(|_| {
            CoreError::OperationFailed("Stderr reader thread panicked".to_string())
        });
        (summary, stderr_text, exit)
    });
    let (summary, stderr_text, exit) = (summary?, stderr_text?, exit?);
    phase = phase.advance(JobPhase::Finished)?;

    if let Err(e) = parser.finish() {
        log::debug!("Final status line draw failed: {e}");
    }
    log::debug!(
        "Encoder finished with {exit}, {} bytes of diagnostics",
        stderr_text.len()
    );

    let outcome = reconcile_exit(exit, stderr_text);
    ensure_output(&outcome, &job.output)?;
    phase.advance(JobPhase::Reconciled)?;

    Ok(JobReport {
        outcome,
        elapsed: started.elapsed(),
        summary,
    })
}

/// Runs an encoder without a progress display, collecting its diagnostics.
///
/// Stdout is drained and discarded alongside stderr so neither pipe can fill
/// up and stall the process.
pub fn run_to_completion<S: EncoderSpawner>(
    spawner: &S,
    args: &[String],
) -> CoreResult<(ProcessExit, String)> {
    let mut process = spawner.spawn(args)?;
    let stdout = take_pipe(process.take_stdout(), "stdout")?;
    let stderr = take_pipe(process.take_stderr(), "stderr")?;

    let (stderr_text, exit) = thread::scope(|scope| {
        let stdout_reader = scope.spawn(move || drain_to_string(stdout));
        let stderr_reader = scope.spawn(move || drain_to_string(stderr));

        let exit = process.wait();

        let stdout_done = stdout_reader.join();
        let stderr_text = stderr_reader.join();
        let stderr_text = match (stdout_done, stderr_text) {
            (Ok(_), Ok(text)) => Ok(text),
            _ => Err(CoreError::OperationFailed(
                "Encoder output reader thread panicked".to_string(),
            )),
        };
        (stderr_text, exit)
    });

    Ok((exit?, stderr_text?))
}

/// Fails with [`CoreError::OutputMissing`] when a cleanly exited encoder left
/// no output file behind.
pub(crate) fn ensure_output(outcome: &JobOutcome, output: &Path) -> CoreResult<()> {
    if !outcome.is_failure() && !output.exists() {
        log::error!("Encoder exited cleanly but {} is missing", output.display());
        return Err(CoreError::OutputMissing(output.to_path_buf()));
    }
    Ok(())
}

fn take_pipe(pipe: Option<OutputPipe>, name: &str) -> CoreResult<OutputPipe> {
    pipe.ok_or_else(|| CoreError::OperationFailed(format!("Encoder {name} was not captured")))
}

fn drain_to_string(mut pipe: OutputPipe) -> String {
    let mut buffer = Vec::new();
    if let Err(e) = pipe.read_to_end(&mut buffer) {
        log::warn!(
            target: "muncher::progress",
            "Reading encoder output failed after {} bytes: {e}",
            buffer.len()
        );
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
