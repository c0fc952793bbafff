//! Encoding jobs and their lifecycle.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// One encoder invocation.
///
/// Built once per queued input and consumed by the orchestrator when it runs,
/// so a job can never be started twice.
#[derive(Debug, Clone, Serialize)]
pub struct EncodingJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Expected length of the output in seconds, the 100% mark of the bar.
    pub total_duration: f64,
    /// ffmpeg `-stats_period`, in seconds
    pub stats_period: f64,
    /// ffmpeg `-loglevel`
    pub loglevel: String,
    pub debug: bool,
    /// Complete encoder argument list
    pub args: Vec<String>,
    /// User-fixed bar width; `None` sizes it from the terminal
    pub bar_width: Option<usize>,
    /// 1-based position in the queue
    pub position: usize,
    pub queue_len: usize,
}

/// Lifecycle of a job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    NotStarted,
    /// The encoder is running and its streams are being consumed.
    Running,
    /// The progress stream closed and the process exited.
    Finished,
    /// Exit status, diagnostics and output file were checked.
    Reconciled,
}

impl JobPhase {
    /// Moves to `next`, which must directly follow the current phase.
    pub fn advance(self, next: JobPhase) -> CoreResult<JobPhase> {
        let allowed = matches!(
            (self, next),
            (JobPhase::NotStarted, JobPhase::Running)
                | (JobPhase::Running, JobPhase::Finished)
                | (JobPhase::Finished, JobPhase::Reconciled)
        );

        if allowed {
            log::trace!("Job phase {self} -> {next}");
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobPhase::NotStarted => "not started",
            JobPhase::Running => "running",
            JobPhase::Finished => "finished",
            JobPhase::Reconciled => "reconciled",
        };
        f.write_str(name)
    }
}
