// ============================================================================
// muncher-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: Encoder Process Management and Abstraction
//
// This module provides the seam between the orchestrator and the encoder
// process. The orchestrator only sees EncoderSpawner and EncoderProcess, so
// tests can substitute scripted processes for ffmpeg.
//
// KEY COMPONENTS:
// - EncoderProcess: a running encoder with its two output pipes
// - EncoderSpawner: creates encoder processes from an argument list
// - SidecarSpawner: concrete implementation using ffmpeg-sidecar
// - ProcessExit: portable exit status

use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::fmt;
use std::io::Read;
use std::process::{ExitStatus, Stdio};

// --- Process exit ---

/// Exit status of a finished encoder process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub success: bool,
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessExit {
    /// A clean exit with code 0.
    #[must_use]
    pub fn success() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    /// An exit with the given code; only 0 counts as success.
    #[must_use]
    pub fn with_code(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
        }
    }
}

impl From<ExitStatus> for ProcessExit {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "termination by signal"),
        }
    }
}

// --- Encoder Execution Abstraction ---

/// Boxed pipe handed to the stream consumers.
pub type OutputPipe = Box<dyn Read + Send>;

/// Trait representing an active encoder process.
pub trait EncoderProcess: Send {
    /// Takes ownership of the process stdout. Returns `None` on later calls.
    fn take_stdout(&mut self) -> Option<OutputPipe>;

    /// Takes ownership of the process stderr. Returns `None` on later calls.
    fn take_stderr(&mut self) -> Option<OutputPipe>;

    /// Waits for the process to exit.
    fn wait(&mut self) -> CoreResult<ProcessExit>;
}

/// Trait representing something that can spawn an [`EncoderProcess`].
pub trait EncoderSpawner {
    type Process: EncoderProcess;

    /// Starts the encoder with `args`, stdout and stderr piped.
    fn spawn(&self, args: &[String]) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `EncoderProcess`.
pub struct SidecarProcess(SidecarChild);

impl EncoderProcess for SidecarProcess {
    fn take_stdout(&mut self) -> Option<OutputPipe> {
        self.0
            .take_stdout()
            .map(|stdout| Box::new(stdout) as OutputPipe)
    }

    fn take_stderr(&mut self) -> Option<OutputPipe> {
        self.0
            .take_stderr()
            .map(|stderr| Box::new(stderr) as OutputPipe)
    }

    fn wait(&mut self) -> CoreResult<ProcessExit> {
        self.0
            .wait()
            .map(ProcessExit::from)
            .map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Concrete implementation of `EncoderSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl EncoderSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, args: &[String]) -> CoreResult<Self::Process> {
        if args.is_empty() {
            return Err(CoreError::OperationFailed(
                "Refusing to start ffmpeg without arguments".to_string(),
            ));
        }

        let mut cmd = FfmpegCommand::new();
        cmd.args(args);
        cmd.as_inner_mut()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        log::debug!("Running ffmpeg command: {cmd:?}");

        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_exit_display() {
        assert_eq!(ProcessExit::success().to_string(), "exit code 0");
        assert_eq!(ProcessExit::with_code(1).to_string(), "exit code 1");
        let killed = ProcessExit {
            success: false,
            code: None,
        };
        assert_eq!(killed.to_string(), "termination by signal");
    }

    #[test]
    fn test_only_zero_code_is_success() {
        assert!(ProcessExit::with_code(0).success);
        assert!(!ProcessExit::with_code(69).success);
    }
}
