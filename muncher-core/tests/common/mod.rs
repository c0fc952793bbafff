// muncher-core/tests/common/mod.rs
//
// Scripted stand-ins for the encoder and the prober.

#![allow(dead_code)]

use muncher_core::error::{CoreError, CoreResult};
use muncher_core::external::{EncoderProcess, EncoderSpawner, MediaProber, OutputPipe, ProcessExit};
use muncher_core::media::MediaMetadata;
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

/// What one spawned encoder prints and how it exits.
#[derive(Debug, Clone)]
pub struct ScriptedRun {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit: ProcessExit,
    /// Write the last argument (the output path) as a file on spawn.
    pub create_output: bool,
}

impl ScriptedRun {
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
            exit: ProcessExit::success(),
            create_output: true,
        }
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.as_bytes().to_vec();
        self
    }

    pub fn with_exit(mut self, exit: ProcessExit) -> Self {
        self.exit = exit;
        self
    }

    pub fn without_output(mut self) -> Self {
        self.create_output = false;
        self
    }
}

/// Mock process handing out in-memory pipes.
pub struct MockProcess {
    stdout: Option<Vec<u8>>,
    stderr: Option<Vec<u8>>,
    exit: ProcessExit,
}

impl EncoderProcess for MockProcess {
    fn take_stdout(&mut self) -> Option<OutputPipe> {
        self.stdout
            .take()
            .map(|bytes| Box::new(Cursor::new(bytes)) as OutputPipe)
    }

    fn take_stderr(&mut self) -> Option<OutputPipe> {
        self.stderr
            .take()
            .map(|bytes| Box::new(Cursor::new(bytes)) as OutputPipe)
    }

    fn wait(&mut self) -> CoreResult<ProcessExit> {
        Ok(self.exit)
    }
}

/// Mock spawner replaying scripted runs in order and recording every call.
#[derive(Default)]
pub struct MockSpawner {
    runs: Mutex<VecDeque<ScriptedRun>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockSpawner {
    pub fn new(runs: Vec<ScriptedRun>) -> Self {
        Self {
            runs: Mutex::new(runs.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.runs.lock().unwrap().len()
    }
}

impl EncoderSpawner for MockSpawner {
    type Process = MockProcess;

    fn spawn(&self, args: &[String]) -> CoreResult<Self::Process> {
        self.calls.lock().unwrap().push(args.to_vec());
        let run = self.runs.lock().unwrap().pop_front().ok_or_else(|| {
            CoreError::OperationFailed(format!("Unexpected encoder call: {args:?}"))
        })?;

        if run.create_output {
            if let Some(output) = args.last() {
                std::fs::write(output, b"munched")?;
            }
        }

        Ok(MockProcess {
            stdout: Some(run.stdout),
            stderr: Some(run.stderr),
            exit: run.exit,
        })
    }
}

/// Spawns a real `sh -c <script>` in place of the encoder.
///
/// The script gets the job's output path (the last encoder argument) as `$1`.
pub struct ShellSpawner {
    pub script: String,
}

pub struct ShellProcess(Child);

impl EncoderProcess for ShellProcess {
    fn take_stdout(&mut self) -> Option<OutputPipe> {
        self.0.stdout.take().map(|pipe| Box::new(pipe) as OutputPipe)
    }

    fn take_stderr(&mut self) -> Option<OutputPipe> {
        self.0.stderr.take().map(|pipe| Box::new(pipe) as OutputPipe)
    }

    fn wait(&mut self) -> CoreResult<ProcessExit> {
        Ok(ProcessExit::from(self.0.wait()?))
    }
}

impl EncoderSpawner for ShellSpawner {
    type Process = ShellProcess;

    fn spawn(&self, args: &[String]) -> CoreResult<Self::Process> {
        let child = Command::new("sh")
            .arg("-c")
            .arg(&self.script)
            .arg("sh")
            .args(args.last())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        Ok(ShellProcess(child))
    }
}

/// Mock prober answering from a fixed table.
#[derive(Default)]
pub struct MockProber {
    media: HashMap<PathBuf, MediaMetadata>,
}

impl MockProber {
    pub fn with(mut self, path: &Path, metadata: MediaMetadata) -> Self {
        self.media.insert(path.to_path_buf(), metadata);
        self
    }
}

impl MediaProber for MockProber {
    fn probe(&self, path: &Path) -> CoreResult<MediaMetadata> {
        self.media
            .get(path)
            .cloned()
            .ok_or_else(|| CoreError::MediaInfo(format!("No mock metadata for {}", path.display())))
    }
}

/// One `-progress -` block as ffmpeg prints it.
pub fn progress_block(frame: u64, out_time: &str, last: bool) -> String {
    format!(
        "frame={frame}\nfps=0.00\nbitrate=N/A\nout_time_us=0\nout_time={out_time}\nspeed=1.00x\nprogress={}\n",
        if last { "end" } else { "continue" }
    )
}

pub fn clip(duration: f64) -> MediaMetadata {
    MediaMetadata {
        duration,
        width: 1280,
        height: 720,
        frame_rate: 30.0,
        frame_count: Some((duration * 30.0) as u64),
        has_video: true,
        has_audio: true,
    }
}

pub fn still() -> MediaMetadata {
    MediaMetadata {
        duration: 0.04,
        width: 800,
        height: 600,
        frame_rate: 25.0,
        frame_count: Some(1),
        has_video: true,
        has_audio: false,
    }
}

/// Creates an empty input file inside `dir`.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"input").unwrap();
    path
}
