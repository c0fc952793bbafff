// muncher-core/tests/orchestrator_tests.rs

mod common;

use common::{MockSpawner, ScriptedRun, ShellSpawner, progress_block};
use muncher_core::error::CoreError;
use muncher_core::external::ProcessExit;
use muncher_core::job::EncodingJob;
use muncher_core::orchestrator::{JobOutcome, run_encoding_job};
use muncher_core::progress::PlainStatusLine;
use std::path::Path;
use tempfile::tempdir;

fn job(output: &Path, total_duration: f64) -> EncodingJob {
    EncodingJob {
        input: output.with_file_name("in.mov"),
        output: output.to_path_buf(),
        total_duration,
        stats_period: 0.0167,
        loglevel: "error".to_string(),
        debug: true,
        args: vec![
            "-i".to_string(),
            "in.mov".to_string(),
            output.to_string_lossy().into_owned(),
        ],
        bar_width: Some(10),
        position: 1,
        queue_len: 1,
    }
}

fn committed_lines(line: PlainStatusLine<Vec<u8>>) -> Vec<String> {
    String::from_utf8(line.into_inner())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_successful_job_draws_every_stats_line() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("out.mp4");
    let stdout = format!(
        "{}{}",
        progress_block(30, "00:00:01.000000", false),
        progress_block(120, "00:00:04.000000", true)
    );
    let spawner = MockSpawner::new(vec![ScriptedRun::success(stdout)]);
    let mut line = PlainStatusLine::new(Vec::new());

    let report = run_encoding_job(&spawner, job(&output, 4.0), &mut line)?;

    assert_eq!(report.outcome, JobOutcome::Success);
    assert_eq!(report.summary.records, 6);
    assert_eq!(report.summary.stats_lines, 2);
    assert_eq!(spawner.calls().len(), 1);

    // Initial empty bar, one line per stats block, final forced draw
    let lines = committed_lines(line);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "[>..........] 0.0%");
    assert!(lines[1].starts_with("[##>........] 25.0% time: 1.0s"));
    assert!(lines[2].starts_with("[###########] 100.0% time: 4.0s"));
    assert!(lines[3].starts_with("[###########] 100.0%"));
    Ok(())
}

#[test]
fn test_clean_exit_with_diagnostics_is_a_warning() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("out.mp4");
    let spawner = MockSpawner::new(vec![
        ScriptedRun::success(progress_block(1, "00:00:00.500000", true))
            .with_stderr("Past duration 0.999992 too large\n"),
    ]);
    let mut line = PlainStatusLine::new(Vec::new());

    let report = run_encoding_job(&spawner, job(&output, 1.0), &mut line)?;

    assert_eq!(
        report.outcome,
        JobOutcome::EncoderWarning {
            stderr: "Past duration 0.999992 too large\n".to_string()
        }
    );
    Ok(())
}

#[test]
fn test_failed_encoder_is_reported_not_raised() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("out.mp4");
    let spawner = MockSpawner::new(vec![
        ScriptedRun::success(progress_block(5, "00:00:00.200000", false))
            .with_stderr("Invalid argument\n")
            .with_exit(ProcessExit::with_code(1))
            .without_output(),
    ]);
    let mut line = PlainStatusLine::new(Vec::new());

    let report = run_encoding_job(&spawner, job(&output, 2.0), &mut line)?;

    match report.outcome {
        JobOutcome::EncoderFailed { exit, stderr } => {
            assert_eq!(exit.code, Some(1));
            assert_eq!(stderr, "Invalid argument\n");
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    // The display still completes
    let lines = committed_lines(line);
    assert!(lines.last().unwrap().contains("100.0%"));
    Ok(())
}

#[test]
fn test_missing_output_after_clean_exit() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.mp4");
    let spawner = MockSpawner::new(vec![
        ScriptedRun::success(progress_block(1, "00:00:01.000000", true)).without_output(),
    ]);
    let mut line = PlainStatusLine::new(Vec::new());

    let err = run_encoding_job(&spawner, job(&output, 1.0), &mut line).unwrap_err();
    assert!(matches!(err, CoreError::OutputMissing(path) if path == output));
}

#[test]
fn test_job_without_telemetry_still_completes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("out.mp4");
    let spawner = MockSpawner::new(vec![ScriptedRun::success(Vec::new())]);
    let mut line = PlainStatusLine::new(Vec::new());

    let report = run_encoding_job(&spawner, job(&output, 3.0), &mut line)?;

    assert_eq!(report.summary.records, 0);
    assert_eq!(report.summary.stats_lines, 0);
    let lines = committed_lines(line);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "[>..........] 0.0%");
    // The bar completes, but no media time was ever reported
    assert!(lines[1].starts_with("[###########] 100.0% time: 0.0s ETA: 0.0s"));
    Ok(())
}

#[test]
fn test_spawn_failure_is_an_error() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.mp4");
    let spawner = MockSpawner::new(Vec::new());
    let mut line = PlainStatusLine::new(Vec::new());

    let err = run_encoding_job(&spawner, job(&output, 1.0), &mut line).unwrap_err();
    assert!(matches!(err, CoreError::OperationFailed(_)));
}

#[cfg(unix)]
#[test]
fn test_full_stderr_pipe_does_not_stall_the_encoder() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("out.mp4");
    // Well past a pipe buffer of diagnostics before the first telemetry byte
    let spawner = ShellSpawner {
        script: format!(
            "yes 'Past duration too large' | head -n 10000 >&2; printf '{}'; : > \"$1\"",
            progress_block(30, "00:00:01.000000", true).replace('\n', "\\n")
        ),
    };
    let mut line = PlainStatusLine::new(Vec::new());

    let report = run_encoding_job(&spawner, job(&output, 1.0), &mut line)?;

    match report.outcome {
        JobOutcome::EncoderWarning { stderr } => {
            assert_eq!(stderr.lines().count(), 10_000);
            assert!(stderr.len() > 128 * 1024);
        }
        other => panic!("expected a warning, got {other:?}"),
    }
    assert_eq!(report.summary.stats_lines, 1);
    assert!(output.exists());

    let lines = committed_lines(line);
    assert!(lines[1].starts_with("[###########] 100.0% time: 1.0s"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_full_stdout_pipe_does_not_stall_the_encoder() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("out.mp4");
    // Unrecognised records flood stdout while stderr stays open
    let spawner = ShellSpawner {
        script: "yes 'progress=continue' | head -n 20000; echo 'speed=1x'; echo oops >&2; exit 3"
            .to_string(),
    };
    let mut line = PlainStatusLine::new(Vec::new());

    let report = run_encoding_job(&spawner, job(&output, 1.0), &mut line)?;

    match report.outcome {
        JobOutcome::EncoderFailed { exit, stderr } => {
            assert_eq!(exit.code, Some(3));
            assert_eq!(stderr, "oops\n");
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    assert_eq!(report.summary.stats_lines, 1);
    Ok(())
}
