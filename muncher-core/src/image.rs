//! Repeated lossy compression of still images.
//!
//! The first pass applies the filters and writes a low quality JPEG. With
//! `--loop N` the result is then re-encoded through a rotation of lossy codecs
//! inside a scratch directory, and the last pass writes the output as JPEG
//! again. Each completed pass redraws the status line with the pass count as
//! progress.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::MunchConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{EncoderSpawner, IMAGE_OUTPUT_QUALITY, ImageCodec, build_image_pass_args};
use crate::filters::{OutputGeometry, image_filter_chain};
use crate::orchestrator::{JobOutcome, JobReport, ensure_output, reconcile_exit, run_to_completion};
use crate::progress::{ParseSummary, ProgressState, StatusLine, colored_progress_bar, progress_bar};
use crate::utils::compact_time;

/// Codec of intermediate pass `pass` (2-based), cycling webp, x264, mjpeg.
#[must_use]
pub fn intermediate_codec(pass: u32, preset: u8) -> ImageCodec {
    let preset = u32::from(preset.max(1));
    match (pass.saturating_sub(2)) % 3 {
        0 => ImageCodec::Webp {
            compression_level: (7 / preset).saturating_sub(1),
            quality: (preset * 12 + 16).min(100),
        },
        1 => ImageCodec::X264 {
            crf: preset * 51 / 7,
        },
        _ => ImageCodec::Mjpeg {
            quality: preset * 3 + 10,
        },
    }
}

/// One planned pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePass {
    /// 1-based pass number
    pub number: u32,
    pub input: PathBuf,
    pub output: PathBuf,
    pub codec: ImageCodec,
    /// Whether the run's filters are applied in this pass
    pub filtered: bool,
}

/// Plans `passes` passes from `input` to `output`, with intermediates in
/// `scratch`.
#[must_use]
pub fn plan_passes(
    input: &Path,
    output: &Path,
    scratch: &Path,
    passes: u32,
    preset: u8,
) -> Vec<ImagePass> {
    let final_codec = ImageCodec::Mjpeg {
        quality: IMAGE_OUTPUT_QUALITY,
    };
    let passes = passes.max(1);
    if passes == 1 {
        return vec![ImagePass {
            number: 1,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            codec: final_codec,
            filtered: true,
        }];
    }

    let mut plan = Vec::with_capacity(passes as usize);
    let mut previous = scratch.join(format!("pass1.{}", final_codec.extension()));
    plan.push(ImagePass {
        number: 1,
        input: input.to_path_buf(),
        output: previous.clone(),
        codec: final_codec,
        filtered: true,
    });

    for number in 2..passes {
        let codec = intermediate_codec(number, preset);
        let next = scratch.join(format!("pass{number}.{}", codec.extension()));
        plan.push(ImagePass {
            number,
            input: previous,
            output: next.clone(),
            codec,
            filtered: false,
        });
        previous = next;
    }

    plan.push(ImagePass {
        number: passes,
        input: previous,
        output: output.to_path_buf(),
        codec: final_codec,
        filtered: false,
    });
    plan
}

/// Runs all image passes for one input.
///
/// A failing pass stops the run and is reported as [`JobOutcome::EncoderFailed`];
/// diagnostics from passes that succeeded are collected into a warning.
pub fn run_image_job<S: EncoderSpawner>(
    spawner: &S,
    config: &MunchConfig,
    input: &Path,
    output: &Path,
    geometry: &OutputGeometry,
    line: &mut dyn StatusLine,
) -> CoreResult<JobReport> {
    let started = Instant::now();
    let scratch = tempfile::Builder::new()
        .prefix("muncher-passes-")
        .tempdir()
        .map_err(|e| CoreError::PathError(format!("Failed to create scratch directory: {e}")))?;

    let filter = image_filter_chain(config, geometry).build();
    let plan = plan_passes(input, output, scratch.path(), config.image_passes, config.preset);
    let total = plan.len();
    let mut state = ProgressState::new(total as f64, config.progress_bar_length, started);
    let mut diagnostics = String::new();

    for pass in &plan {
        log::debug!(
            target: "muncher::progress",
            "Image pass {}/{total}: {:?} {} -> {}",
            pass.number,
            pass.codec,
            pass.input.display(),
            pass.output.display()
        );
        let filter = if pass.filtered { filter.as_deref() } else { None };
        let args = build_image_pass_args(config, &pass.input, &pass.output, pass.codec, filter);
        if config.debug {
            log::debug!(target: "muncher::progress", "Encoder arguments: {args:?}");
        }

        let (exit, stderr) = run_to_completion(spawner, &args)?;
        match reconcile_exit(exit, stderr) {
            failed @ JobOutcome::EncoderFailed { .. } => {
                return Ok(JobReport {
                    outcome: failed,
                    elapsed: started.elapsed(),
                    summary: ParseSummary::default(),
                });
            }
            JobOutcome::EncoderWarning { stderr } => diagnostics.push_str(&stderr),
            JobOutcome::Success => {}
        }

        if total > 1 {
            state.record_time(f64::from(pass.number), Instant::now());
            if let Err(e) = draw_pass_progress(&mut state, line) {
                log::debug!(target: "muncher::progress", "Status line draw failed: {e}");
            }
        }
    }

    let outcome = if diagnostics.trim().is_empty() {
        JobOutcome::Success
    } else {
        JobOutcome::EncoderWarning {
            stderr: diagnostics,
        }
    };
    ensure_output(&outcome, output)?;

    Ok(JobReport {
        outcome,
        elapsed: started.elapsed(),
        summary: ParseSummary::default(),
    })
}

/// Widest text drawn next to the bar of an image run.
const WIDEST_PASS_LINE: &str = " 100.0% ETA: 00:00:00.0s";

/// Draws `[bar] NN.N% ETA: …` for the passes completed so far.
fn draw_pass_progress(state: &mut ProgressState, line: &mut dyn StatusLine) -> std::io::Result<()> {
    let percent = state.percent_text();
    let eta = format!(" ETA: {}", compact_time(state.estimated_seconds_remaining()));
    let width = state.resolve_bar_width(WIDEST_PASS_LINE.len(), line.columns());

    let bar = match width {
        0 => String::new(),
        width if line.supports_color() => {
            colored_progress_bar(state.elapsed_media_time(), state.total_duration(), width)
        }
        width => progress_bar(state.elapsed_media_time(), state.total_duration(), width),
    };
    line.redraw(&format!("{bar}{percent}"))?;
    line.append(&eta)?;
    line.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pass_writes_output_directly() {
        let plan = plan_passes(Path::new("in.png"), Path::new("out.jpg"), Path::new("/tmp/s"), 1, 4);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].output, PathBuf::from("out.jpg"));
        assert!(plan[0].filtered);
        assert_eq!(plan[0].codec, ImageCodec::Mjpeg { quality: 31 });
    }

    #[test]
    fn test_multi_pass_chain() {
        let scratch = Path::new("/tmp/s");
        let plan = plan_passes(Path::new("in.png"), Path::new("out.jpg"), scratch, 5, 4);
        assert_eq!(plan.len(), 5);

        // Each pass reads what the previous one wrote
        for pair in plan.windows(2) {
            assert_eq!(pair[1].input, pair[0].output);
        }
        assert_eq!(plan[0].input, PathBuf::from("in.png"));
        assert_eq!(plan[4].output, PathBuf::from("out.jpg"));
        assert!(plan[1..].iter().all(|p| !p.filtered));

        assert!(matches!(plan[1].codec, ImageCodec::Webp { .. }));
        assert!(matches!(plan[2].codec, ImageCodec::X264 { .. }));
        assert!(matches!(plan[3].codec, ImageCodec::Mjpeg { quality: 22 }));
        assert_eq!(plan[2].output, scratch.join("pass3.mp4"));
    }

    #[test]
    fn test_intermediate_codec_quality_follows_preset() {
        assert_eq!(
            intermediate_codec(2, 1),
            ImageCodec::Webp {
                compression_level: 6,
                quality: 28
            }
        );
        assert_eq!(
            intermediate_codec(2, 7),
            ImageCodec::Webp {
                compression_level: 0,
                quality: 100
            }
        );
        assert_eq!(intermediate_codec(3, 7), ImageCodec::X264 { crf: 51 });
        assert_eq!(intermediate_codec(4, 1), ImageCodec::Mjpeg { quality: 13 });
        assert_eq!(intermediate_codec(5, 1), intermediate_codec(2, 1));
    }
}
