// ============================================================================
// muncher-core/src/processing.rs
// ============================================================================
//
// PROCESSING: From an Input Path to a Finished Job
//
// Ties the collaborators together for one queued input:
//
// 1. Probe the input and decide which streams survive the options
// 2. Detect the media kind and name the output
// 3. Compute the output geometry
// 4. Build the filter graph and the encoder arguments
// 5. Run the job through the orchestrator (or the image passes)
//
// Prompting, queue iteration and result printing belong to the caller.

use std::path::{Path, PathBuf};

use crate::config::MunchConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{EncoderSpawner, MediaProber, VideoEncodeSpec, build_video_args};
use crate::filters::{
    OutputGeometry, audio_filter_chain, corrupt_amount, filter_complex, fps_filter,
    video_filter_chain,
};
use crate::image::run_image_job;
use crate::job::EncodingJob;
use crate::media::{MediaKind, MediaMetadata, StreamSelection, detect_kind, resolve_output_path};
use crate::orchestrator::{JobReport, run_encoding_job};
use crate::progress::StatusLine;

/// Everything known about one input before it is encoded.
#[derive(Debug, Clone)]
pub struct InputPlan {
    pub input: PathBuf,
    pub output: PathBuf,
    pub kind: MediaKind,
    pub streams: StreamSelection,
    pub metadata: MediaMetadata,
    pub geometry: OutputGeometry,
}

/// Probes `input` and plans its encode.
pub fn plan_input<P: MediaProber>(
    prober: &P,
    config: &MunchConfig,
    input: &Path,
    requested_output: Option<&Path>,
    multiple_inputs: bool,
) -> CoreResult<InputPlan> {
    let metadata = prober.probe(input)?;
    let streams = StreamSelection::resolve(config, &metadata)?;
    let kind = detect_kind(&metadata, streams);
    let output = resolve_output_path(input, requested_output, multiple_inputs, kind);

    // Audio-only encodes never render a picture, so the geometry only matters
    // for its audio bitrate.
    let geometry = match kind {
        MediaKind::AudioOnly => OutputGeometry::compute(config, 1, 1)?,
        MediaKind::Video | MediaKind::Image => {
            OutputGeometry::compute(config, metadata.width, metadata.height)?
        }
    };

    log::debug!(
        "Planned {kind} encode of {} -> {} ({}x{} @ {} fps)",
        input.display(),
        output.display(),
        geometry.width,
        geometry.height,
        geometry.fps
    );

    Ok(InputPlan {
        input: input.to_path_buf(),
        output,
        kind,
        streams,
        metadata,
        geometry,
    })
}

/// Expected length of the output in seconds.
///
/// The trimmed section never extends past the end of the input, and the speed
/// factor shortens or lengthens whatever is left.
#[must_use]
pub fn expected_output_duration(config: &MunchConfig, input_duration: f64) -> f64 {
    let available = (input_duration - config.start).max(0.0);
    let section = config
        .trim_duration()
        .map_or(available, |trim| trim.min(available));
    if config.speed > 0.0 {
        section / config.speed
    } else {
        section
    }
}

/// Builds the encoder job of a video or audio-only input.
pub fn build_encoding_job(
    config: &MunchConfig,
    plan: &InputPlan,
    position: usize,
    queue_len: usize,
) -> CoreResult<EncodingJob> {
    if config.start >= plan.metadata.duration {
        return Err(CoreError::Config(format!(
            "Start time ({}s) cannot be greater than or equal to the input duration ({}s)",
            config.start, plan.metadata.duration
        )));
    }

    let total_duration = expected_output_duration(config, plan.metadata.duration);
    if total_duration.is_nan() || total_duration <= 0.0 {
        return Err(CoreError::Config(format!(
            "Nothing left to encode in {} after trimming",
            plan.input.display()
        )));
    }

    let video_chain = if plan.streams.video {
        let fps = fps_filter(plan.geometry.fps, plan.metadata.frame_rate, config.resample)?;
        video_filter_chain(config, &plan.geometry, &fps, total_duration).build()
    } else {
        None
    };
    let audio_chain = if plan.streams.audio {
        audio_filter_chain(config).build()
    } else {
        None
    };
    let graph = filter_complex(video_chain, audio_chain);

    let corrupt = if plan.streams.video {
        corrupt_amount(
            plan.geometry.width,
            plan.geometry.height,
            plan.geometry.video_bitrate,
            config.corrupt,
        )
    } else {
        0
    };

    let spec = VideoEncodeSpec {
        input: &plan.input,
        output: &plan.output,
        streams: plan.streams,
        geometry: &plan.geometry,
        filter_complex: graph.as_deref(),
        corrupt_amount: corrupt,
    };
    let args = build_video_args(config, &spec);

    Ok(EncodingJob {
        input: plan.input.clone(),
        output: plan.output.clone(),
        total_duration,
        stats_period: config.update_speed,
        loglevel: config.encoder_loglevel.clone(),
        debug: config.debug,
        args,
        bar_width: config.progress_bar_length,
        position,
        queue_len,
    })
}

/// Encodes one planned input, drawing progress on `line`.
pub fn encode_input<S: EncoderSpawner>(
    spawner: &S,
    config: &MunchConfig,
    plan: &InputPlan,
    position: usize,
    queue_len: usize,
    line: &mut dyn StatusLine,
) -> CoreResult<JobReport> {
    match plan.kind {
        MediaKind::Image => run_image_job(
            spawner,
            config,
            &plan.input,
            &plan.output,
            &plan.geometry,
            line,
        ),
        MediaKind::Video | MediaKind::AudioOnly => {
            let job = build_encoding_job(config, plan, position, queue_len)?;
            run_encoding_job(spawner, job, line)
        }
    }
}
