//! FFprobe integration for media analysis
//!
//! This module defines the [`MediaProber`] seam and its default implementation
//! on top of the `ffprobe` crate, which runs the `ffprobe` binary and
//! deserializes its JSON output.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::media::MediaMetadata;
use crate::utils::parse_frame_rate;
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Retrieves structured metadata for an input file.
pub trait MediaProber {
    fn probe(&self, input_path: &Path) -> CoreResult<MediaMetadata>;
}

/// [`MediaProber`] backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MediaProber for CrateFfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<MediaMetadata> {
        log::debug!(
            "Running ffprobe (via crate) for media info on: {}",
            input_path.display()
        );

        let metadata = ffprobe(input_path).map_err(|err| {
            log::warn!("Failed to get media info: {err:?}");
            map_ffprobe_error(err, "media info")
        })?;

        let duration = metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or(0.0);

        let mut info = MediaMetadata {
            duration,
            has_audio: metadata
                .streams
                .iter()
                .any(|s| s.codec_type.as_deref() == Some("audio")),
            ..MediaMetadata::default()
        };

        if let Some(video_stream) = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
        {
            info.has_video = true;
            info.width = dimension(video_stream.width);
            info.height = dimension(video_stream.height);
            info.frame_rate = parse_frame_rate(&video_stream.r_frame_rate).unwrap_or(0.0);
            info.frame_count = video_stream
                .nb_frames
                .as_deref()
                .and_then(|f| f.parse::<u64>().ok());
        }

        log::debug!("Probed {}: {info:?}", input_path.display());
        Ok(info)
    }
}

fn dimension(value: Option<i64>) -> u32 {
    value
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                CoreError::DependencyNotFound("ffprobe".to_string())
            } else {
                command_start_error(format!("ffprobe ({context})"), io_err)
            }
        }
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => CoreError::FfprobeParse(format!(
            "ffprobe {context} output deserialization: {err}"
        )),
        _ => CoreError::FfprobeParse(format!(
            "Unknown ffprobe error during {context}: {err:?}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_clamps_invalid_values() {
        assert_eq!(dimension(Some(1920)), 1920);
        assert_eq!(dimension(Some(-1)), 0);
        assert_eq!(dimension(None), 0);
    }

    #[test]
    fn test_missing_binary_maps_to_dependency_error() {
        let err = FfProbeError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "nope"));
        assert!(matches!(
            map_ffprobe_error(err, "media info"),
            CoreError::DependencyNotFound(_)
        ));
    }
}
