//! Media information and kind detection.
//!
//! [`MediaMetadata`] is what the prober reports about an input. Together with
//! the run's options it decides which streams get rendered ([`StreamSelection`])
//! and how the input is encoded ([`MediaKind`]).

pub mod output;

use std::fmt;

use serde::Serialize;

use crate::config::MunchConfig;
use crate::error::{CoreError, CoreResult};

pub use output::{OUTPUT_SUFFIX, default_output_path, resolve_output_path};

/// Inputs shorter than this may be still images.
pub const IMAGE_DURATION_THRESHOLD: f64 = 1.0;

/// Properties of an input file as reported by the prober.
///
/// Missing values default to zero, so a stream the prober could not describe
/// still produces a usable (if degenerate) encode.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaMetadata {
    /// Container duration in seconds
    pub duration: f64,
    /// Width of the first video stream
    pub width: u32,
    /// Height of the first video stream
    pub height: u32,
    /// Frame rate of the first video stream
    pub frame_rate: f64,
    /// Frame count of the first video stream, when the container records it
    pub frame_count: Option<u64>,
    pub has_video: bool,
    pub has_audio: bool,
}

/// How an input is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaKind {
    /// Video, with or without audio (`.mp4`)
    Video,
    /// Audio without a rendered video stream (`.mp3`)
    AudioOnly,
    /// A single still frame (`.jpg`)
    Image,
}

impl MediaKind {
    /// Extension of the default output file.
    #[must_use]
    pub fn output_extension(self) -> &'static str {
        match self {
            MediaKind::Video => "mp4",
            MediaKind::AudioOnly => "mp3",
            MediaKind::Image => "jpg",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::AudioOnly => write!(f, "audio"),
            MediaKind::Image => write!(f, "image"),
        }
    }
}

/// Streams that end up in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamSelection {
    pub video: bool,
    pub audio: bool,
}

impl StreamSelection {
    /// Applies `--no-video`, `--no-audio` and `--replace-audio` to what the
    /// input actually contains.
    ///
    /// A replacement audio file provides the audio stream regardless of the
    /// input's own audio.
    pub fn resolve(config: &MunchConfig, metadata: &MediaMetadata) -> CoreResult<Self> {
        let video = !config.no_video && metadata.has_video;
        let audio = !config.no_audio && (config.replace_audio.is_some() || metadata.has_audio);

        if !video && !audio {
            return Err(CoreError::MediaInfo(
                "Cannot encode without audio or video streams".to_string(),
            ));
        }
        Ok(Self { video, audio })
    }
}

/// Decides how an input is encoded.
///
/// Everything is video unless proven otherwise: audio without a rendered video
/// stream is audio-only, and a rendered video stream shorter than a second
/// holding a single frame is an image. A missing frame count on such a short
/// stream counts as a single frame.
#[must_use]
pub fn detect_kind(metadata: &MediaMetadata, streams: StreamSelection) -> MediaKind {
    if streams.video
        && metadata.duration < IMAGE_DURATION_THRESHOLD
        && metadata.frame_count.unwrap_or(1) == 1
    {
        MediaKind::Image
    } else if streams.audio && !streams.video {
        MediaKind::AudioOnly
    } else {
        MediaKind::Video
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn clip() -> MediaMetadata {
        MediaMetadata {
            duration: 12.0,
            width: 1920,
            height: 1080,
            frame_rate: 30.0,
            frame_count: Some(360),
            has_video: true,
            has_audio: true,
        }
    }

    #[test]
    fn test_video_with_audio() {
        let streams = StreamSelection::resolve(&MunchConfig::default(), &clip()).unwrap();
        assert_eq!(streams, StreamSelection { video: true, audio: true });
        assert_eq!(detect_kind(&clip(), streams), MediaKind::Video);
    }

    #[test]
    fn test_no_video_makes_audio_only() {
        let config = MunchConfig {
            no_video: true,
            ..MunchConfig::default()
        };
        let streams = StreamSelection::resolve(&config, &clip()).unwrap();
        assert_eq!(detect_kind(&clip(), streams), MediaKind::AudioOnly);
        assert_eq!(MediaKind::AudioOnly.output_extension(), "mp3");
    }

    #[test]
    fn test_single_short_frame_is_image() {
        let still = MediaMetadata {
            duration: 0.04,
            frame_rate: 25.0,
            frame_count: Some(1),
            has_audio: false,
            ..clip()
        };
        let streams = StreamSelection::resolve(&MunchConfig::default(), &still).unwrap();
        assert_eq!(detect_kind(&still, streams), MediaKind::Image);

        let unknown_count = MediaMetadata {
            frame_count: None,
            ..still.clone()
        };
        assert_eq!(detect_kind(&unknown_count, streams), MediaKind::Image);

        let short_clip = MediaMetadata {
            frame_count: Some(12),
            ..still
        };
        assert_eq!(detect_kind(&short_clip, streams), MediaKind::Video);
    }

    #[test]
    fn test_replacement_audio_counts_as_audio() {
        let silent = MediaMetadata {
            has_audio: false,
            ..clip()
        };
        let config = MunchConfig {
            replace_audio: Some(PathBuf::from("track.mp3")),
            ..MunchConfig::default()
        };
        let streams = StreamSelection::resolve(&config, &silent).unwrap();
        assert!(streams.audio);
    }

    #[test]
    fn test_nothing_to_render() {
        let empty = MediaMetadata::default();
        assert!(matches!(
            StreamSelection::resolve(&MunchConfig::default(), &empty),
            Err(CoreError::MediaInfo(_))
        ));
    }
}
