//! Configuration structures and constants for muncher-core.
//!
//! [`MunchConfig`] carries every degradation option of a run. It is built by
//! the CLI (directly or through [`MunchConfigBuilder`]), validated once and
//! then shared read-only by every queued job.

mod builder;

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};

pub use builder::MunchConfigBuilder;

// Default constants

/// Default quality preset (1-7, higher is worse).
pub const DEFAULT_PRESET: u8 = 4;

/// Lowest accepted preset.
pub const MIN_PRESET: u8 = 1;

/// Highest accepted preset.
pub const MAX_PRESET: u8 = 7;

/// Default aspect ratio modifier, `W:H`.
pub const DEFAULT_STRETCH: &str = "1:1";

/// Default playback speed multiplier.
pub const DEFAULT_SPEED: f64 = 1.0;

/// Default zoom factor.
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Default number of compression passes for images.
pub const DEFAULT_IMAGE_PASSES: u32 = 1;

/// Default ffmpeg `-loglevel`.
pub const DEFAULT_ENCODER_LOGLEVEL: &str = "error";

/// Default ffmpeg `-stats_period`, in seconds.
pub const DEFAULT_UPDATE_SPEED: f64 = 0.0167;

/// Upper bound for the corrupt and deep-fry intensities.
pub const MAX_EFFECT_LEVEL: u8 = 10;

/// Audio bitrate before the divisor is applied, in bits per second.
pub const BASE_AUDIO_BITRATE: u64 = 80_000;

/// Frame rate the default fps is derived from (`24 - 3 * preset`).
pub const BASE_FPS: u32 = 24;

/// Every degradation option of a run.
///
/// Optional fields are derived from the preset when left unset; see the
/// `effective_*` accessors.
#[derive(Debug, Clone, Serialize)]
pub struct MunchConfig {
    /// Quality preset (1-7, higher is worse)
    pub preset: u8,

    /// Start time of the output within the input, in seconds
    pub start: f64,

    /// End time of the output within the input, in seconds.
    /// Cannot be combined with `duration`.
    pub end: Option<f64>,

    /// Duration of the output, in seconds. Cannot be combined with `end`.
    pub duration: Option<f64>,

    /// Volume change in dB
    pub volume_db: i32,

    /// Heavy audio distortion
    pub earrape: bool,

    /// Output scale (defaults to `1 / preset`)
    pub scale: Option<f64>,

    /// Video bitrate divisor (defaults to the preset)
    pub video_bitrate_divisor: Option<u32>,

    /// Audio bitrate divisor (defaults to the preset)
    pub audio_bitrate_divisor: Option<u32>,

    /// Aspect ratio modifier as `W:H`
    pub stretch: String,

    /// Output frame rate (defaults to `24 - 3 * preset`)
    pub fps: Option<u32>,

    /// Playback speed multiplier
    pub speed: f64,

    /// Zoom factor, 1 leaves the picture untouched
    pub zoom: f64,

    /// Fade in duration in seconds
    pub fade_in: f64,

    /// Fade out duration in seconds
    pub fade_out: f64,

    /// Frame shuffling window, 0 disables it
    pub stutter: u32,

    /// Vignette amount, 0 disables it
    pub vignette: f64,

    /// Bitstream corruption (0-10)
    pub corrupt: u8,

    /// Deep-fry intensity (0-10)
    pub deep_fry: u8,

    pub interlace: bool,
    pub lagfun: bool,

    /// Blend frames together instead of dropping them
    pub resample: bool,

    pub no_video: bool,
    pub no_audio: bool,

    /// Audio file replacing the input's audio
    pub replace_audio: Option<PathBuf>,

    /// Number of compression passes, images only
    pub image_passes: u32,

    /// ffmpeg `-loglevel`
    pub encoder_loglevel: String,

    /// ffmpeg `-stats_period`, in seconds
    pub update_speed: f64,

    /// Fixed progress bar length; `None` sizes it from the terminal
    pub progress_bar_length: Option<usize>,

    /// Overwrite existing outputs without asking
    pub overwrite: bool,

    /// Print resolved options and encoder arguments
    pub debug: bool,
}

impl Default for MunchConfig {
    fn default() -> Self {
        Self {
            preset: DEFAULT_PRESET,
            start: 0.0,
            end: None,
            duration: None,
            volume_db: 0,
            earrape: false,
            scale: None,
            video_bitrate_divisor: None,
            audio_bitrate_divisor: None,
            stretch: DEFAULT_STRETCH.to_string(),
            fps: None,
            speed: DEFAULT_SPEED,
            zoom: DEFAULT_ZOOM,
            fade_in: 0.0,
            fade_out: 0.0,
            stutter: 0,
            vignette: 0.0,
            corrupt: 0,
            deep_fry: 0,
            interlace: false,
            lagfun: false,
            resample: false,
            no_video: false,
            no_audio: false,
            replace_audio: None,
            image_passes: DEFAULT_IMAGE_PASSES,
            encoder_loglevel: DEFAULT_ENCODER_LOGLEVEL.to_string(),
            update_speed: DEFAULT_UPDATE_SPEED,
            progress_bar_length: None,
            overwrite: false,
            debug: false,
        }
    }
}

impl MunchConfig {
    /// Output scale, `1 / preset` unless set.
    #[must_use]
    pub fn effective_scale(&self) -> f64 {
        self.scale.unwrap_or(1.0 / f64::from(self.preset.max(1)))
    }

    /// Output frame rate, `24 - 3 * preset` unless set.
    #[must_use]
    pub fn effective_fps(&self) -> u32 {
        self.fps
            .unwrap_or_else(|| BASE_FPS.saturating_sub(3 * u32::from(self.preset)).max(1))
    }

    #[must_use]
    pub fn effective_video_divisor(&self) -> u32 {
        self.video_bitrate_divisor
            .unwrap_or(u32::from(self.preset))
            .max(1)
    }

    #[must_use]
    pub fn effective_audio_divisor(&self) -> u32 {
        self.audio_bitrate_divisor
            .unwrap_or(u32::from(self.preset))
            .max(1)
    }

    /// Parses `stretch` into its width and height multipliers.
    pub fn aspect(&self) -> CoreResult<(u32, u32)> {
        parse_stretch(&self.stretch)
    }

    /// Length of the trimmed section, from `--duration` or `--end`.
    #[must_use]
    pub fn trim_duration(&self) -> Option<f64> {
        match (self.duration, self.end) {
            (Some(duration), _) => Some(duration),
            (None, Some(end)) => Some(end - self.start),
            (None, None) => None,
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error if any option is out of range or two options conflict.
    pub fn validate(&self) -> CoreResult<()> {
        if !(MIN_PRESET..=MAX_PRESET).contains(&self.preset) {
            return Err(CoreError::Config(format!(
                "Preset must be between {MIN_PRESET} and {MAX_PRESET}, got {}",
                self.preset
            )));
        }

        if !self.start.is_finite() || self.start < 0.0 {
            return Err(CoreError::Config("Start time cannot be negative".to_string()));
        }

        if self.end.is_some() && self.duration.is_some() {
            return Err(CoreError::Config(
                "Cannot specify both duration and end time".to_string(),
            ));
        }

        if let Some(end) = self.end {
            if !end.is_finite() || self.start >= end {
                return Err(CoreError::Config(
                    "Start time cannot be greater than or equal to end time".to_string(),
                ));
            }
        }

        if let Some(duration) = self.duration {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(CoreError::Config(format!(
                    "Duration must be positive, got {duration}"
                )));
            }
        }

        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(CoreError::Config(format!(
                "Speed must be positive, got {}",
                self.speed
            )));
        }

        if let Some(scale) = self.scale {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(CoreError::Config(format!(
                    "Scale must be positive, got {scale}"
                )));
            }
        }

        if self.video_bitrate_divisor == Some(0) || self.audio_bitrate_divisor == Some(0) {
            return Err(CoreError::Config(
                "Bitrate divisors must be at least 1".to_string(),
            ));
        }

        if self.fps == Some(0) {
            return Err(CoreError::Config("Output fps must be at least 1".to_string()));
        }

        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(CoreError::Config(format!(
                "Zoom must be positive, got {}",
                self.zoom
            )));
        }

        if self.fade_in < 0.0 || self.fade_out < 0.0 {
            return Err(CoreError::Config(
                "Fade durations cannot be negative".to_string(),
            ));
        }

        if self.corrupt > MAX_EFFECT_LEVEL || self.deep_fry > MAX_EFFECT_LEVEL {
            return Err(CoreError::Config(format!(
                "Corrupt and deep-fry levels must be between 0 and {MAX_EFFECT_LEVEL}"
            )));
        }

        if self.image_passes == 0 {
            return Err(CoreError::Config(
                "Image loop count must be at least 1".to_string(),
            ));
        }

        if !self.update_speed.is_finite() || self.update_speed <= 0.0 {
            return Err(CoreError::Config(format!(
                "Update speed must be positive, got {}",
                self.update_speed
            )));
        }

        if self.encoder_loglevel.trim().is_empty() {
            return Err(CoreError::Config("Encoder log level cannot be empty".to_string()));
        }

        if self.no_video && self.no_audio {
            return Err(CoreError::Config(
                "Cannot disable both video and audio".to_string(),
            ));
        }

        parse_stretch(&self.stretch)?;

        Ok(())
    }
}

fn parse_stretch(stretch: &str) -> CoreResult<(u32, u32)> {
    let invalid = || {
        CoreError::Config(format!(
            "Stretch must be two positive integers as W:H, got '{stretch}'"
        ))
    };

    let (width, height) = stretch.split_once(':').ok_or_else(invalid)?;
    let width: u32 = width.trim().parse().map_err(|_| invalid())?;
    let height: u32 = height.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_preset() {
        let config = MunchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_fps(), 12);
        assert_eq!(config.effective_scale(), 0.25);
        assert_eq!(config.effective_video_divisor(), 4);
        assert_eq!(config.effective_audio_divisor(), 4);
        assert_eq!(config.aspect().unwrap(), (1, 1));
    }

    #[test]
    fn test_worst_preset_keeps_positive_fps() {
        let config = MunchConfig {
            preset: 7,
            ..MunchConfig::default()
        };
        assert_eq!(config.effective_fps(), 3);
    }

    #[test]
    fn test_explicit_values_win() {
        let config = MunchConfig {
            fps: Some(30),
            scale: Some(0.5),
            video_bitrate_divisor: Some(2),
            ..MunchConfig::default()
        };
        assert_eq!(config.effective_fps(), 30);
        assert_eq!(config.effective_scale(), 0.5);
        assert_eq!(config.effective_video_divisor(), 2);
    }

    #[test]
    fn test_trim_duration() {
        let mut config = MunchConfig {
            start: 2.0,
            end: Some(7.5),
            ..MunchConfig::default()
        };
        assert_eq!(config.trim_duration(), Some(5.5));

        config.end = None;
        config.duration = Some(3.0);
        assert_eq!(config.trim_duration(), Some(3.0));

        config.duration = None;
        assert_eq!(config.trim_duration(), None);
    }

    #[test]
    fn test_conflicting_trim_options() {
        let config = MunchConfig {
            end: Some(5.0),
            duration: Some(2.0),
            ..MunchConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = MunchConfig {
            start: 5.0,
            end: Some(5.0),
            ..MunchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_values() {
        for config in [
            MunchConfig { preset: 0, ..MunchConfig::default() },
            MunchConfig { preset: 8, ..MunchConfig::default() },
            MunchConfig { start: -1.0, ..MunchConfig::default() },
            MunchConfig { speed: 0.0, ..MunchConfig::default() },
            MunchConfig { corrupt: 11, ..MunchConfig::default() },
            MunchConfig { deep_fry: 11, ..MunchConfig::default() },
            MunchConfig { image_passes: 0, ..MunchConfig::default() },
            MunchConfig { fps: Some(0), ..MunchConfig::default() },
            MunchConfig { no_video: true, no_audio: true, ..MunchConfig::default() },
        ] {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_stretch_parsing() {
        assert_eq!(parse_stretch("2:1").unwrap(), (2, 1));
        assert!(parse_stretch("2").is_err());
        assert!(parse_stretch("0:1").is_err());
        assert!(parse_stretch("a:b").is_err());
    }
}
