// ============================================================================
// muncher-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for MunchConfig
//
// Fluent construction of MunchConfig for library consumers and tests. Unset
// options keep the defaults from MunchConfig::default(); nothing is validated
// until MunchConfig::validate() is called.

use std::path::PathBuf;

use super::MunchConfig;

/// Builder for creating MunchConfig instances.
///
/// # Examples
///
/// ```rust
/// use muncher_core::config::MunchConfigBuilder;
///
/// let config = MunchConfigBuilder::new()
///     .preset(6)
///     .start(1.5)
///     .duration(10.0)
///     .deep_fry(3)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MunchConfigBuilder {
    config: MunchConfig,
}

impl MunchConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the quality preset (1-7).
    #[must_use]
    pub fn preset(mut self, preset: u8) -> Self {
        self.config.preset = preset;
        self
    }

    #[must_use]
    pub fn start(mut self, start: f64) -> Self {
        self.config.start = start;
        self
    }

    #[must_use]
    pub fn end(mut self, end: f64) -> Self {
        self.config.end = Some(end);
        self
    }

    #[must_use]
    pub fn duration(mut self, duration: f64) -> Self {
        self.config.duration = Some(duration);
        self
    }

    #[must_use]
    pub fn volume_db(mut self, volume_db: i32) -> Self {
        self.config.volume_db = volume_db;
        self
    }

    #[must_use]
    pub fn earrape(mut self, enabled: bool) -> Self {
        self.config.earrape = enabled;
        self
    }

    #[must_use]
    pub fn scale(mut self, scale: f64) -> Self {
        self.config.scale = Some(scale);
        self
    }

    #[must_use]
    pub fn video_bitrate_divisor(mut self, divisor: u32) -> Self {
        self.config.video_bitrate_divisor = Some(divisor);
        self
    }

    #[must_use]
    pub fn audio_bitrate_divisor(mut self, divisor: u32) -> Self {
        self.config.audio_bitrate_divisor = Some(divisor);
        self
    }

    /// Sets the aspect ratio modifier, as `W:H`.
    #[must_use]
    pub fn stretch(mut self, stretch: &str) -> Self {
        self.config.stretch = stretch.to_string();
        self
    }

    #[must_use]
    pub fn fps(mut self, fps: u32) -> Self {
        self.config.fps = Some(fps);
        self
    }

    #[must_use]
    pub fn speed(mut self, speed: f64) -> Self {
        self.config.speed = speed;
        self
    }

    #[must_use]
    pub fn zoom(mut self, zoom: f64) -> Self {
        self.config.zoom = zoom;
        self
    }

    #[must_use]
    pub fn fade_in(mut self, seconds: f64) -> Self {
        self.config.fade_in = seconds;
        self
    }

    #[must_use]
    pub fn fade_out(mut self, seconds: f64) -> Self {
        self.config.fade_out = seconds;
        self
    }

    #[must_use]
    pub fn stutter(mut self, frames: u32) -> Self {
        self.config.stutter = frames;
        self
    }

    #[must_use]
    pub fn vignette(mut self, amount: f64) -> Self {
        self.config.vignette = amount;
        self
    }

    #[must_use]
    pub fn corrupt(mut self, level: u8) -> Self {
        self.config.corrupt = level;
        self
    }

    #[must_use]
    pub fn deep_fry(mut self, level: u8) -> Self {
        self.config.deep_fry = level;
        self
    }

    #[must_use]
    pub fn interlace(mut self, enabled: bool) -> Self {
        self.config.interlace = enabled;
        self
    }

    #[must_use]
    pub fn lagfun(mut self, enabled: bool) -> Self {
        self.config.lagfun = enabled;
        self
    }

    #[must_use]
    pub fn resample(mut self, enabled: bool) -> Self {
        self.config.resample = enabled;
        self
    }

    #[must_use]
    pub fn no_video(mut self, enabled: bool) -> Self {
        self.config.no_video = enabled;
        self
    }

    #[must_use]
    pub fn no_audio(mut self, enabled: bool) -> Self {
        self.config.no_audio = enabled;
        self
    }

    /// Replaces the input's audio with the first audio stream of `path`.
    #[must_use]
    pub fn replace_audio(mut self, path: PathBuf) -> Self {
        self.config.replace_audio = Some(path);
        self
    }

    #[must_use]
    pub fn image_passes(mut self, passes: u32) -> Self {
        self.config.image_passes = passes;
        self
    }

    #[must_use]
    pub fn encoder_loglevel(mut self, level: &str) -> Self {
        self.config.encoder_loglevel = level.to_string();
        self
    }

    #[must_use]
    pub fn update_speed(mut self, seconds: f64) -> Self {
        self.config.update_speed = seconds;
        self
    }

    /// Fixes the progress bar length instead of sizing it from the terminal.
    #[must_use]
    pub fn progress_bar_length(mut self, length: usize) -> Self {
        self.config.progress_bar_length = Some(length);
        self
    }

    #[must_use]
    pub fn overwrite(mut self, enabled: bool) -> Self {
        self.config.overwrite = enabled;
        self
    }

    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Builds the MunchConfig.
    #[must_use]
    pub fn build(self) -> MunchConfig {
        self.config
    }
}
