// muncher-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::Parser;
use muncher_core::config::{
    DEFAULT_ENCODER_LOGLEVEL, DEFAULT_IMAGE_PASSES, DEFAULT_PRESET, DEFAULT_SPEED,
    DEFAULT_STRETCH, DEFAULT_UPDATE_SPEED, DEFAULT_ZOOM, MunchConfig,
    MunchConfigBuilder,
};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    name = "muncher",
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Muncher: Media quality degradation tool",
    long_about = "Intentionally lowers the quality of videos, audio and images using ffmpeg."
)]
pub struct Cli {
    // --- Input / Output ---
    /// Input file(s), repeat the flag to queue several
    #[arg(short = 'i', long = "input", required = true, value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Output file; ignored when several inputs are queued
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print debug information, including the encoder arguments
    #[arg(short, long)]
    pub debug: bool,

    /// Overwrite existing output files without asking
    #[arg(short = 'y', long)]
    pub overwrite: bool,

    /// Optional: Also write the log to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    // --- Progress Display ---
    /// Length of the progress bar, sized from the terminal width when omitted
    #[arg(long = "progress-bar", value_name = "LENGTH")]
    pub progress_bar: Option<usize>,

    /// How often ffmpeg reports progress, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_UPDATE_SPEED)]
    pub update_speed: f64,

    /// Log level passed to ffmpeg
    #[arg(long, value_name = "LEVEL", default_value = DEFAULT_ENCODER_LOGLEVEL)]
    pub loglevel: String,

    /// Number of times to compress the input (images only)
    #[arg(long = "loop", value_name = "COUNT", default_value_t = DEFAULT_IMAGE_PASSES,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub image_passes: u32,

    // --- Streams ---
    /// Produce an output without video
    #[arg(long)]
    pub no_video: bool,

    /// Produce an output without audio
    #[arg(long)]
    pub no_audio: bool,

    /// Replace the audio with the given file
    #[arg(long, value_name = "FILE")]
    pub replace_audio: Option<PathBuf>,

    // --- Quality ---
    /// Quality preset (1-7, higher = worse)
    #[arg(short, long, default_value_t = DEFAULT_PRESET,
          value_parser = clap::value_parser!(u8).range(1..=7))]
    pub preset: u8,

    /// Start time of the output, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub start: f64,

    /// End time of the output, in seconds
    #[arg(long, value_name = "SECONDS", conflicts_with = "duration")]
    pub end: Option<f64>,

    /// Duration of the output, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<f64>,

    /// Volume change in dB
    #[arg(short, long, value_name = "DB", default_value_t = 0, allow_negative_numbers = true)]
    pub volume: i32,

    /// Heavily distort the audio. The volume increases substantially
    #[arg(long)]
    pub earrape: bool,

    /// Output scale, `1 / preset` when omitted
    #[arg(short, long, value_name = "FACTOR")]
    pub scale: Option<f64>,

    /// Video bitrate divisor (higher = worse)
    #[arg(long = "video-bitrate", visible_alias = "vb", value_name = "DIVISOR")]
    pub video_bitrate: Option<u32>,

    /// Audio bitrate divisor (higher = worse)
    #[arg(long = "audio-bitrate", visible_alias = "ab", value_name = "DIVISOR")]
    pub audio_bitrate: Option<u32>,

    /// Stretch the aspect ratio, as `W:H`
    #[arg(long, value_name = "W:H", default_value = DEFAULT_STRETCH)]
    pub stretch: String,

    /// Output frame rate, `24 - 3 * preset` when omitted
    #[arg(long, value_name = "FPS")]
    pub fps: Option<u32>,

    // --- Effects ---
    /// Playback speed of video and audio
    #[arg(long, value_name = "FACTOR", default_value_t = DEFAULT_SPEED)]
    pub speed: f64,

    /// Zoom in or out
    #[arg(short, long, value_name = "FACTOR", default_value_t = DEFAULT_ZOOM)]
    pub zoom: f64,

    /// Fade in duration, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub fade_in: f64,

    /// Fade out duration, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub fade_out: f64,

    /// Shuffle frames within this window (higher = more stutter)
    #[arg(long, value_name = "FRAMES", default_value_t = 0)]
    pub stutter: u32,

    /// Amount of vignette
    #[arg(long, value_name = "AMOUNT", default_value_t = 0.0)]
    pub vignette: f64,

    /// Corrupt the output (1-10, higher = worse)
    #[arg(long, value_name = "LEVEL", default_value_t = 0,
          value_parser = clap::value_parser!(u8).range(0..=10))]
    pub corrupt: u8,

    /// Deep-fry the output (1-10, higher = worse)
    #[arg(long, value_name = "LEVEL", default_value_t = 0,
          value_parser = clap::value_parser!(u8).range(0..=10))]
    pub deep_fry: u8,

    /// Interlace the output
    #[arg(long)]
    pub interlace: bool,

    /// Make darker pixels update slower
    #[arg(long)]
    pub lagfun: bool,

    /// Blend frames together instead of dropping them
    #[arg(long)]
    pub resample: bool,
}

impl Cli {
    /// Builds the core options from the parsed arguments.
    ///
    /// Validation happens separately through [`MunchConfig::validate`].
    #[must_use]
    pub fn to_config(&self) -> MunchConfig {
        let mut builder = MunchConfigBuilder::new()
            .preset(self.preset)
            .start(self.start)
            .volume_db(self.volume)
            .earrape(self.earrape)
            .stretch(&self.stretch)
            .speed(self.speed)
            .zoom(self.zoom)
            .fade_in(self.fade_in)
            .fade_out(self.fade_out)
            .stutter(self.stutter)
            .vignette(self.vignette)
            .corrupt(self.corrupt)
            .deep_fry(self.deep_fry)
            .interlace(self.interlace)
            .lagfun(self.lagfun)
            .resample(self.resample)
            .no_video(self.no_video)
            .no_audio(self.no_audio)
            .image_passes(self.image_passes)
            .encoder_loglevel(&self.loglevel)
            .update_speed(self.update_speed)
            .overwrite(self.overwrite)
            .debug(self.debug);

        if let Some(end) = self.end {
            builder = builder.end(end);
        }
        if let Some(duration) = self.duration {
            builder = builder.duration(duration);
        }
        if let Some(scale) = self.scale {
            builder = builder.scale(scale);
        }
        if let Some(divisor) = self.video_bitrate {
            builder = builder.video_bitrate_divisor(divisor);
        }
        if let Some(divisor) = self.audio_bitrate {
            builder = builder.audio_bitrate_divisor(divisor);
        }
        if let Some(fps) = self.fps {
            builder = builder.fps(fps);
        }
        if let Some(path) = &self.replace_audio {
            builder = builder.replace_audio(path.clone());
        }
        if let Some(length) = self.progress_bar {
            builder = builder.progress_bar_length(length);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_args() {
        let cli = Cli::parse_from(["muncher", "-i", "cat.mov"]);
        assert_eq!(cli.inputs, vec![PathBuf::from("cat.mov")]);
        assert_eq!(cli.preset, DEFAULT_PRESET);
        assert_eq!(cli.image_passes, 1);
        assert_eq!(cli.loglevel, "error");
        assert!(cli.progress_bar.is_none());

        let config = cli.to_config();
        assert_eq!(config.stretch, "1:1");
        assert!(config.end.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_queue_and_effects() {
        let cli = Cli::parse_from([
            "muncher", "-i", "a.mp4", "-i", "b.mp3", "-p", "6", "-v", "-5", "--vb", "3",
            "--deep-fry", "4", "--loop", "3", "--progress-bar", "30", "--end", "12.5",
        ]);
        assert_eq!(cli.inputs.len(), 2);

        let config = cli.to_config();
        assert_eq!(config.preset, 6);
        assert_eq!(config.volume_db, -5);
        assert_eq!(config.video_bitrate_divisor, Some(3));
        assert_eq!(config.deep_fry, 4);
        assert_eq!(config.image_passes, 3);
        assert_eq!(config.progress_bar_length, Some(30));
        assert_eq!(config.end, Some(12.5));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(Cli::try_parse_from(["muncher", "-i", "a.mp4", "-p", "8"]).is_err());
        assert!(Cli::try_parse_from(["muncher", "-i", "a.mp4", "--corrupt", "11"]).is_err());
        assert!(Cli::try_parse_from(["muncher", "-i", "a.mp4", "--loop", "0"]).is_err());
        assert!(Cli::try_parse_from(["muncher"]).is_err());
        assert!(
            Cli::try_parse_from(["muncher", "-i", "a.mp4", "--end", "3", "--duration", "2"])
                .is_err()
        );
    }
}
