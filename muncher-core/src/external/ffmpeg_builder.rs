//! FFmpeg argument builders
//!
//! Every encoder invocation starts with the same preamble: overwrite without
//! asking, the configured log level, no banner, key=value progress records on
//! stdout and the configured stats period. The progress parser depends on
//! `-progress -`, so the preamble is not optional.

use std::path::Path;

use crate::config::MunchConfig;
use crate::filters::OutputGeometry;
use crate::media::StreamSelection;

/// Quality of the mjpeg passes that write user-visible images.
pub const IMAGE_OUTPUT_QUALITY: u32 = 31;

/// Builder for encoder argument lists with the shared preamble
#[derive(Debug, Clone)]
pub struct EncoderArgsBuilder {
    args: Vec<String>,
}

impl EncoderArgsBuilder {
    /// Starts an argument list with the progress preamble
    #[must_use]
    pub fn new(loglevel: &str, stats_period: f64) -> Self {
        let args = vec![
            "-y".to_string(),
            "-loglevel".to_string(),
            loglevel.to_string(),
            "-hide_banner".to_string(),
            "-progress".to_string(),
            "-".to_string(),
            "-stats_period".to_string(),
            stats_period.to_string(),
        ];
        Self { args }
    }

    /// Starts an argument list from the run's options
    #[must_use]
    pub fn from_config(config: &MunchConfig) -> Self {
        Self::new(&config.encoder_loglevel, config.update_speed)
    }

    /// Adds a single argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds a flag followed by its value
    #[must_use]
    pub fn option(self, flag: &str, value: impl ToString) -> Self {
        self.arg(flag).arg(value.to_string())
    }

    /// Adds `-i <path>`
    #[must_use]
    pub fn input(self, path: &Path) -> Self {
        self.option("-i", path.to_string_lossy())
    }

    /// Adds `-filter_complex` when a graph is given
    #[must_use]
    pub fn filter_complex(self, graph: Option<&str>) -> Self {
        match graph {
            Some(graph) if !graph.is_empty() => self.option("-filter_complex", graph),
            _ => self,
        }
    }

    /// Appends the output path and returns the argument list
    #[must_use]
    pub fn output(self, path: &Path) -> Vec<String> {
        self.arg(path.to_string_lossy()).args
    }
}

/// Everything a video or audio encode needs beyond the run's options.
#[derive(Debug, Clone, Copy)]
pub struct VideoEncodeSpec<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub streams: StreamSelection,
    pub geometry: &'a OutputGeometry,
    pub filter_complex: Option<&'a str>,
    /// `-bsf noise=` amount, 0 disables corruption
    pub corrupt_amount: u64,
}

/// Builds the argument list of a video or audio-only encode.
#[must_use]
pub fn build_video_args(config: &MunchConfig, spec: &VideoEncodeSpec<'_>) -> Vec<String> {
    let mut builder = EncoderArgsBuilder::from_config(config);

    if config.start != 0.0 {
        builder = builder.option("-ss", config.start);
    }
    if let Some(duration) = config.trim_duration() {
        builder = builder.option("-t", duration);
    }
    if !spec.streams.video {
        builder = builder.arg("-vn");
    }
    if !spec.streams.audio {
        builder = builder.arg("-an");
    }

    builder = builder.input(spec.input);

    if let Some(replacement) = config.replace_audio.as_deref() {
        builder = builder.input(replacement);
        if spec.streams.video {
            builder = builder.option("-map", "0:v:0");
        }
        builder = builder.option("-map", "1:a:0");
    }

    builder = if spec.streams.video {
        builder
            .option("-preset", "ultrafast")
            .arg("-shortest")
            .option("-c:v", "libx264")
            .option("-b:v", spec.geometry.video_bitrate)
            .option("-c:a", "aac")
            .option("-b:a", spec.geometry.audio_bitrate)
    } else {
        builder
            .arg("-shortest")
            .option("-c:a", "libmp3lame")
            .option("-b:a", spec.geometry.audio_bitrate)
    };

    builder = builder.filter_complex(spec.filter_complex);

    if spec.corrupt_amount > 0 {
        builder = builder.option("-bsf", format!("noise={}", spec.corrupt_amount));
    }

    builder.output(spec.output)
}

/// Codec of one image pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCodec {
    Mjpeg { quality: u32 },
    Webp { compression_level: u32, quality: u32 },
    X264 { crf: u32 },
}

impl ImageCodec {
    /// Container extension the pass writes.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ImageCodec::Mjpeg { .. } => "jpg",
            ImageCodec::Webp { .. } => "webp",
            ImageCodec::X264 { .. } => "mp4",
        }
    }

    fn apply(self, builder: EncoderArgsBuilder) -> EncoderArgsBuilder {
        match self {
            ImageCodec::Mjpeg { quality } => builder.option("-c:v", "mjpeg").option("-q:v", quality),
            ImageCodec::Webp {
                compression_level,
                quality,
            } => builder
                .option("-c:v", "libwebp")
                .option("-compression_level", compression_level)
                .option("-quality", quality),
            ImageCodec::X264 { crf } => builder.option("-c:v", "libx264").option("-crf", crf),
        }
    }
}

/// Builds the argument list of one single-frame image pass.
#[must_use]
pub fn build_image_pass_args(
    config: &MunchConfig,
    input: &Path,
    output: &Path,
    codec: ImageCodec,
    filter_complex: Option<&str>,
) -> Vec<String> {
    let builder = EncoderArgsBuilder::from_config(config).input(input);
    codec
        .apply(builder)
        .option("-frames:v", 1)
        .filter_complex(filter_complex)
        .output(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn geometry() -> OutputGeometry {
        OutputGeometry {
            width: 480,
            height: 270,
            fps: 12,
            video_bitrate: 97_200,
            audio_bitrate: 20_000,
        }
    }

    fn position(args: &[String], flag: &str) -> Option<usize> {
        args.iter().position(|a| a == flag)
    }

    #[test]
    fn test_preamble() {
        let args = EncoderArgsBuilder::new("error", 0.0167).output(Path::new("out.mp4"));
        assert_eq!(
            args,
            vec![
                "-y", "-loglevel", "error", "-hide_banner", "-progress", "-",
                "-stats_period", "0.0167", "out.mp4"
            ]
        );
    }

    #[test]
    fn test_video_args() {
        let config = MunchConfig {
            start: 1.5,
            end: Some(4.0),
            ..MunchConfig::default()
        };
        let geometry = geometry();
        let spec = VideoEncodeSpec {
            input: Path::new("in.mov"),
            output: Path::new("out.mp4"),
            streams: StreamSelection { video: true, audio: true },
            geometry: &geometry,
            filter_complex: Some("fps=12"),
            corrupt_amount: 0,
        };
        let args = build_video_args(&config, &spec);

        let ss = position(&args, "-ss").unwrap();
        assert_eq!(args[ss + 1], "1.5");
        let t = position(&args, "-t").unwrap();
        assert_eq!(args[t + 1], "2.5");
        // Trim options apply to the input
        assert!(t < position(&args, "-i").unwrap());

        let bv = position(&args, "-b:v").unwrap();
        assert_eq!(args[bv + 1], "97200");
        assert_eq!(args[position(&args, "-c:v").unwrap() + 1], "libx264");
        assert_eq!(args[position(&args, "-filter_complex").unwrap() + 1], "fps=12");
        assert!(position(&args, "-bsf").is_none());
        assert!(position(&args, "-an").is_none());
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_audio_only_args() {
        let config = MunchConfig {
            replace_audio: Some(PathBuf::from("track.wav")),
            ..MunchConfig::default()
        };
        let geometry = geometry();
        let spec = VideoEncodeSpec {
            input: Path::new("in.flac"),
            output: Path::new("out.mp3"),
            streams: StreamSelection { video: false, audio: true },
            geometry: &geometry,
            filter_complex: None,
            corrupt_amount: 1234,
        };
        let args = build_video_args(&config, &spec);

        assert!(position(&args, "-vn").is_some());
        assert!(position(&args, "-ss").is_none());
        assert_eq!(args[position(&args, "-c:a").unwrap() + 1], "libmp3lame");
        assert!(!args.contains(&"0:v:0".to_string()));
        assert!(args.contains(&"1:a:0".to_string()));
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);
        assert_eq!(args[position(&args, "-bsf").unwrap() + 1], "noise=1234");
    }

    #[test]
    fn test_image_pass_args() {
        let config = MunchConfig::default();
        let args = build_image_pass_args(
            &config,
            Path::new("a.jpg"),
            Path::new("b.webp"),
            ImageCodec::Webp {
                compression_level: 0,
                quality: 64,
            },
            None,
        );
        let tail: Vec<&str> = args[8..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "-i", "a.jpg", "-c:v", "libwebp", "-compression_level", "0", "-quality", "64",
                "-frames:v", "1", "b.webp"
            ]
        );
        assert_eq!(ImageCodec::X264 { crf: 20 }.extension(), "mp4");
    }
}
