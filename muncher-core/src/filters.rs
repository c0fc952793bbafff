//! Filter graph assembly and output geometry.
//!
//! Pure functions mapping the run's options to ffmpeg filter syntax, bitrates
//! and output dimensions. Nothing here touches the filesystem or spawns
//! anything.

use crate::config::{BASE_AUDIO_BITRATE, MunchConfig};
use crate::error::{CoreError, CoreResult};

/// Builder for comma-separated filter chains
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    input_label: Option<String>,
    filters: Vec<String>,
}

impl FilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the chain from a labelled input such as `0:a`.
    #[must_use]
    pub fn with_input(mut self, label: &str) -> Self {
        self.input_label = Some(label.to_string());
        self
    }

    /// Adds a filter to the chain, ignoring empty strings
    pub fn push(&mut self, filter: impl Into<String>) {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Builds the chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            return None;
        }
        let chain = self.filters.join(",");
        Some(match self.input_label {
            Some(label) => format!("[{label}]{chain}"),
            None => chain,
        })
    }
}

/// Joins the video and audio chains into a `-filter_complex` argument.
#[must_use]
pub fn filter_complex(video: Option<String>, audio: Option<String>) -> Option<String> {
    let chains: Vec<String> = video.into_iter().chain(audio).collect();
    if chains.is_empty() {
        None
    } else {
        Some(chains.join(";"))
    }
}

/// Dimensions, rate and bitrates of the encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputGeometry {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Video bitrate in bits per second
    pub video_bitrate: u64,
    /// Audio bitrate in bits per second
    pub audio_bitrate: u64,
}

impl OutputGeometry {
    /// Computes the output geometry for an input of `width` x `height`.
    pub fn compute(config: &MunchConfig, width: u32, height: u32) -> CoreResult<Self> {
        let (out_width, out_height) =
            output_resolution(width, height, config.effective_scale(), config.aspect()?);
        let fps = config.effective_fps();

        Ok(Self {
            width: out_width,
            height: out_height,
            fps,
            video_bitrate: video_bitrate(
                out_width,
                out_height,
                fps,
                config.effective_video_divisor(),
            ),
            audio_bitrate: audio_bitrate(config.effective_audio_divisor()),
        })
    }
}

/// Scales and stretches a resolution, rounding each side to an even number.
#[must_use]
pub fn output_resolution(width: u32, height: u32, scale: f64, aspect: (u32, u32)) -> (u32, u32) {
    let side = |len: u32, stretch: u32| -> u32 {
        let scaled = (f64::from(len) * scale * f64::from(stretch)).round();
        ((scaled / 2.0).floor() as u32) * 2
    };
    (side(width, aspect.0), side(height, aspect.1))
}

/// `width * height * floor(sqrt(fps)) / divisor`
#[must_use]
pub fn video_bitrate(width: u32, height: u32, fps: u32, divisor: u32) -> u64 {
    let fps_factor = f64::from(fps).sqrt().floor() as u64;
    u64::from(width) * u64::from(height) * fps_factor / u64::from(divisor.max(1))
}

/// `80000 / divisor`
#[must_use]
pub fn audio_bitrate(divisor: u32) -> u64 {
    BASE_AUDIO_BITRATE / u64::from(divisor.max(1))
}

/// Frame rate reduction: a plain `fps` filter, or `tmix` blending when
/// resampling.
///
/// Resampling can only reduce the frame rate.
pub fn fps_filter(output_fps: u32, input_fps: f64, resample: bool) -> CoreResult<String> {
    if !resample {
        return Ok(format!("fps={output_fps}"));
    }

    let input_fps = input_fps.max(0.0) as u32;
    if output_fps > input_fps {
        return Err(CoreError::Config(
            "Cannot resample from a lower framerate to a higher framerate (output fps exceeds input fps)"
                .to_string(),
        ));
    }
    let tmix_frames = input_fps / output_fps.max(1);
    log::debug!("Resampling with tmix over {tmix_frames} frames to {output_fps} fps");
    Ok(format!("tmix=frames={tmix_frames}:weights=1,fps={output_fps}"))
}

/// Saturation, contrast, sharpening and noise for `--deep-fry`.
#[must_use]
pub fn deep_fry_filter(level: u8) -> String {
    let saturation = f64::from(u32::from(level) * 15 + 85) / 100.0;
    format!(
        "eq=saturation={saturation}:contrast={level},unsharp=5:5:1.25:5:5:{},noise=alls={}:allf=t",
        f64::from(level) / 6.66,
        u32::from(level) * 5
    )
}

/// Zoom towards the centre of the frame.
#[must_use]
pub fn zoom_filter(zoom: f64, fps: u32) -> String {
    format!("zoompan=d=1:zoom={zoom}:fps={fps}:x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)'")
}

#[must_use]
pub fn vignette_filter(amount: f64) -> String {
    format!("vignette=PI/(5/({amount}/2))")
}

/// Strength of the `-bsf noise=` corruption.
///
/// Smaller pictures at higher bitrates need fewer corrupted packets to show
/// the same damage.
#[must_use]
pub fn corrupt_amount(width: u32, height: u32, bitrate: u64, level: u8) -> u64 {
    if level == 0 || bitrate == 0 {
        return 0;
    }
    let pixels = f64::from(width) * f64::from(height);
    (pixels / bitrate as f64 * 100_000.0 / (f64::from(level) * 3.0)) as u64
}

/// Video chain of a video encode.
///
/// `output_duration` is the expected length of the output, used to place the
/// fade out at its end.
#[must_use]
pub fn video_filter_chain(
    config: &MunchConfig,
    geometry: &OutputGeometry,
    fps_filter: &str,
    output_duration: f64,
) -> FilterChain {
    let mut chain = FilterChain::new();

    if config.speed != 1.0 {
        chain.push(format!("setpts=(1/{})*PTS", config.speed));
    }
    chain.push(fps_filter);
    chain.push(format!("scale={}:{}", geometry.width, geometry.height));
    chain.push("setsar=1:1");

    if config.fade_in > 0.0 {
        chain.push(format!("fade=t=in:d={}", config.fade_in));
    }
    if config.fade_out > 0.0 {
        let fade_start = (output_duration - config.fade_out).max(0.0);
        chain.push(format!("fade=t=out:d={}:st={fade_start}", config.fade_out));
    }
    if config.zoom != 1.0 {
        chain.push(zoom_filter(config.zoom, geometry.fps));
    }
    if config.vignette != 0.0 {
        chain.push(vignette_filter(config.vignette));
    }
    if config.interlace {
        chain.push("interlace");
    }
    if config.lagfun {
        chain.push("lagfun");
    }
    if config.stutter != 0 {
        chain.push(format!("random=frames={}", config.stutter));
    }
    if config.deep_fry != 0 {
        chain.push(deep_fry_filter(config.deep_fry));
    }

    chain
}

/// Audio chain of a video or audio encode, reading from the replacement
/// audio input when one is given.
#[must_use]
pub fn audio_filter_chain(config: &MunchConfig) -> FilterChain {
    let input = if config.replace_audio.is_some() { "1:a" } else { "0:a" };
    let mut chain = FilterChain::new().with_input(input);

    if config.earrape {
        chain.push("aeval=sgn(val(5)):c=same");
    }
    if config.volume_db != 0 {
        chain.push(format!("volume={}dB", config.volume_db));
    }
    if config.speed != 1.0 {
        chain.push(format!("atempo={}", config.speed));
    }

    chain
}

/// Filter chain of the first image pass.
#[must_use]
pub fn image_filter_chain(config: &MunchConfig, geometry: &OutputGeometry) -> FilterChain {
    let mut chain = FilterChain::new();

    chain.push(format!("scale={}:{}", geometry.width, geometry.height));
    chain.push("setsar=1:1");
    if config.zoom != 1.0 {
        chain.push(zoom_filter(config.zoom, geometry.fps));
    }
    if config.vignette != 0.0 {
        chain.push(vignette_filter(config.vignette));
    }
    if config.deep_fry != 0 {
        chain.push(deep_fry_filter(config.deep_fry));
    }

    chain
}
