// ============================================================================
// muncher-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module encapsulates everything that talks to the external tools. The
// orchestrator and the planner depend on the EncoderSpawner and MediaProber
// traits only, so tests can inject scripted implementations.
//
// KEY COMPONENTS:
// - EncoderSpawner / EncoderProcess with the ffmpeg-sidecar implementation
// - MediaProber with the ffprobe crate implementation
// - Argument builders for video, audio and image encodes
// - Dependency checking

use crate::error::{CoreError, CoreResult};

use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Encoder argument lists
pub mod ffmpeg_builder;

/// Traits and implementations for running the encoder
pub mod ffmpeg_executor;

/// Traits and implementations for probing inputs
pub mod ffprobe_executor;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_builder::{
    EncoderArgsBuilder, IMAGE_OUTPUT_QUALITY, ImageCodec, VideoEncodeSpec, build_image_pass_args,
    build_video_args,
};
pub use ffmpeg_executor::{
    EncoderProcess, EncoderSpawner, OutputPipe, ProcessExit, SidecarProcess, SidecarSpawner,
};
pub use ffprobe_executor::{CrateFfprobeExecutor, MediaProber};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd_name> -version` and only looks at whether the process could be
/// started.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

/// Checks for both ffmpeg and ffprobe.
pub fn check_dependencies() -> CoreResult<()> {
    check_dependency("ffmpeg")?;
    check_dependency("ffprobe")
}
