//! Core library for degrading media files with ffmpeg.
//!
//! This crate probes inputs, builds filter graphs and encoder arguments from a
//! [`MunchConfig`], runs the encoder while parsing its progress stream, and
//! renders an in-place progress bar with frame rate and ETA statistics.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use muncher_core::config::MunchConfigBuilder;
//! use muncher_core::external::{CrateFfprobeExecutor, SidecarSpawner};
//! use muncher_core::progress::stdout_status_line;
//! use muncher_core::{encode_input, plan_input};
//! use std::path::Path;
//!
//! let config = MunchConfigBuilder::new().preset(5).deep_fry(2).build();
//! config.validate().unwrap();
//!
//! let plan = plan_input(
//!     &CrateFfprobeExecutor::new(),
//!     &config,
//!     Path::new("cat.mov"),
//!     None,
//!     false,
//! )
//! .unwrap();
//!
//! let mut line = stdout_status_line(true);
//! let report = encode_input(&SidecarSpawner, &config, &plan, 1, 1, line.as_mut()).unwrap();
//! println!("{:?} after {:?}", report.outcome, report.elapsed);
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod filters;
pub mod image;
pub mod job;
pub mod media;
pub mod orchestrator;
pub mod processing;
pub mod progress;
pub mod terminal;
pub mod utils;

// Re-exports for public API
pub use config::{MunchConfig, MunchConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use external::{check_dependencies, check_dependency};
pub use job::{EncodingJob, JobPhase};
pub use media::{MediaKind, MediaMetadata, StreamSelection};
pub use orchestrator::{JobOutcome, JobReport, run_encoding_job};
pub use processing::{InputPlan, build_encoding_job, encode_input, plan_input};
pub use utils::{compact_time, format_seconds, parse_ffmpeg_time, trim_leading_zero_units};
