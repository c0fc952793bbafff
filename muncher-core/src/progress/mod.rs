//! Live progress display for a running encoder.
//!
//! - [`bar`]: the pure `[###>...]` renderer
//! - [`state`]: per-job running statistics (media time, frame rates, ETA)
//! - [`parser`]: the streaming parser for ffmpeg's `-progress` output
//! - [`status_line`]: the terminal strategies the parser draws on

pub mod bar;
pub mod parser;
pub mod state;
pub mod status_line;

pub use bar::{colored_progress_bar, progress_bar};
pub use parser::{ParseSummary, ProgressStreamParser, TelemetryRecord};
pub use state::{ProgressState, STATS_LINE_RESERVE, estimate_remaining};
pub use status_line::{AnsiStatusLine, PlainStatusLine, StatusLine, stdout_status_line};
