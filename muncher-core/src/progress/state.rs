//! Running statistics for one encoding job.

use crate::utils::compact_time;
use std::time::{Duration, Instant};

/// Columns kept free to the right of the status line.
const LINE_MARGIN: usize = 7;

/// Minimum wall time between two recent-rate samples.
const RATE_WINDOW: Duration = Duration::from_secs(1);

/// A stats line with every field at its widest expected value.
const WIDEST_STATS_LINE: &str =
    " 100.0% time: 00:00:00.0s ETA: 00:00:00.0s fps: 9999.9 fp1s: 9999.9";

/// Columns to reserve next to the bar for the percentage and stats text.
pub const STATS_LINE_RESERVE: usize = WIDEST_STATS_LINE.len();

/// Mutable accumulator owned by the progress parser of a single job.
///
/// Media time and frame index only move forward: a record carrying a smaller
/// value than what was already seen leaves the stored value untouched, so the
/// rendered bar never shrinks while the job runs.
#[derive(Debug, Clone)]
pub struct ProgressState {
    total_duration: f64,
    fixed_bar_width: Option<usize>,
    rendered_bar_width: Option<usize>,

    elapsed_media_time: f64,
    last_parsed_time: f64,
    current_frame_index: u64,
    frame_index_at_window_start: u64,
    window_start_wall_clock: Instant,
    job_start_wall_clock: Instant,

    average_frame_rate: Option<f64>,
    recent_frame_rate: Option<f64>,
    estimated_seconds_remaining: f64,
}

impl ProgressState {
    /// Creates the state for a job expected to produce `total_duration` seconds.
    ///
    /// `fixed_bar_width` is the user's bar length; `None` sizes the bar from the
    /// terminal on first use.
    #[must_use]
    pub fn new(total_duration: f64, fixed_bar_width: Option<usize>, now: Instant) -> Self {
        Self {
            total_duration,
            fixed_bar_width,
            rendered_bar_width: fixed_bar_width,
            elapsed_media_time: 0.0,
            last_parsed_time: 0.0,
            current_frame_index: 0,
            frame_index_at_window_start: 0,
            window_start_wall_clock: now,
            job_start_wall_clock: now,
            average_frame_rate: None,
            recent_frame_rate: None,
            estimated_seconds_remaining: 0.0,
        }
    }

    /// Applies a parsed media timestamp and recomputes the ETA.
    pub fn record_time(&mut self, media_seconds: f64, now: Instant) {
        if media_seconds.is_finite() && media_seconds > self.elapsed_media_time {
            self.elapsed_media_time = media_seconds;
            self.last_parsed_time = media_seconds;
        }

        let wall = now.saturating_duration_since(self.job_start_wall_clock).as_secs_f64();
        self.estimated_seconds_remaining =
            estimate_remaining(wall, self.elapsed_media_time, self.total_duration);
    }

    /// Applies a parsed frame index and updates the average and windowed rates.
    pub fn record_frame(&mut self, frame: u64, now: Instant) {
        if frame > self.current_frame_index {
            self.current_frame_index = frame;
        }

        let since_start = now.saturating_duration_since(self.job_start_wall_clock);
        self.average_frame_rate = if since_start.is_zero() {
            Some(0.0)
        } else {
            Some(self.current_frame_index as f64 / since_start.as_secs_f64())
        };

        let since_window = now.saturating_duration_since(self.window_start_wall_clock);
        if since_window >= RATE_WINDOW {
            let frames = self.current_frame_index - self.frame_index_at_window_start;
            self.recent_frame_rate = Some(frames as f64 / since_window.as_secs_f64());
            self.frame_index_at_window_start = self.current_frame_index;
            self.window_start_wall_clock = now;
        }
    }

    /// Resolves the bar width from the widest text that will share its line.
    ///
    /// Only the first call has an effect; a resolved width, or a width fixed by
    /// the user, is kept for the rest of the job. `reserved` must cover the
    /// longest text ever drawn next to the bar, not just the current one.
    pub fn resolve_bar_width(&mut self, reserved: usize, columns: Option<usize>) -> usize {
        if let Some(width) = self.rendered_bar_width {
            return width;
        }
        let width = columns
            .map(|cols| cols.saturating_sub(LINE_MARGIN + reserved))
            .unwrap_or(0);
        log::debug!(
            target: "muncher::progress",
            "Resolved progress bar width to {width} (columns: {columns:?})"
        );
        self.rendered_bar_width = Some(width);
        width
    }

    /// Marks the job finished: the bar jumps to the expected total, while the
    /// stats keep reporting the last media time the encoder printed.
    pub fn complete(&mut self) {
        if self.total_duration > self.elapsed_media_time {
            self.elapsed_media_time = self.total_duration;
        }
        self.estimated_seconds_remaining = 0.0;
    }

    #[must_use]
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    #[must_use]
    pub fn elapsed_media_time(&self) -> f64 {
        self.elapsed_media_time
    }

    /// Media time of the last parsed record, unaffected by [`Self::complete`].
    #[must_use]
    pub fn last_parsed_time(&self) -> f64 {
        self.last_parsed_time
    }

    #[must_use]
    pub fn current_frame_index(&self) -> u64 {
        self.current_frame_index
    }

    #[must_use]
    pub fn average_frame_rate(&self) -> Option<f64> {
        self.average_frame_rate
    }

    #[must_use]
    pub fn recent_frame_rate(&self) -> Option<f64> {
        self.recent_frame_rate
    }

    #[must_use]
    pub fn estimated_seconds_remaining(&self) -> f64 {
        self.estimated_seconds_remaining
    }

    #[must_use]
    pub fn bar_width(&self) -> Option<usize> {
        self.rendered_bar_width
    }

    #[must_use]
    pub fn is_bar_width_fixed(&self) -> bool {
        self.fixed_bar_width.is_some()
    }

    /// Completion in percent, capped at 100.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total_duration > 0.0 {
            (self.elapsed_media_time * 100.0 / self.total_duration).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// The ` NN.N%` figure drawn after the bar.
    #[must_use]
    pub fn percent_text(&self) -> String {
        format!(" {:.1}%", self.percent())
    }

    /// The ` time: … ETA: … fps: … fp1s: …` tail of a finished stats line.
    #[must_use]
    pub fn stats_text(&self) -> String {
        format!(
            " time: {} ETA: {} fps: {} fp1s: {}",
            compact_time(self.last_parsed_time),
            compact_time(self.estimated_seconds_remaining),
            format_rate(self.average_frame_rate),
            format_rate(self.recent_frame_rate),
        )
    }
}

/// `wall * (total - current) / current`, or zero when undefined.
#[must_use]
pub fn estimate_remaining(wall_elapsed: f64, current: f64, total: f64) -> f64 {
    if current <= 0.0 {
        return 0.0;
    }
    let eta = wall_elapsed * (total - current) / current;
    if eta.is_finite() && eta > 0.0 { eta } else { 0.0 }
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) if rate.is_finite() => format!("{rate:.1}"),
        _ => "-".to_string(),
    }
}
