//! Fixed-width textual progress bar.

use owo_colors::OwoColorize;

/// Cell used for the completed part of the bar.
pub const BAR_FILL: char = '#';
/// Leading edge marker, only drawn while the bar is incomplete.
pub const BAR_LEAD: char = '>';
/// Cell used for the remaining part of the bar.
pub const BAR_EMPTY: char = '.';

/// Fraction of `total` at which the bar snaps to full, hiding the small
/// shortfall ffmpeg usually reports on its last progress record.
pub const COMPLETE_THRESHOLD: f64 = 0.995;

/// Renders `[###>....]` for `done` out of `total`.
///
/// The result always contains `length + 3` characters: two brackets and
/// `length + 1` cells. Callers are expected to skip the bar entirely when
/// `length` is zero.
#[must_use]
pub fn progress_bar(done: f64, total: f64, length: usize) -> String {
    let (filled, lead, empty) = bar_cells(done, total, length);

    let mut bar = String::with_capacity(length + 3);
    bar.push('[');
    bar.extend(std::iter::repeat_n(BAR_FILL, filled));
    bar.push(if lead { BAR_LEAD } else { BAR_FILL });
    bar.extend(std::iter::repeat_n(BAR_EMPTY, empty));
    bar.push(']');
    bar
}

/// Same layout as [`progress_bar`] with the filled part in green and the
/// remainder dimmed.
#[must_use]
pub fn colored_progress_bar(done: f64, total: f64, length: usize) -> String {
    let (filled, lead, empty) = bar_cells(done, total, length);

    let mut head: String = std::iter::repeat_n(BAR_FILL, filled).collect();
    head.push(if lead { BAR_LEAD } else { BAR_FILL });
    let tail: String = std::iter::repeat_n(BAR_EMPTY, empty).collect();

    format!("[{}{}]", head.bright_green(), tail.dimmed())
}

/// Splits the bar into (filled cells, leading marker shown, empty cells).
fn bar_cells(done: f64, total: f64, length: usize) -> (usize, bool, usize) {
    let ratio = if total > 0.0 && done.is_finite() {
        (done / total).max(0.0)
    } else {
        0.0
    };

    let filled = if total > 0.0 && done >= COMPLETE_THRESHOLD * total {
        length
    } else {
        ((ratio * length as f64) as usize).min(length)
    };
    let complete = total > 0.0 && done >= total;

    (filled, !complete, length - filled)
}
