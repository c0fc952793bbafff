//! Incremental parser for ffmpeg's `-progress` stream.
//!
//! ffmpeg writes `key=value` records separated by `\n` (and, in stats mode,
//! `\r`) for as long as it runs. The parser pulls one byte at a time from a
//! buffered reader, closes a record on every terminator and looks for three
//! independent signals in it:
//!
//! - a media timestamp (`time=` / `out_time=`), which redraws the bar,
//! - a frame counter (`frame=`), which feeds the frame rates,
//! - a speed field (`speed=`), which marks the end of a full stats block and
//!   commits the status line.

use crate::progress::bar::{colored_progress_bar, progress_bar};
use crate::progress::state::{ProgressState, STATS_LINE_RESERVE};
use crate::progress::status_line::StatusLine;
use crate::utils::parse_ffmpeg_time;
use regex::Regex;
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::sync::LazyLock;
use std::time::Instant;

/// Longest record kept in memory. Anything longer is not telemetry.
const MAX_RECORD_LEN: usize = 4096;

static TIME_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?:out_)?time=\s*(\S+)").expect("time marker pattern is valid")
});

static FRAME_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)frame=\s*(\S+)").expect("frame marker pattern is valid")
});

static SPEED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)speed=").expect("speed marker pattern is valid"));

/// Signals found in one completed record.
///
/// Values that fail to parse are dropped, so a malformed token behaves like
/// an absent one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryRecord {
    pub media_time: Option<f64>,
    pub frame: Option<u64>,
    pub end_of_block: bool,
}

impl TelemetryRecord {
    /// Extracts the recognised signals from a record's text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let media_time = TIME_MARKER
            .captures(text)
            .and_then(|caps| parse_ffmpeg_time(&caps[1]));
        let frame = FRAME_MARKER
            .captures(text)
            .and_then(|caps| caps[1].parse::<u64>().ok());

        Self {
            media_time,
            frame,
            end_of_block: SPEED_MARKER.is_match(text),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.media_time.is_none() && self.frame.is_none() && !self.end_of_block
    }
}

/// Counters reported once the stream has closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Records that carried at least one recognised signal.
    pub records: usize,
    /// Stats lines committed to the status line.
    pub stats_lines: usize,
}

/// Consumes the encoder's progress stream and keeps the status line current.
pub struct ProgressStreamParser<'a> {
    state: ProgressState,
    line: &'a mut dyn StatusLine,
    buffer: Vec<u8>,
    overflowed: bool,
    summary: ParseSummary,
}

impl<'a> ProgressStreamParser<'a> {
    #[must_use]
    pub fn new(state: ProgressState, line: &'a mut dyn StatusLine) -> Self {
        Self {
            state,
            line,
            buffer: Vec::with_capacity(256),
            overflowed: false,
            summary: ParseSummary::default(),
        }
    }

    /// Draws the empty bar and commits it so later redraws have a line to
    /// overwrite.
    pub fn draw_initial(&mut self) -> io::Result<()> {
        self.redraw_head()?;
        self.line.commit()
    }

    /// Reads `source` until end of input.
    ///
    /// End of input is how the encoder signals it is done, so it is not an
    /// error. A failing read is logged and treated the same way.
    pub fn run<R: Read>(&mut self, source: R) -> ParseSummary {
        let mut reader = BufReader::new(source);
        loop {
            let byte = match reader.fill_buf() {
                Ok([]) => break,
                Ok(buf) => buf[0],
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!(
                        target: "muncher::progress",
                        "Progress stream read failed, treating as closed: {e}"
                    );
                    break;
                }
            };
            reader.consume(1);
            self.push_byte(byte, Instant::now());
        }
        log::debug!(
            target: "muncher::progress",
            "Progress stream closed after {} records ({} stats lines)",
            self.summary.records,
            self.summary.stats_lines
        );
        self.summary
    }

    /// Feeds one byte of the stream.
    pub fn push_byte(&mut self, byte: u8, now: Instant) {
        match byte {
            b'\r' | b'\n' => {
                if !self.overflowed && !self.buffer.is_empty() {
                    let text = String::from_utf8_lossy(&self.buffer).into_owned();
                    self.complete_record(&text, now);
                }
                self.buffer.clear();
                self.overflowed = false;
            }
            _ if self.overflowed => {}
            _ if self.buffer.len() >= MAX_RECORD_LEN => {
                log::debug!(target: "muncher::progress", "Dropping oversized progress record");
                self.buffer.clear();
                self.overflowed = true;
            }
            _ => self.buffer.push(byte),
        }
    }

    /// Feeds a chunk of bytes, as read from the stream.
    pub fn push_bytes(&mut self, bytes: &[u8], now: Instant) {
        for &byte in bytes {
            self.push_byte(byte, now);
        }
    }

    /// Forces the bar to 100% and writes the final stats line.
    pub fn finish(&mut self) -> io::Result<()> {
        self.state.complete();
        self.redraw_head()?;
        self.line.append(&self.state.stats_text())?;
        self.line.commit()
    }

    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    #[must_use]
    pub fn summary(&self) -> ParseSummary {
        self.summary
    }

    pub fn into_state(self) -> ProgressState {
        self.state
    }

    fn complete_record(&mut self, text: &str, now: Instant) {
        let record = TelemetryRecord::parse(text);
        if record.is_empty() {
            return;
        }
        self.summary.records += 1;

        if let Some(media_time) = record.media_time {
            self.state.record_time(media_time, now);
            if let Err(e) = self.redraw_head() {
                log::debug!(target: "muncher::progress", "Status line redraw failed: {e}");
            }
        }

        if let Some(frame) = record.frame {
            self.state.record_frame(frame, now);
        }

        if record.end_of_block {
            if let Err(e) = self.commit_stats() {
                log::debug!(target: "muncher::progress", "Status line commit failed: {e}");
            }
            self.summary.stats_lines += 1;
        }
    }

    /// Redraws `[bar] NN.N%`, sizing the bar on first use.
    fn redraw_head(&mut self) -> io::Result<()> {
        let percent = self.state.percent_text();
        let width = self
            .state
            .resolve_bar_width(STATS_LINE_RESERVE, self.line.columns());

        let head = if width == 0 {
            percent
        } else {
            let done = self.state.elapsed_media_time();
            let total = self.state.total_duration();
            let bar = if self.line.supports_color() {
                colored_progress_bar(done, total, width)
            } else {
                progress_bar(done, total, width)
            };
            format!("{bar}{percent}")
        };
        self.line.redraw(&head)
    }

    fn commit_stats(&mut self) -> io::Result<()> {
        self.redraw_head()?;
        self.line.append(&self.state.stats_text())?;
        self.line.commit()
    }
}
