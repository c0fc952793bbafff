//! Status line targets.
//!
//! The parser never writes escape sequences itself. It talks to a
//! [`StatusLine`], which owns the single logical display line of the running
//! job: `redraw` replaces it, `append` extends it and `commit` ends it with a
//! newline. [`AnsiStatusLine`] overwrites the line in place with cursor
//! control sequences; [`PlainStatusLine`] only emits whole committed lines and
//! is used when stdout is not an interactive terminal.

use console::Term;
use std::io::{self, Write};

/// Moves the cursor to column 0 and clears the line.
const CLEAR_LINE: &str = "\r\x1b[2K";
/// Moves the cursor up one line.
const CURSOR_UP: &str = "\x1b[1A";
/// Clears from the cursor to the end of the screen.
const CLEAR_TO_END: &str = "\x1b[0J";
/// Resets colours after a clipped, possibly coloured, text.
const RESET: &str = "\x1b[0m";

/// A terminal-like target owning one logical display line.
pub trait StatusLine: Send {
    /// Number of columns available, if known.
    fn columns(&self) -> Option<usize>;

    /// Whether bars should be drawn with colour.
    fn supports_color(&self) -> bool {
        false
    }

    /// Replaces the current display line with `text`.
    fn redraw(&mut self, text: &str) -> io::Result<()>;

    /// Appends `text` to the current display line.
    fn append(&mut self, text: &str) -> io::Result<()>;

    /// Terminates the current display line.
    fn commit(&mut self) -> io::Result<()>;
}

/// Where the cursor is relative to the display line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Nothing drawn yet.
    Fresh,
    /// On the display line, which has not been terminated.
    OnLine,
    /// At the start of the line below a committed display line.
    BelowLine,
}

/// Redraws the display line in place using ANSI cursor control.
///
/// Text past the known terminal width is dropped: a wrapped line would leave
/// a physical row behind that the next redraw cannot reach.
pub struct AnsiStatusLine<W: Write + Send> {
    out: W,
    columns: Option<usize>,
    color: bool,
    cursor: Cursor,
    /// Visible columns used on the display line.
    used: usize,
}

impl AnsiStatusLine<io::Stdout> {
    /// Status line on the process stdout, sized from the attached terminal.
    #[must_use]
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), crate::terminal::terminal_columns(), color)
    }
}

impl<W: Write + Send> AnsiStatusLine<W> {
    pub fn new(out: W, columns: Option<usize>, color: bool) -> Self {
        Self {
            out,
            columns,
            color,
            cursor: Cursor::Fresh,
            used: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_clipped(&mut self, text: &str) -> io::Result<()> {
        let room = self
            .columns
            .map_or(usize::MAX, |cols| cols.saturating_sub(self.used));
        let (kept, width) = clip_visible(text, room);
        self.out.write_all(kept.as_bytes())?;
        if kept.len() < text.len() && self.color {
            self.out.write_all(RESET.as_bytes())?;
        }
        self.used += width;
        Ok(())
    }
}

/// Splits off the part of `text` that fits in `room` visible columns.
///
/// CSI escape sequences take no room. Returns the kept prefix and its width.
fn clip_visible(text: &str, room: usize) -> (&str, usize) {
    let mut width = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((at, c)) = chars.next() {
        if c == '\x1b' {
            if let Some(&(_, '[')) = chars.peek() {
                chars.next();
                for (_, c) in chars.by_ref() {
                    if ('@'..='~').contains(&c) {
                        break;
                    }
                }
            }
            continue;
        }
        if width == room {
            return (&text[..at], width);
        }
        width += 1;
    }
    (text, width)
}

/// Number of terminal columns `text` occupies.
#[cfg(test)]
pub(crate) fn visible_width(text: &str) -> usize {
    clip_visible(text, usize::MAX).1
}

impl<W: Write + Send> StatusLine for AnsiStatusLine<W> {
    fn columns(&self) -> Option<usize> {
        self.columns
    }

    fn supports_color(&self) -> bool {
        self.color
    }

    fn redraw(&mut self, text: &str) -> io::Result<()> {
        match self.cursor {
            Cursor::Fresh | Cursor::OnLine => write!(self.out, "{CLEAR_LINE}")?,
            Cursor::BelowLine => write!(self.out, "{CURSOR_UP}{CLEAR_LINE}{CLEAR_TO_END}")?,
        }
        self.used = 0;
        self.write_clipped(text)?;
        self.cursor = Cursor::OnLine;
        self.out.flush()
    }

    fn append(&mut self, text: &str) -> io::Result<()> {
        self.write_clipped(text)?;
        self.cursor = Cursor::OnLine;
        self.out.flush()
    }

    fn commit(&mut self) -> io::Result<()> {
        writeln!(self.out, "{CLEAR_TO_END}")?;
        self.cursor = Cursor::BelowLine;
        self.used = 0;
        self.out.flush()
    }
}

/// Emits complete lines only, for pipes, log files and dumb terminals.
pub struct PlainStatusLine<W: Write + Send> {
    out: W,
    line: String,
}

impl PlainStatusLine<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> PlainStatusLine<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            line: String::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> StatusLine for PlainStatusLine<W> {
    fn columns(&self) -> Option<usize> {
        None
    }

    fn redraw(&mut self, text: &str) -> io::Result<()> {
        self.line.clear();
        self.line.push_str(text);
        Ok(())
    }

    fn append(&mut self, text: &str) -> io::Result<()> {
        self.line.push_str(text);
        Ok(())
    }

    fn commit(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", self.line.trim_start())?;
        self.line.clear();
        self.out.flush()
    }
}

/// Picks the status line for stdout: in-place redraws on a terminal,
/// whole lines otherwise.
#[must_use]
pub fn stdout_status_line(color: bool) -> Box<dyn StatusLine> {
    if Term::stdout().is_term() {
        Box::new(AnsiStatusLine::stdout(color))
    } else {
        Box::new(PlainStatusLine::stdout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ansi() -> AnsiStatusLine<Vec<u8>> {
        AnsiStatusLine::new(Vec::new(), Some(80), false)
    }

    fn text(line: AnsiStatusLine<Vec<u8>>) -> String {
        String::from_utf8(line.into_inner()).unwrap()
    }

    #[test]
    fn test_first_draw_does_not_move_up() {
        let mut line = ansi();
        line.redraw("[>...]").unwrap();
        line.commit().unwrap();
        let out = text(line);
        assert!(!out.contains(CURSOR_UP));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_redraw_after_commit_overwrites_previous_line() {
        let mut line = ansi();
        line.redraw("[>...]").unwrap();
        line.commit().unwrap();
        line.redraw("[#>..]").unwrap();
        let out = text(line);
        assert_eq!(out.matches(CURSOR_UP).count(), 1);
        assert!(out.ends_with("[#>..]"));
    }

    #[test]
    fn test_repeated_redraw_on_open_line_stays_on_line() {
        let mut line = ansi();
        line.redraw("a").unwrap();
        line.commit().unwrap();
        line.redraw("b").unwrap();
        line.redraw("c").unwrap();
        let out = text(line);
        // Only the first redraw after the commit may climb a line
        assert_eq!(out.matches(CURSOR_UP).count(), 1);
    }

    #[test]
    fn test_text_past_the_last_column_is_dropped() {
        let mut line = AnsiStatusLine::new(Vec::new(), Some(10), false);
        line.redraw("[###>....] 40.0%").unwrap();
        line.append(" time: 4.0s").unwrap();
        line.commit().unwrap();
        line.redraw("[####>...]").unwrap();
        line.append(" 50.0%").unwrap();
        let out = text(line);

        let rows: Vec<&str> = out.split('\n').collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].ends_with(&format!("[###>....]{CLEAR_TO_END}")));
        assert!(rows[1].ends_with("[####>...]"));
    }

    #[test]
    fn test_escape_sequences_take_no_room() {
        assert_eq!(visible_width("\x1b[32m###\x1b[0m>.."), 6);
        assert_eq!(clip_visible("\x1b[32m####\x1b[0m", 2), ("\x1b[32m##", 2));

        let mut line = AnsiStatusLine::new(Vec::new(), Some(4), true);
        line.redraw("\x1b[32m######\x1b[0m").unwrap();
        let out = text(line);
        assert!(out.ends_with(&format!("\x1b[32m####{RESET}")));
    }

    #[test]
    fn test_plain_emits_only_committed_lines() {
        let mut line = PlainStatusLine::new(Vec::new());
        line.redraw("[>...] 0.0%").unwrap();
        line.redraw("[#>..] 25.0%").unwrap();
        line.append(" time: 1.0s").unwrap();
        line.commit().unwrap();
        let out = String::from_utf8(line.into_inner()).unwrap();
        assert_eq!(out, "[#>..] 25.0% time: 1.0s\n");
    }
}
