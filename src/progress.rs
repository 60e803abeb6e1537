//! Planned vs. completed command accounting and the live progress bar

use std::io::{IsTerminal, Write};

const DEFAULT_WIDTH: usize = 80;
const FILLED: char = '█';
const UNFILLED: char = '░';
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Counts completed commands against the planned total.
///
/// Forwarded child output goes through [`Progress::output`] so the bar can be
/// cleared before the line is written and redrawn after it.
pub struct Progress {
    total: usize,
    done: usize,
    out: Box<dyn Write + Send>,
    show_bar: bool,
    drawn: bool,
}

impl Progress {
    /// Progress on stdout, with a bar when stdout is a terminal
    #[must_use]
    pub fn new() -> Self {
        let show_bar = std::io::stdout().is_terminal();
        Self::with_output(Box::new(std::io::stdout()), show_bar)
    }

    /// Progress on stdout that never draws a bar
    #[must_use]
    pub fn hidden() -> Self {
        Self::with_output(Box::new(std::io::stdout()), false)
    }

    #[must_use]
    pub fn with_output(out: Box<dyn Write + Send>, show_bar: bool) -> Self {
        Self {
            total: 0,
            done: 0,
            out,
            show_bar,
            drawn: false,
        }
    }

    /// Reset the counters for a new plan of `total` commands
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn done(&self) -> usize {
        self.done
    }

    pub fn complete_one(&mut self) {
        self.done += 1;
    }

    /// Stop drawing the bar, erasing it if it is on screen
    pub fn hide_bar(&mut self) {
        self.clear();
        self.show_bar = false;
    }

    /// Write one line of forwarded output, keeping the bar below it
    pub fn output(&mut self, line: &str) {
        self.print(line);
        self.draw();
    }

    /// Write one line without redrawing the bar afterwards
    pub fn print(&mut self, line: &str) {
        self.clear();
        let _ = writeln!(self.out, "{line}");
    }

    /// Take the bar off screen while `f` writes to the terminal, then put it back.
    ///
    /// Log records go straight to stdout, so they are emitted through here.
    pub fn suspend<R>(&mut self, f: impl FnOnce() -> R) -> R {
        self.clear();
        let _ = self.out.flush();
        let result = f();
        self.draw();
        result
    }

    /// Redraw the bar on the current line
    pub fn draw(&mut self) {
        if !self.show_bar {
            return;
        }
        let bar = render_bar(self.done, self.total, terminal_width());
        let _ = write!(self.out, "{CLEAR_LINE}{bar}");
        let _ = self.out.flush();
        self.drawn = true;
    }

    /// Erase the bar if it is currently on screen
    pub fn clear(&mut self) {
        if self.drawn {
            let _ = write!(self.out, "{CLEAR_LINE}");
            self.drawn = false;
        }
    }

    /// Leave the final bar on its own line
    pub fn finish(&mut self) {
        if self.drawn {
            let _ = writeln!(self.out);
            self.drawn = false;
        }
        let _ = self.out.flush();
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

fn terminal_width() -> usize {
    width_or_default(crossterm::terminal::size().ok().map(|(cols, _)| cols))
}

/// Terminals without a configured size report zero columns
fn width_or_default(cols: Option<u16>) -> usize {
    match cols {
        Some(cols) if cols > 0 => usize::from(cols),
        _ => DEFAULT_WIDTH,
    }
}

/// Render `[███░░░] done/total` so that the whole line is `width` columns wide.
///
/// An empty plan renders as a full bar.
#[must_use]
pub fn render_bar(done: usize, total: usize, width: usize) -> String {
    let label = format!(" {done}/{total}");
    let bar_width = width.saturating_sub(label.len() + 2);
    let filled = if total == 0 {
        bar_width
    } else {
        bar_width * done.min(total) / total
    };
    let mut bar = String::with_capacity(width * 3);
    bar.push('[');
    bar.extend(std::iter::repeat_n(FILLED, filled));
    bar.extend(std::iter::repeat_n(UNFILLED, bar_width - filled));
    bar.push(']');
    bar.push_str(&label);
    bar
}
