use std::io::{IsTerminal, Write};
use std::time::Instant;

use anstyle::{AnsiColor, Reset, Style};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use parking_lot::Mutex;

const INFO_MARKER: Style = Style::new()
    .fg_color(Some(anstyle::Color::Ansi(AnsiColor::Cyan)))
    .bold();
const ERROR_MARKER: Style = Style::new()
    .fg_color(Some(anstyle::Color::Ansi(AnsiColor::Red)))
    .bold();

/// Erases whatever the progress bar left on the current terminal line
const CLEAR_LINE: &str = "\r\x1b[2K";

struct ProjectorLogger {
    file: Option<Mutex<std::fs::File>>,
    filter: LevelFilter,
    start: Instant,
    terminal: bool,
}

impl Log for ProjectorLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.start.elapsed().as_secs_f64();
        let message = record.args().to_string();
        let mut stdout = std::io::stdout().lock();
        if self.terminal {
            let style = if is_error(record.level()) {
                ERROR_MARKER
            } else {
                INFO_MARKER
            };
            let _ = writeln!(
                stdout,
                "{CLEAR_LINE}{style}{}{Reset}",
                format_line(record.level(), &message, elapsed)
            );
        } else {
            let _ = writeln!(stdout, "{}", format_line(record.level(), &message, elapsed));
        }
        drop(stdout);

        if let Some(ref file) = self.file {
            let _ = writeln!(
                file.lock(),
                "[{elapsed:.3}s] [{}] {} - {message}",
                record.level(),
                record.target(),
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        if let Some(ref file) = self.file {
            let _ = file.lock().flush();
        }
    }
}

fn is_error(level: Level) -> bool {
    matches!(level, Level::Error | Level::Warn)
}

/// Format one log line: `[*] <<<<<<<< [1.234s] message >>>>>>>>`, with `[!]` for warnings and errors
#[must_use]
pub fn format_line(level: Level, message: &str, elapsed_secs: f64) -> String {
    let marker = if is_error(level) { '!' } else { '*' };
    format!("[{marker}] <<<<<<<< [{elapsed_secs:.3}s] {message} >>>>>>>>")
}

/// Initialize the global logger. `RUST_LOG` takes precedence over `level`.
///
/// # Errors
///
/// Returns `SetLoggerError` if a logger is already installed.
pub fn init(level: LevelFilter, log_file: Option<std::fs::File>) -> Result<(), SetLoggerError> {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(level);

    let logger = ProjectorLogger {
        file: log_file.map(Mutex::new),
        filter,
        start: Instant::now(),
        terminal: std::io::stdout().is_terminal(),
    };

    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(filter);
    Ok(())
}
