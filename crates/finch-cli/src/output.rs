//! Colored diagnostics on stderr.
//!
//! Uses `termcolor` for cross-platform colored terminal output.
//! Respects `NO_COLOR` environment variable and `--color` flag.

use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Cyan,
        Level::Trace => Color::White,
    }
}

/// `log` backend writing one colored line per record to stderr.
pub struct StderrLogger {
    level: LevelFilter,
    choice: ColorChoice,
}

impl StderrLogger {
    /// Create a logger that shows records up to `level`.
    pub fn new(level: LevelFilter, choice: ColorChoice) -> Self {
        Self { level, choice }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = StandardStream::stderr(self.choice);
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(level_color(record.level()))).set_bold(true);
        let _ = stderr.set_color(&spec);
        let _ = write!(stderr, "{:>5}", record.level());
        let _ = stderr.reset();
        let _ = writeln!(stderr, " {}: {}", record.target(), record.args());
    }

    fn flush(&self) {}
}

/// Install a [`StderrLogger`] as the global logger.
pub fn init_logger(level: LevelFilter, choice: ColorChoice) -> Result<(), log::SetLoggerError> {
    let logger: &'static StderrLogger = Box::leak(Box::new(StderrLogger::new(level, choice)));
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Print a fatal error as `error: message` on stderr.
pub fn print_error(choice: ColorChoice, message: &str) {
    let mut stderr = StandardStream::stderr(choice);
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Red)).set_bold(true);
    let _ = stderr.set_color(&spec);
    let _ = write!(stderr, "error");
    let _ = stderr.reset();
    let _ = writeln!(stderr, ": {}", message);
}
