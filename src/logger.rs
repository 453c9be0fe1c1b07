use std::io;
use std::io::Write;

use log::*;

struct Logger;

fn loglevel_ansi_color(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1B[1;31m",
        Level::Warn => "\x1B[1;33m",
        Level::Info => "\x1B[1;34m",
        Level::Debug => "\x1B[1;35m",
        Level::Trace => "\x1B[1;36m",
    }
}

#[cfg(not(debug_assertions))]
const LEVEL_FILTER: LevelFilter = LevelFilter::Info;
#[cfg(debug_assertions)]
const LEVEL_FILTER: LevelFilter = LevelFilter::Debug;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= LEVEL_FILTER
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let (mut stdout, mut stderr);

        let color = loglevel_ansi_color(record.level());
        let writer: &mut dyn Write = if record.level() <= Level::Warn {
            stderr = io::stderr();
            &mut stderr
        } else {
            stdout = io::stdout();
            &mut stdout
        };

        // A failed log write has nowhere left to be reported
        if cfg!(debug_assertions) {
            let _ = writeln!(
                writer,
                "{color}{}\x1B[0;0m {}:{} - {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args(),
                color = color
            );
        } else {
            let _ = writeln!(
                writer,
                "{color}{}\x1B[0;0m - {}",
                record.level(),
                record.args(),
                color = color
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;

/// Installs the colored stdout/stderr logger. Errors and warnings go to stderr.
pub fn init() -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(LEVEL_FILTER))
}
