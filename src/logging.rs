// src/logging.rs

use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};

/// `log` backend writing timestamped lines to stderr.
pub struct WorkerLogger;

impl WorkerLogger {
    fn format(record: &Record) -> String {
        format!(
            "[{}][{}] {}: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl log::Log for WorkerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool { metadata.level() <= log::max_level() }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", Self::format(record));
        }
    }

    fn flush(&self) {}
}

static LOGGER: WorkerLogger = WorkerLogger;

/// Installs the logger once; later calls only adjust the level.
pub fn init_logger(level_filter: LevelFilter) -> Result<(), SetLoggerError> {
    static INIT: std::sync::Once = std::sync::Once::new();
    let mut result = Ok(());
    INIT.call_once(|| {
        result = log::set_logger(&LOGGER);
    });
    log::set_max_level(level_filter);
    result
}

/// Parses a level name; unknown names fall back to `Info`.
pub fn parse_level_filter(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}
