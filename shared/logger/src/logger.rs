//! Cloneable logger handle.

use crate::error::Result;
use crate::log_level::LogLevel;
use crate::log_record::LogRecord;
use crate::sink::spawn_file_sink;
use std::path::Path;
use std::sync::mpsc::{Sender, channel};

/// Thread-safe, non-blocking logger.
///
/// Clones and component loggers derived with [`Logger::for_component`]
/// share one channel to a single writer thread. The thread exits once the
/// last handle is dropped.
///
/// # Examples
///
/// ```no_run
/// use logging::{LogLevel, Logger};
///
/// let logger = Logger::new("rtp.log", LogLevel::Info).unwrap();
/// let sender_log = logger.for_component("UnicastSender");
/// sender_log.info("sender created");
/// ```
#[derive(Clone)]
pub struct Logger {
    records: Option<Sender<LogRecord>>,
    level: LogLevel,
    component: Option<String>,
    console: bool,
}

impl Logger {
    /// Creates a logger appending to `path`, recording `level` and above.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or the writer thread cannot start.
    pub fn new<P: AsRef<Path>>(path: P, level: LogLevel) -> Result<Self> {
        Self::with_console(path, level, false)
    }

    /// Same as [`Logger::new`], optionally echoing every record to stdout.
    pub fn with_console<P: AsRef<Path>>(path: P, level: LogLevel, console: bool) -> Result<Self> {
        let (tx, rx) = channel();
        spawn_file_sink(path.as_ref(), rx)?;
        Ok(Logger {
            records: Some(tx),
            level,
            component: None,
            console,
        })
    }

    /// A logger that drops every record. No file, no thread.
    pub fn disabled() -> Self {
        Logger {
            records: None,
            level: LogLevel::Error,
            component: None,
            console: false,
        }
    }

    /// Derives a logger tagging its records with `component`.
    pub fn for_component(&self, component: &str) -> Self {
        Logger {
            records: self.records.clone(),
            level: self.level,
            component: Some(component.to_string()),
            console: self.console,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        (self.records.is_some() || self.console) && level >= self.level
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn log(&self, level: LogLevel, message: &str) {
        if !self.is_enabled(level) {
            return;
        }
        let record = LogRecord::new(level, self.component.as_deref(), message);
        if self.console {
            print!("{}", record.render());
        }
        if let Some(records) = &self.records {
            // Writer gone means the process is shutting down; nothing to report to.
            let _ = records.send(record);
        }
    }
}
