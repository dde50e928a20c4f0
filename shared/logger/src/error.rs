//! Logger error types.

use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, LoggingError>;

/// Errors raised while setting up a logger.
#[derive(Debug)]
pub enum LoggingError {
    /// The log file could not be opened or created.
    Io(io::Error),
    /// The writer thread could not be started.
    Spawn(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::Io(err) => write!(f, "Log file error: {}", err),
            LoggingError::Spawn(msg) => write!(f, "Log writer error: {}", msg),
        }
    }
}

impl std::error::Error for LoggingError {}

impl From<io::Error> for LoggingError {
    fn from(err: io::Error) -> Self {
        LoggingError::Io(err)
    }
}
