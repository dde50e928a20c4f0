//! Error types for the unicast sender.

use logging::LoggingError;
use std::fmt;

pub type Result<T> = std::result::Result<T, RtpError>;

#[derive(Debug)]
pub enum RtpError {
    /// A sub-resource could not be created. Nothing was leaked.
    Allocation(String),
    /// The sender has latched this transport status and no longer dispatches.
    Transport(i32),
    Config(String),
    Logging(LoggingError),
    Io(String),
}

impl RtpError {
    /// The latched transport code, if this is a transport failure.
    pub fn transport_code(&self) -> Option<i32> {
        match self {
            RtpError::Transport(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for RtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtpError::Allocation(msg) => write!(f, "Allocation failed: {}", msg),
            RtpError::Transport(code) => write!(f, "Transport failed with status {}", code),
            RtpError::Config(msg) => write!(f, "Config error: {}", msg),
            RtpError::Logging(err) => write!(f, "{}", err),
            RtpError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for RtpError {}

impl From<LoggingError> for RtpError {
    fn from(err: LoggingError) -> Self {
        RtpError::Logging(err)
    }
}

impl From<config_loader::ConfigError> for RtpError {
    fn from(err: config_loader::ConfigError) -> Self {
        RtpError::Config(err.to_string())
    }
}
