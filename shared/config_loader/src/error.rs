use std::fmt;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while locating or reading a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// No file at the given path, or none of the searched locations matched.
    FileNotFound(String),
    /// The file exists but could not be read.
    ReadError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ReadError(msg) => write!(f, "Failed to read config file: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
