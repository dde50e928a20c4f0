//! Locates and reads configuration files. Parsing is left to the caller.
//!
//! ```no_run
//! use config_loader::{find_and_load, load_config_file};
//!
//! let explicit = load_config_file("./config/sender.json")?;
//! let searched = find_and_load("sender.json")?;
//! # Ok::<(), config_loader::ConfigError>(())
//! ```

pub mod error;

pub use error::{ConfigError, Result};

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable consulted first by [`find_config_file`].
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Reads the whole file at `path` as UTF-8.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    fs::read_to_string(path).map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))
}

/// Candidate locations for `filename`, in search order:
/// `$CONFIG_PATH`, `./config/<filename>`, `./<filename>`.
pub fn candidate_paths(filename: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        candidates.push(PathBuf::from(path));
    }
    candidates.push(Path::new("./config").join(filename));
    candidates.push(Path::new(".").join(filename));
    candidates
}

/// Returns the first existing candidate from [`candidate_paths`].
pub fn find_config_file(filename: &str) -> Result<PathBuf> {
    candidate_paths(filename)
        .into_iter()
        .find(|path| path.is_file())
        .ok_or_else(|| {
            ConfigError::FileNotFound(format!(
                "'{}' (searched ${}, ./config/{}, ./{})",
                filename, CONFIG_PATH_ENV, filename, filename
            ))
        })
}

/// [`find_config_file`] followed by [`load_config_file`].
pub fn find_and_load(filename: &str) -> Result<String> {
    let path = find_config_file(filename)?;
    load_config_file(path)
}
