//! Non-blocking file logger shared by the workspace crates.
//!
//! Records are handed to a dedicated writer thread, so logging from a
//! socket completion or a producer thread never waits on disk I/O.

pub mod error;
mod log_level;
mod log_record;
mod logger;
mod sink;

pub use error::{LoggingError, Result};
pub use log_level::LogLevel;
pub use logger::Logger;
