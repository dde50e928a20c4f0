//! Process-wide setup and teardown.
//!
//! The sender keeps no global state, so both hooks succeed without doing
//! anything. They stay public so callers have a stable place to pair
//! library startup and shutdown.

use crate::error::Result;

pub fn init() -> Result<()> {
    Ok(())
}

pub fn cleanup() -> Result<()> {
    Ok(())
}
