//! Telnet codec error types.

use thiserror::Error;

/// Telnet codec errors
#[derive(Error, Debug)]
pub enum TelnetError {
    /// Input line exceeded the configured high watermark
    #[error("input line exceeds {0} bytes")]
    LineTooLong(usize),
}
