//! Common error types for tohong

use thiserror::Error;

use crate::decoder::DecodeError;

/// Common result type for tohong operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the core and the service
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML config file could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (malformed date, blank name, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Birth year outside the Nạp Âm lookup table.
    ///
    /// Calculators degrade this to a sentinel label; it only surfaces as an
    /// error from the strict lookup.
    #[error("Calendar year {0} is outside the element lookup table")]
    UnresolvedCalendarYear(i32),

    /// Provider text did not contain recoverable JSON
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
