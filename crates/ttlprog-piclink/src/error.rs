//! Error types for link operations

use thiserror::Error;

/// Errors raised by the transports and the driver
#[derive(Debug, Error)]
pub enum LinkError {
    /// Failed to connect to the bridge
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// I/O error during communication
    #[error("I/O error: {0}")]
    IoError(String),

    /// No response from the bridge within the timeout window
    ///
    /// The session has been abandoned; restarting the transfer begins
    /// again at address 0.
    #[error("Communication timeout")]
    Timeout,

    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Protocol error from the transfer engine
    #[error("{0}")]
    Engine(#[from] ttlprog_core::Error),
}

/// Result type for link operations
pub type Result<T> = core::result::Result<T, LinkError>;

impl From<std::io::Error> for LinkError {
    fn from(e: std::io::Error) -> Self {
        LinkError::IoError(e.to_string())
    }
}
