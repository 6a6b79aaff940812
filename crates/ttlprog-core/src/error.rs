//! Error types for ttlprog-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
///
/// All variants are detected synchronously, before any session state is
/// mutated or any byte is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A read or write session is already active
    SessionActive,
    /// Write payload exceeds the capacity of the selected chip
    OversizedPayload {
        /// Payload length in bytes
        len: usize,
        /// Total size of the selected chip
        capacity: usize,
    },
    /// Model index is out of range for the protocol family
    UnknownModel(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionActive => write!(f, "a transfer session is already active"),
            Self::OversizedPayload { len, capacity } => {
                write!(
                    f,
                    "payload ({} bytes) exceeds chip capacity ({} bytes)",
                    len, capacity
                )
            }
            Self::UnknownModel(index) => write!(f, "unknown model index {}", index),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
