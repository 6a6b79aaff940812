//! ttlprog-core - Core library for serial EEPROM programming
//!
//! This crate provides the protocol logic for reading and writing serial
//! EEPROM chips (I2C 24Cxx and SPI 25Cxx families) through a microcontroller
//! bridge on a byte-stream serial link. It contains no I/O: the transfer
//! engine is an event-driven state machine that hands frames to the caller
//! and reacts to the bytes the caller feeds back.
//!
//! The crate is `no_std` (it requires `alloc` for frame and image buffers).
//!
//! # Features
//!
//! - `std` - Implement `std::error::Error` for the error types
//!
//! # Example
//!
//! ```ignore
//! use ttlprog_core::device::DeviceProfile;
//! use ttlprog_core::engine::{Step, TransferEngine};
//! use ttlprog_core::protocol::ProtocolKind;
//!
//! let profile = DeviceProfile::new(ProtocolKind::I2c, 8)?; // 24C256
//! let mut engine = TransferEngine::new(profile);
//! let mut step = engine.start_read()?;
//! // put Step::Send frames on the wire, feed received bytes to
//! // engine.handle_bytes() until Step::ReadDone yields the image
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod device;
pub mod engine;
pub mod error;
pub mod ihex;
pub mod protocol;

pub use error::{Error, Result};
