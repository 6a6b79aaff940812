//! ttlprog-piclink - Serial link driver for the PIC EEPROM bridge
//!
//! This crate connects the transfer engine from `ttlprog-core` to a real
//! byte-stream link. It provides the [`Transport`] contract, serial and TCP
//! implementations, and the blocking [`Driver`] that pumps an engine
//! against a transport with the response-deadline policy.
//!
//! # Supported Transports
//!
//! - Serial port: `/dev/ttyUSB0`, `/dev/ttyACM0`, `COM3`, etc.
//! - TCP socket: bridges exposed over the network as `host:port`
//!
//! # Example
//!
//! ```no_run
//! use ttlprog_core::device::DeviceProfile;
//! use ttlprog_core::engine::TransferEngine;
//! use ttlprog_core::protocol::ProtocolKind;
//! use ttlprog_piclink::{Driver, SerialTransport};
//!
//! let profile = DeviceProfile::new(ProtocolKind::I2c, 8)?; // 24C256
//! let transport = SerialTransport::open("/dev/ttyUSB0", Some(9600))?;
//! let mut engine = TransferEngine::new(profile);
//! let mut driver = Driver::new(transport);
//! let image = driver.run_read(&mut engine, |_, _| {})?;
//! println!("read {} bytes", image.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod driver;
pub mod error;
pub mod transport;

pub use driver::Driver;
pub use error::{LinkError, Result};
pub use transport::{SerialTransport, TcpTransport, Transport};
