//! CLI command implementations
//!
//! Transfer commands resolve the device profile, open the transport the
//! port argument names, and pump a `TransferEngine` through the blocking
//! driver. The `dummy:` port selects the in-memory bridge emulator so
//! every command can run without hardware.

mod list;
pub mod read;
pub mod terminal;
pub mod write;

pub use list::{instructions, list_models};

use indicatif::{ProgressBar, ProgressStyle};
use ttlprog_core::device::{self, DeviceProfile};
use ttlprog_core::protocol::ProtocolKind;

/// Parsed port argument
pub enum Port {
    /// A serial device path
    Serial(String),
    /// A bridge exposed over TCP
    Tcp(String, u16),
    /// The in-memory bridge emulator
    Dummy,
}

/// Parse the port argument into a transport selector
pub fn parse_port(port: &str) -> Result<Port, Box<dyn std::error::Error>> {
    if port == "dummy:" || port == "dummy" {
        return Ok(Port::Dummy);
    }
    if let Some(rest) = port.strip_prefix("tcp:") {
        let (host, tcp_port) = rest
            .rsplit_once(':')
            .ok_or("TCP port format is tcp:host:port")?;
        return Ok(Port::Tcp(host.to_string(), tcp_port.parse()?));
    }
    Ok(Port::Serial(port.to_string()))
}

/// Resolve a model argument (display name or table index) into a profile
pub fn resolve_profile(
    kind: ProtocolKind,
    model: &str,
) -> Result<DeviceProfile, Box<dyn std::error::Error>> {
    let index = match device::find_model(kind, model) {
        Some(index) => index,
        None => model
            .parse::<usize>()
            .map_err(|_| format!("unknown {} model: {}", kind.name(), model))?,
    };
    Ok(DeviceProfile::new(kind, index)?)
}

/// Byte-count progress bar used by the transfer commands
pub fn transfer_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
