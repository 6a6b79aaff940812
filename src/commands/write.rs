//! Write command implementation

use std::path::Path;

use ttlprog_core::engine::TransferEngine;
use ttlprog_core::protocol::ProtocolKind;
use ttlprog_dummy::{BridgeConfig, DummyBridge};
use ttlprog_piclink::{Driver, SerialTransport, TcpTransport, Transport};

use super::{parse_port, resolve_profile, transfer_bar, Port};
use crate::image;

/// Run the write command
pub fn run(
    port: &str,
    baud: u32,
    kind: ProtocolKind,
    model: &str,
    input: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = resolve_profile(kind, model)?;

    let payload = image::load(input, profile.total_size)?;
    println!("Loaded {} bytes from {:?}", payload.len(), input);

    // The capacity check lives in the engine, before any byte is sent.
    let mut engine = TransferEngine::new(profile);
    match parse_port(port)? {
        Port::Dummy => write_with_progress(
            DummyBridge::new(BridgeConfig {
                memory_size: profile.total_size,
                ..Default::default()
            }),
            &mut engine,
            payload,
        )?,
        Port::Tcp(host, tcp_port) => write_with_progress(
            TcpTransport::connect(&host, tcp_port)?,
            &mut engine,
            payload,
        )?,
        Port::Serial(device) => write_with_progress(
            SerialTransport::open(&device, Some(baud))?,
            &mut engine,
            payload,
        )?,
    }

    println!("Write complete");
    Ok(())
}

/// Pump a write session with a progress bar
fn write_with_progress<T: Transport>(
    transport: T,
    engine: &mut TransferEngine,
    payload: Vec<u8>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = transfer_bar(payload.len() as u64);

    let mut driver = Driver::new(transport);
    driver.run_write(engine, payload, |done, _total| pb.set_position(done as u64))?;

    pb.finish_with_message("Write complete");
    Ok(())
}
