//! Read command implementation

use std::path::Path;

use ttlprog_core::engine::TransferEngine;
use ttlprog_core::protocol::ProtocolKind;
use ttlprog_dummy::{BridgeConfig, DummyBridge};
use ttlprog_piclink::{Driver, SerialTransport, TcpTransport, Transport};

use super::{parse_port, resolve_profile, transfer_bar, Port};
use crate::image;

/// Run the read command
pub fn run(
    port: &str,
    baud: u32,
    kind: ProtocolKind,
    model: &str,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = resolve_profile(kind, model)?;

    println!(
        "Reading {} ({} bytes, {} byte pages)",
        profile.model_name(),
        profile.total_size,
        profile.page_size
    );

    let mut engine = TransferEngine::new(profile);
    let image = match parse_port(port)? {
        Port::Dummy => read_with_progress(
            DummyBridge::new(BridgeConfig {
                memory_size: profile.total_size,
                ..Default::default()
            }),
            &mut engine,
        )?,
        Port::Tcp(host, tcp_port) => {
            read_with_progress(TcpTransport::connect(&host, tcp_port)?, &mut engine)?
        }
        Port::Serial(device) => {
            read_with_progress(SerialTransport::open(&device, Some(baud))?, &mut engine)?
        }
    };

    image::save(output, &image)?;
    println!("Wrote {} bytes to {:?}", image.len(), output);

    Ok(())
}

/// Pump a read session with a progress bar
fn read_with_progress<T: Transport>(
    transport: T,
    engine: &mut TransferEngine,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let pb = transfer_bar(engine.profile().total_size as u64);

    let mut driver = Driver::new(transport);
    let image = driver.run_read(engine, |done, _total| pb.set_position(done as u64))?;

    pb.finish_with_message("Read complete");
    Ok(image)
}
