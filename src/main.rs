//! ttlprog - serial EEPROM programmer over a TTL serial bridge
//!
//! Reads and writes 24Cxx (I2C) and 25Cxx (SPI) serial EEPROMs through a
//! PIC microcontroller that bridges a USB-TTL serial link to the chip's
//! native bus. The protocol logic lives in `ttlprog-core`; the serial and
//! TCP transports and the blocking transfer driver live in
//! `ttlprog-piclink`; an in-memory bridge emulator (`--port dummy:`) is
//! available for hardware-free runs.

mod cli;
mod commands;
mod image;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Read {
            port,
            baud,
            protocol,
            model,
            output,
        } => commands::read::run(&port, baud, protocol.into(), &model, &output),
        Commands::Write {
            port,
            baud,
            protocol,
            model,
            input,
        } => commands::write::run(&port, baud, protocol.into(), &model, &input),
        Commands::ListModels => {
            commands::list_models();
            Ok(())
        }
        Commands::Instructions { protocol } => {
            commands::instructions(protocol.into());
            Ok(())
        }
        Commands::Terminal { port, baud } => commands::terminal::run(&port, baud),
    }
}
