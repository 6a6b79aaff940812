//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use ttlprog_core::protocol::ProtocolKind;

/// Protocol family argument
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProtocolArg {
    /// I2C 24Cxx family
    I2c,
    /// SPI 25Cxx family
    Spi,
}

impl From<ProtocolArg> for ProtocolKind {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::I2c => ProtocolKind::I2c,
            ProtocolArg::Spi => ProtocolKind::Spi,
        }
    }
}

#[derive(Parser)]
#[command(name = "ttlprog")]
#[command(author, version, about = "Serial EEPROM programmer over a TTL serial bridge", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read the full EEPROM into a file
    Read {
        /// Serial device, tcp:host:port, or dummy: for the emulator
        #[arg(short, long)]
        port: String,

        /// Baud rate of the bridge link
        #[arg(short, long, default_value_t = 9600)]
        baud: u32,

        /// Protocol family
        #[arg(long, value_enum)]
        protocol: ProtocolArg,

        /// Chip model name (e.g. 24C256) or model index
        #[arg(short, long)]
        model: String,

        /// Output file (.hex writes Intel HEX, anything else raw binary)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write a file image to the EEPROM
    Write {
        /// Serial device, tcp:host:port, or dummy: for the emulator
        #[arg(short, long)]
        port: String,

        /// Baud rate of the bridge link
        #[arg(short, long, default_value_t = 9600)]
        baud: u32,

        /// Protocol family
        #[arg(long, value_enum)]
        protocol: ProtocolArg,

        /// Chip model name (e.g. 24C256) or model index
        #[arg(short, long)]
        model: String,

        /// Input file (Intel HEX detected by extension or content)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List supported chip models
    ListModels,

    /// Show wiring instructions for a protocol family
    Instructions {
        /// Protocol family
        #[arg(long, value_enum)]
        protocol: ProtocolArg,
    },

    /// Interactive serial console to the bridge
    Terminal {
        /// Serial device or tcp:host:port
        #[arg(short, long)]
        port: String,

        /// Baud rate of the bridge link
        #[arg(short, long, default_value_t = 9600)]
        baud: u32,
    },
}
