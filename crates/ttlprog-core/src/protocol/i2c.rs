//! I2C (24Cxx) protocol variant

use alloc::vec::Vec;

use super::{EepromProtocol, OP_READ, OP_WRITE};
use crate::error::{Error, Result};

/// Total sizes in bytes, ascending by model
const SIZES: [usize; 12] = [
    128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768, 65536, 131072, 262144,
];

const NAMES: [&str; 12] = [
    "24C01", "24C02", "24C04", "24C08", "24C16", "24C32", "24C64", "24C128", "24C256", "24C512",
    "24C1024", "24CM02",
];

/// Base 7-bit device address of the 24Cxx family, write form
const DEVICE_ADDR_BASE: u8 = 0xA0;

/// I2C variant: 24C01 through 24CM02
pub struct I2cProtocol;

impl I2cProtocol {
    /// Models up to the 24C16 carry only one address byte on the wire; the
    /// rest of the memory address travels in the device-address byte.
    fn addr_len(model_index: usize) -> u8 {
        if model_index <= 4 {
            1
        } else {
            2
        }
    }

    /// Fold the high memory-address bits into the device-address byte.
    ///
    /// 24C04..24C16 put the page-select bits (address 10:8) in device
    /// address bits 3:1; the megabit parts put the bank bits (address
    /// 17:16) there instead. The bit placement is a hardware constraint of
    /// the parts, not a framing convention.
    fn chip_addr(address: u32, model_index: usize) -> u8 {
        let mut chip_addr = DEVICE_ADDR_BASE;
        if (2..=4).contains(&model_index) {
            chip_addr |= (((address >> 8) & 0x07) as u8) << 1;
        } else if model_index >= 10 {
            chip_addr |= (((address >> 16) & 0x03) as u8) << 1;
        }
        chip_addr
    }

    fn frame(&self, op: u8, address: u32, length: usize, model_index: usize) -> Vec<u8> {
        let mut cmd = Vec::with_capacity(7);
        cmd.extend_from_slice(&[
            self.command_prefix(),
            op,
            Self::addr_len(model_index),
            Self::chip_addr(address, model_index),
            (address >> 8) as u8,
            address as u8,
            length as u8,
        ]);
        cmd
    }
}

impl EepromProtocol for I2cProtocol {
    fn command_prefix(&self) -> u8 {
        b'I'
    }

    fn model_names(&self) -> &'static [&'static str] {
        &NAMES
    }

    fn total_size(&self, model_index: usize) -> Result<usize> {
        SIZES
            .get(model_index)
            .copied()
            .ok_or(Error::UnknownModel(model_index))
    }

    fn page_size(&self, model_index: usize) -> usize {
        if model_index <= 1 {
            8 // 24C01 / 24C02
        } else if model_index <= 4 {
            16 // 24C04 / 24C08 / 24C16
        } else if model_index <= 6 {
            32 // 24C32 / 24C64
        } else if model_index <= 9 {
            64 // 24C128 / 24C256 / 24C512
        } else {
            256 // 24C1024 / 24CM02
        }
    }

    fn build_read_command(&self, address: u32, length: usize, model_index: usize) -> Vec<u8> {
        self.frame(OP_READ, address, length, model_index)
    }

    fn build_write_command_base(&self, address: u32, length: usize, model_index: usize) -> Vec<u8> {
        self.frame(OP_WRITE, address, length, model_index)
    }

    fn hardware_instructions(&self) -> &'static str {
        "I2C wiring (24Cxx):\n\
         \x20 PIC RA0  -> EEPROM SDA (pin 5)\n\
         \x20 PIC RA1  -> EEPROM SCL (pin 6)\n\
         \x20 PIC GND  -> EEPROM GND (pin 4)\n\
         \x20 PIC VCC  -> EEPROM VCC (pin 8)\n\
         \n\
         SDA and SCL require external pull-up resistors to VCC;\n\
         4.7k is the nominal value, 2.2k to 10k is acceptable.\n\
         Tie A0, A1, A2 (pins 1-3) to GND.\n\
         Tie WP (pin 7) to GND to allow writes."
    }
}
