//! SPI (25Cxx) protocol variant

use alloc::vec::Vec;

use super::{EepromProtocol, OP_READ, OP_WRITE};
use crate::error::{Error, Result};

/// Total sizes in bytes, ascending by model
const SIZES: [usize; 13] = [
    128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768, 65536, 131072, 262144, 524288,
];

const NAMES: [&str; 13] = [
    "25C010", "25C020", "25C040", "25C080", "25C160", "25C320", "25C640", "25C128", "25C256",
    "25C512", "25CM01", "25CM02", "25CM04",
];

/// READ array opcode
const OPCODE_READ: u8 = 0x03;
/// WRITE array opcode
const OPCODE_WRITE: u8 = 0x02;

/// SPI variant: 25C010 through 25CM04
pub struct SpiProtocol;

impl SpiProtocol {
    fn addr_len(model_index: usize) -> u8 {
        if model_index < 3 {
            1
        } else if model_index >= 10 {
            3
        } else {
            2
        }
    }

    /// The 25C040 addresses 512 bytes through a 1-byte address field by
    /// overloading bit 3 of the opcode with address bit 8.
    fn opcode(base: u8, address: u32, model_index: usize) -> u8 {
        let mut opcode = base;
        if model_index == 2 {
            opcode |= (((address >> 8) & 0x01) as u8) << 3;
        }
        opcode
    }

    fn frame(
        &self,
        base_opcode: u8,
        op: u8,
        address: u32,
        length: usize,
        model_index: usize,
    ) -> Vec<u8> {
        let mut cmd = Vec::with_capacity(8);
        cmd.extend_from_slice(&[
            self.command_prefix(),
            op,
            Self::addr_len(model_index),
            Self::opcode(base_opcode, address, model_index),
            (address >> 16) as u8,
            (address >> 8) as u8,
            address as u8,
            length as u8,
        ]);
        cmd
    }
}

impl EepromProtocol for SpiProtocol {
    fn command_prefix(&self) -> u8 {
        b'P'
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
            8 // 25C010 / 25C020
        } else if model_index <= 4 {
            16 // 25C040 / 25C080 / 25C160
        } else if model_index <= 6 {
            32 // 25C320 / 25C640
        } else if model_index <= 8 {
            64 // 25C128 / 25C256
        } else if model_index == 9 {
            128 // 25C512
        } else {
            256 // 25CM01 / 25CM02 / 25CM04
        }
    }

    fn build_read_command(&self, address: u32, length: usize, model_index: usize) -> Vec<u8> {
        self.frame(OPCODE_READ, OP_READ, address, length, model_index)
    }

    fn build_write_command_base(&self, address: u32, length: usize, model_index: usize) -> Vec<u8> {
        self.frame(OPCODE_WRITE, OP_WRITE, address, length, model_index)
    }

    fn hardware_instructions(&self) -> &'static str {
        "SPI wiring (25Cxx):\n\
         \x20 PIC RA2  -> EEPROM CS   (pin 1)\n\
         \x20 PIC RA5  -> EEPROM MISO (pin 2)\n\
         \x20 PIC RA6  -> EEPROM MOSI (pin 5)\n\
         \x20 PIC RA3  -> EEPROM SCK  (pin 6)\n\
         \x20 PIC GND  -> EEPROM GND  (pin 4)\n\
         \x20 PIC VCC  -> EEPROM VCC  (pin 8)\n\
         \n\
         No pull-ups are required on the data lines.\n\
         Tie WP (pin 3) and HOLD (pin 7) to VCC.\n\
         Check whether the part is a 3.3V or 5V type before powering it."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_width_by_tier() {
        let cmd = SpiProtocol.build_read_command(0, 16, 0);
        assert_eq!(cmd[2], 1);
        let cmd = SpiProtocol.build_read_command(0, 16, 3);
        assert_eq!(cmd[2], 2);
        let cmd = SpiProtocol.build_read_command(0, 16, 9);
        assert_eq!(cmd[2], 2);
        let cmd = SpiProtocol.build_read_command(0, 16, 10);
        assert_eq!(cmd[2], 3);
    }

    #[test]
    fn test_opcode_carries_address_bit_8_on_25c040() {
        let cmd = SpiProtocol.build_read_command(0x00FF, 16, 2);
        assert_eq!(cmd[3], 0x03);
        let cmd = SpiProtocol.build_read_command(0x0100, 16, 2);
        assert_eq!(cmd[3], 0x03 | (1 << 3));
        let cmd = SpiProtocol.build_write_command_base(0x01FF, 16, 2);
        assert_eq!(cmd[3], 0x02 | (1 << 3));
    }

    #[test]
    fn test_other_models_keep_plain_opcode() {
        for model in [0, 1, 3, 7, 10, 12] {
            let cmd = SpiProtocol.build_read_command(0x0100, 16, model);
            assert_eq!(cmd[3], 0x03, "model {}", model);
        }
    }

    #[test]
    fn test_read_frame_layout() {
        let cmd = SpiProtocol.build_read_command(0x012345, 32, 10);
        assert_eq!(cmd, [b'P', b'R', 3, 0x03, 0x01, 0x23, 0x45, 32]);
    }

    #[test]
    fn test_write_header_layout() {
        let cmd = SpiProtocol.build_write_command_base(0x1234, 16, 8);
        assert_eq!(cmd, [b'P', b'W', 2, 0x02, 0x00, 0x12, 0x34, 16]);
    }

    #[test]
    fn test_page_size_tiers() {
        assert_eq!(SpiProtocol.page_size(0), 8);
        assert_eq!(SpiProtocol.page_size(2), 16);
        assert_eq!(SpiProtocol.page_size(5), 32);
        assert_eq!(SpiProtocol.page_size(7), 64);
        assert_eq!(SpiProtocol.page_size(8), 64);
        assert_eq!(SpiProtocol.page_size(9), 128);
        assert_eq!(SpiProtocol.page_size(10), 256);
        assert_eq!(SpiProtocol.page_size(12), 256);
    }

    #[test]
    fn test_total_size_rejects_out_of_range_index() {
        assert_eq!(SpiProtocol.total_size(12), Ok(524288));
        assert_eq!(SpiProtocol.total_size(13), Err(Error::UnknownModel(13)));
    }
}
