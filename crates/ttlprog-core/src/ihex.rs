//! Intel HEX codec
//!
//! Stateless conversion between a raw memory image and Intel HEX text.
//! The decoder tracks the extended linear and extended segment bases
//! (record types 04 and 02) so images larger than 64 KiB address
//! correctly; the encoder emits an Extended Linear Address record at
//! every 64 KiB boundary past the first.
//!
//! A checksum mismatch is a warning, not an error: the record's data is
//! used anyway and decoding continues. Malformed lines (missing sentinel,
//! short record, non-hex digits) abort the decode.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Record type: data
const TYPE_DATA: u8 = 0x00;
/// Record type: end of file
const TYPE_EOF: u8 = 0x01;
/// Record type: extended segment address
const TYPE_EXT_SEGMENT: u8 = 0x02;
/// Record type: extended linear address
const TYPE_EXT_LINEAR: u8 = 0x04;

/// Bytes per emitted data record, and the minimum transfer block the
/// decoded image length is rounded up to
const RECORD_LEN: usize = 16;

/// Erased-EEPROM fill value for bytes no record touched
const FILL: u8 = 0xFF;

/// A malformed line that aborts decoding
///
/// Line numbers are 1-based. Checksum mismatches are deliberately absent:
/// they are reported as warnings and decoding continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexFormatError {
    /// The line does not start with the ':' record sentinel
    MissingSentinel {
        /// 1-based line number
        line: usize,
    },
    /// The line is shorter than its fields require
    LineTooShort {
        /// 1-based line number
        line: usize,
    },
    /// A field contains non-hexadecimal characters
    BadHexDigit {
        /// 1-based line number
        line: usize,
    },
}

impl fmt::Display for HexFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSentinel { line } => {
                write!(f, "line {}: record does not start with ':'", line)
            }
            Self::LineTooShort { line } => write!(f, "line {}: record is too short", line),
            Self::BadHexDigit { line } => write!(f, "line {}: invalid hex digits", line),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HexFormatError {}

fn field8(line: &str, pos: usize, number: usize) -> Result<u8, HexFormatError> {
    let digits = line
        .get(pos..pos + 2)
        .ok_or(HexFormatError::LineTooShort { line: number })?;
    u8::from_str_radix(digits, 16).map_err(|_| HexFormatError::BadHexDigit { line: number })
}

fn field16(line: &str, pos: usize, number: usize) -> Result<u16, HexFormatError> {
    let digits = line
        .get(pos..pos + 4)
        .ok_or(HexFormatError::LineTooShort { line: number })?;
    u16::from_str_radix(digits, 16).map_err(|_| HexFormatError::BadHexDigit { line: number })
}

/// Decode Intel HEX text into a raw memory image
///
/// Bytes at or beyond `target_capacity` are clipped. The result spans the
/// highest written address plus one, rounded up to the next multiple of
/// 16; untouched bytes within that span are `0xFF`. If no data record is
/// seen the result is empty. Processing stops at the end-of-file record.
pub fn decode(text: &str, target_capacity: usize) -> Result<Vec<u8>, HexFormatError> {
    let mut buffer = alloc::vec![FILL; target_capacity];
    let mut extended_linear: usize = 0;
    let mut extended_segment: usize = 0;
    let mut highest: Option<usize> = None;

    'lines: for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let number = index + 1;

        if !line.starts_with(':') {
            return Err(HexFormatError::MissingSentinel { line: number });
        }
        if line.len() < 11 {
            return Err(HexFormatError::LineTooShort { line: number });
        }

        let byte_count = field8(line, 1, number)? as usize;
        let offset = field16(line, 3, number)? as usize;
        let record_type = field8(line, 7, number)?;

        // The sum of every field including the checksum byte must be
        // 0 mod 256. A mismatch still yields the record's data.
        let mut sum: u32 = 0;
        let mut pos = 1;
        while pos + 2 <= line.len() {
            sum += field8(line, pos, number)? as u32;
            pos += 2;
        }
        if sum & 0xFF != 0 {
            log::warn!("intel hex: checksum mismatch on line {}", number);
        }

        match record_type {
            TYPE_DATA => {
                let base = (extended_linear << 16) + (extended_segment << 4);
                let target = base + offset;
                for i in 0..byte_count {
                    let value = field8(line, 9 + i * 2, number)?;
                    let address = target + i;
                    if address < target_capacity {
                        buffer[address] = value;
                        highest = Some(highest.map_or(address, |h| h.max(address)));
                    }
                }
            }
            TYPE_EOF => break 'lines,
            TYPE_EXT_SEGMENT => extended_segment = field16(line, 9, number)? as usize,
            TYPE_EXT_LINEAR => extended_linear = field16(line, 9, number)? as usize,
            _ => {}
        }
    }

    let highest = match highest {
        Some(address) => address,
        None => return Ok(Vec::new()),
    };
    let mut len = highest + 1;
    if len % RECORD_LEN != 0 {
        len = (len / RECORD_LEN + 1) * RECORD_LEN;
    }
    buffer.resize(len, FILL);
    Ok(buffer)
}

/// Encode a raw memory image as Intel HEX text
///
/// Emits 16-byte data records from offset 0, an Extended Linear Address
/// record at every positive 64 KiB multiple, and the fixed end-of-file
/// terminator. Round-trips with [`decode`] for images whose length is a
/// multiple of 16.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::new();
    let mut address = 0usize;

    while address < data.len() {
        let len = core::cmp::min(RECORD_LEN, data.len() - address);

        if address > 0 && address % 0x10000 == 0 {
            let base = (address >> 16) as u16;
            push_record(
                &mut out,
                &[
                    0x02,
                    0x00,
                    0x00,
                    TYPE_EXT_LINEAR,
                    (base >> 8) as u8,
                    base as u8,
                ],
            );
        }

        let mut record = Vec::with_capacity(4 + len);
        record.push(len as u8);
        record.push((address >> 8) as u8);
        record.push(address as u8);
        record.push(TYPE_DATA);
        record.extend_from_slice(&data[address..address + len]);
        push_record(&mut out, &record);

        address += len;
    }

    out.push_str(":00000001FF\n");
    out
}

/// Append one record: sentinel, hex fields, two's-complement checksum
fn push_record(out: &mut String, bytes: &[u8]) {
    use core::fmt::Write;

    let sum: u32 = bytes.iter().map(|&b| b as u32).sum();
    let checksum = (256 - (sum & 0xFF)) & 0xFF;

    out.push(':');
    for &byte in bytes {
        let _ = write!(out, "{:02X}", byte);
    }
    let _ = write!(out, "{:02X}", checksum);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn test_round_trip() {
        let data = pattern(160);
        let text = encode(&data);
        assert_eq!(decode(&text, data.len()).unwrap(), data);
    }

    #[test]
    fn test_round_trip_across_64k_boundary() {
        let data = pattern(0x2_8000);
        let text = encode(&data);
        // 64 KiB boundaries at 0x10000 and 0x20000 need base records
        assert!(text.contains("\n:020000040001F9\n"));
        assert!(text.contains("\n:020000040002F8\n"));
        assert_eq!(decode(&text, data.len()).unwrap(), data);
    }

    #[test]
    fn test_encode_record_shape() {
        let text = encode(&[0u8; 16]);
        let expected = alloc::format!(":10000000{}F0\n:00000001FF\n", "00".repeat(16));
        assert_eq!(text, expected);
    }

    #[test]
    fn test_encode_terminates_with_eof_record() {
        assert_eq!(encode(&[]), ":00000001FF\n");
    }

    #[test]
    fn test_decode_applies_extended_linear_base() {
        // Base 0xFF, one data byte at offset 0x0010 -> absolute 0xFF0010
        let text = ":0200000400FFFB\n:0100100000AB44\n:00000001FF\n";
        let image = decode(text, 0xFF_0020).unwrap();
        assert_eq!(image[0xFF_0010], 0xAB);
        assert_eq!(image.len(), 0xFF_0020);
    }

    #[test]
    fn test_decode_applies_extended_segment_base() {
        // Segment 0x1000 shifts data records by 0x10000
        let text = ":020000021000EC\n:0100000000AB54\n:00000001FF\n";
        let image = decode(text, 0x1_0010).unwrap();
        assert_eq!(image[0x1_0000], 0xAB);
    }

    #[test]
    fn test_decode_checksum_mismatch_is_tolerated() {
        // Deliberately wrong checksum (00): the value is written anyway
        let text = ":0100000000AB00\n:00000001FF\n";
        let image = decode(text, 16).unwrap();
        assert_eq!(image[0], 0xAB);
    }

    #[test]
    fn test_decode_rejects_line_without_sentinel() {
        let text = ":0100000000AB54\n0100100000AB44\n";
        assert_eq!(
            decode(text, 64),
            Err(HexFormatError::MissingSentinel { line: 2 })
        );
    }

    #[test]
    fn test_decode_rejects_short_line() {
        assert_eq!(
            decode(":0100\n", 64),
            Err(HexFormatError::LineTooShort { line: 1 })
        );
    }

    #[test]
    fn test_decode_rejects_bad_hex_digits() {
        assert_eq!(
            decode(":01000000ZZAB54\n", 64),
            Err(HexFormatError::BadHexDigit { line: 1 })
        );
    }

    #[test]
    fn test_decode_without_data_records_is_empty() {
        assert_eq!(decode(":00000001FF\n", 64).unwrap(), Vec::<u8>::new());
        assert_eq!(decode("", 64).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_fills_gaps_with_erased_value() {
        // Data at 0 and at 0x20; the gap and the tail padding read 0xFF
        let text = ":0100000000AB54\n:0100200000CD12\n:00000001FF\n";
        let image = decode(text, 64).unwrap();
        assert_eq!(image.len(), 48);
        assert_eq!(image[0], 0xAB);
        assert_eq!(image[0x20], 0xCD);
        assert!(image[1..0x20].iter().all(|&b| b == 0xFF));
        assert!(image[0x21..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_decode_clips_beyond_target_capacity() {
        // 16 bytes starting at offset 8 against a 16-byte capacity
        let mut record = vec![0x10, 0x00, 0x08, 0x00];
        record.extend_from_slice(&pattern(16));
        let mut text = String::new();
        super::push_record(&mut text, &record);
        let image = decode(&text, 16).unwrap();
        assert_eq!(image.len(), 16);
        assert_eq!(&image[8..16], &pattern(16)[..8]);
        assert!(image[..8].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_decode_stops_at_eof_record() {
        // Lines after EOF are never parsed, malformed or not
        let text = ":0100000000AB54\n:00000001FF\nnot a record\n";
        let image = decode(text, 64).unwrap();
        assert_eq!(image[0], 0xAB);
    }

    #[test]
    fn test_decode_result_rounds_up_to_transfer_block() {
        let text = ":0100110000AB43\n:00000001FF\n";
        let image = decode(text, 64).unwrap();
        // Highest written address 0x11 -> 0x12 rounds up to 0x20
        assert_eq!(image.len(), 0x20);
    }
}
