//! Memory image file handling
//!
//! Input files are Intel HEX when the extension is `.hex`
//! (case-insensitive) or the first content byte is the record sentinel;
//! a HEX parse failure falls back to treating the content as a raw binary
//! image. The output format is picked by extension the same way.

use std::fs;
use std::path::Path;

use thiserror::Error;
use ttlprog_core::ihex;

/// Errors from loading or saving memory images
#[derive(Debug, Error)]
pub enum ImageError {
    /// File I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Refusing to save an empty image
    #[error("nothing to save: the memory image is empty")]
    Empty,
}

/// Load a memory image, decoding Intel HEX when detected
///
/// `target_capacity` bounds the decoded image; a payload larger than the
/// chip is still returned as-is and rejected later by the engine's
/// capacity check.
pub fn load(path: &Path, target_capacity: usize) -> Result<Vec<u8>, ImageError> {
    let raw = fs::read(path)?;

    if !looks_like_hex(path, &raw) {
        log::debug!("treating {:?} as a raw binary image", path);
        return Ok(raw);
    }

    match std::str::from_utf8(&raw) {
        Ok(text) => match ihex::decode(text, target_capacity) {
            Ok(decoded) => {
                log::info!("Intel HEX image: {} bytes decoded", decoded.len());
                Ok(decoded)
            }
            Err(e) => {
                log::warn!("Intel HEX parse failed ({}), treating file as raw binary", e);
                Ok(raw)
            }
        },
        Err(_) => {
            log::warn!("file is not valid UTF-8, treating it as raw binary");
            Ok(raw)
        }
    }
}

/// Save a memory image, encoding Intel HEX when the extension asks for it
pub fn save(path: &Path, data: &[u8]) -> Result<(), ImageError> {
    if data.is_empty() {
        return Err(ImageError::Empty);
    }
    if has_hex_extension(path) {
        fs::write(path, ihex::encode(data))?;
    } else {
        fs::write(path, data)?;
    }
    Ok(())
}

fn has_hex_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("hex"))
}

fn looks_like_hex(path: &Path, raw: &[u8]) -> bool {
    has_hex_extension(path) || raw.first() == Some(&b':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_detection_by_extension() {
        assert!(looks_like_hex(Path::new("dump.hex"), b"garbage"));
        assert!(looks_like_hex(Path::new("dump.HEX"), b"garbage"));
        assert!(!looks_like_hex(Path::new("dump.bin"), b"garbage"));
    }

    #[test]
    fn test_hex_detection_by_sentinel() {
        assert!(looks_like_hex(Path::new("dump.bin"), b":00000001FF"));
        assert!(!looks_like_hex(Path::new("dump.bin"), b"\x00\x01"));
        assert!(!looks_like_hex(Path::new("dump.bin"), b""));
    }
}
