//! Chunked transfer engine
//!
//! The engine drives one read or write session against the bridge as an
//! event-driven state machine. It owns no thread and no timer: the caller
//! puts the frames it returns on the wire, feeds inbound byte groups to
//! [`TransferEngine::handle_bytes`], and reports deadline expiry through
//! [`TransferEngine::handle_timeout`]. Exactly one command is outstanding
//! at any moment, so the engine advances at most one chunk per inbound
//! group.
//!
//! Reads are paced by byte count: a chunk is complete once the session
//! buffer holds all bytes up to `cursor + chunk`. Partial arrivals are
//! normal on a byte-stream link and leave the session waiting. Writes are
//! paced by the bridge's acknowledgment byte; anything else the link emits
//! during a write is ignored.

use alloc::vec::Vec;
use core::mem;

use crate::device::DeviceProfile;
use crate::error::{Error, Result};
use crate::protocol::EepromProtocol;

/// Acknowledgment byte the bridge sends after committing a write chunk
const ACK: u8 = b'K';

/// Default chunk length, sized to the bridge's UART buffer
const DEFAULT_CHUNK: usize = 16;

/// The wire length field is a single byte
const MAX_CHUNK: usize = 255;

/// Session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No session active
    Idle,
    /// Read session in flight
    Reading,
    /// Write session in flight
    Writing,
}

/// What the caller must do after feeding the engine an event
///
/// `Send` and `Waiting` re-arm the response deadline; `Ignored` leaves it
/// untouched; the two completion steps end the session, so any armed
/// deadline must be cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Put this frame on the wire
    Send(Vec<u8>),
    /// Partial chunk buffered; keep waiting for the rest
    Waiting,
    /// The bytes carried no protocol meaning
    Ignored,
    /// Read session finished; carries the full memory image
    ReadDone(Vec<u8>),
    /// Write session finished
    WriteDone,
}

/// The chunked read/write state machine for one device
pub struct TransferEngine {
    profile: DeviceProfile,
    protocol: &'static dyn EepromProtocol,
    mode: Mode,
    cursor: usize,
    total_len: usize,
    buffer: Vec<u8>,
    payload: Vec<u8>,
    read_chunk: usize,
    write_chunk_cap: usize,
}

impl TransferEngine {
    /// Create an idle engine for the selected device
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            protocol: profile.kind.variant(),
            mode: Mode::Idle,
            cursor: 0,
            total_len: 0,
            buffer: Vec::new(),
            payload: Vec::new(),
            read_chunk: DEFAULT_CHUNK,
            write_chunk_cap: DEFAULT_CHUNK,
        }
    }

    /// Tune the fixed chunk parameters
    ///
    /// Both values are clamped to the one-byte wire length field.
    pub fn with_chunk_limits(mut self, read: usize, write_cap: usize) -> Self {
        self.read_chunk = read.clamp(1, MAX_CHUNK);
        self.write_chunk_cap = write_cap.clamp(1, MAX_CHUNK);
        self
    }

    /// Current session mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Next byte offset to transfer
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total bytes this session will move
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// The device profile the engine was built for
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Start reading the full address space of the device
    ///
    /// Rejected with [`Error::SessionActive`] while a session is in flight.
    pub fn start_read(&mut self) -> Result<Step> {
        if self.mode != Mode::Idle {
            return Err(Error::SessionActive);
        }
        self.cursor = 0;
        self.total_len = self.profile.total_size;
        self.buffer.clear();
        self.mode = Mode::Reading;
        log::info!(
            "reading {} bytes from {}",
            self.total_len,
            self.profile.model_name()
        );
        Ok(Step::Send(self.read_frame()))
    }

    /// Start writing `payload` at address 0
    ///
    /// The capacity check happens here, before any state mutation or any
    /// byte on the wire. An empty payload completes immediately.
    pub fn start_write(&mut self, payload: Vec<u8>) -> Result<Step> {
        if self.mode != Mode::Idle {
            return Err(Error::SessionActive);
        }
        if payload.len() > self.profile.total_size {
            return Err(Error::OversizedPayload {
                len: payload.len(),
                capacity: self.profile.total_size,
            });
        }
        if payload.is_empty() {
            return Ok(Step::WriteDone);
        }
        self.cursor = 0;
        self.total_len = payload.len();
        self.payload = payload;
        self.mode = Mode::Writing;
        log::info!(
            "writing {} bytes to {}",
            self.total_len,
            self.profile.model_name()
        );
        Ok(Step::Send(self.write_frame()))
    }

    /// Feed one inbound byte group from the transport
    pub fn handle_bytes(&mut self, data: &[u8]) -> Step {
        match self.mode {
            Mode::Idle => Step::Ignored,
            Mode::Reading => {
                self.buffer.extend_from_slice(data);
                let expected = self.read_chunk_len();
                if self.buffer.len() < self.cursor + expected {
                    return Step::Waiting;
                }
                self.cursor += expected;
                log::debug!("read {}/{} bytes", self.cursor, self.total_len);
                if self.cursor < self.total_len {
                    Step::Send(self.read_frame())
                } else {
                    self.mode = Mode::Idle;
                    let mut image = mem::take(&mut self.buffer);
                    image.truncate(self.total_len);
                    Step::ReadDone(image)
                }
            }
            Mode::Writing => {
                // The bridge acks each committed chunk with a single 'K';
                // instrumentation bytes may precede it in the same group.
                if !data.contains(&ACK) {
                    return Step::Ignored;
                }
                self.cursor += self.write_chunk_len();
                log::debug!("wrote {}/{} bytes", self.cursor, self.total_len);
                if self.cursor < self.payload.len() {
                    Step::Send(self.write_frame())
                } else {
                    self.mode = Mode::Idle;
                    self.payload.clear();
                    Step::WriteDone
                }
            }
        }
    }

    /// The response deadline expired
    ///
    /// Returns the mode that timed out, or `None` if no session was active
    /// (a stale timer must not disturb a reset session). Bytes accumulated
    /// so far are discarded.
    pub fn handle_timeout(&mut self) -> Option<Mode> {
        if self.mode == Mode::Idle {
            return None;
        }
        let mode = self.mode;
        log::warn!("transfer timed out at byte {}/{}", self.cursor, self.total_len);
        self.reset();
        Some(mode)
    }

    /// The transport disconnected; force a total reset to idle
    pub fn handle_disconnect(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.mode = Mode::Idle;
        self.cursor = 0;
        self.total_len = 0;
        self.buffer.clear();
        self.payload.clear();
    }

    fn read_chunk_len(&self) -> usize {
        // Reads have no page hazard; only the tail chunk is shortened.
        core::cmp::min(self.read_chunk, self.total_len - self.cursor)
    }

    /// Write-chunk length at the current cursor
    ///
    /// The page term is load-bearing: a chunk that crosses a page boundary
    /// wraps around inside the page on the physical part and corrupts it.
    fn write_chunk_len(&self) -> usize {
        let to_page_end = self.profile.page_size - self.cursor % self.profile.page_size;
        to_page_end
            .min(self.write_chunk_cap)
            .min(self.payload.len() - self.cursor)
    }

    fn read_frame(&self) -> Vec<u8> {
        self.protocol.build_read_command(
            self.cursor as u32,
            self.read_chunk_len(),
            self.profile.model_index,
        )
    }

    fn write_frame(&self) -> Vec<u8> {
        let len = self.write_chunk_len();
        let mut frame = self.protocol.build_write_command_base(
            self.cursor as u32,
            len,
            self.profile.model_index,
        );
        frame.extend_from_slice(&self.payload[self.cursor..self.cursor + len]);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ProtocolKind;
    use alloc::vec;

    fn engine(kind: ProtocolKind, model_index: usize) -> TransferEngine {
        TransferEngine::new(DeviceProfile::new(kind, model_index).unwrap())
    }

    fn send_frame(step: Step) -> Vec<u8> {
        match step {
            Step::Send(frame) => frame,
            other => panic!("expected Send, got {:?}", other),
        }
    }

    #[test]
    fn test_read_session_issues_chunks_in_order() {
        // 24C02: 256 bytes, read chunk 64 -> commands at 0, 64, 128, 192
        let mut engine = engine(ProtocolKind::I2c, 1).with_chunk_limits(64, 16);
        let mut frame = send_frame(engine.start_read().unwrap());

        let mut addresses = Vec::new();
        let image = loop {
            addresses.push(((frame[4] as usize) << 8) | frame[5] as usize);
            assert_eq!(frame[6], 64);
            match engine.handle_bytes(&[0xAB; 64]) {
                Step::Send(next) => frame = next,
                Step::ReadDone(image) => break image,
                other => panic!("unexpected step {:?}", other),
            }
        };

        assert_eq!(addresses, [0, 64, 128, 192]);
        assert_eq!(image.len(), 256);
        assert!(image.iter().all(|&b| b == 0xAB));
        assert_eq!(engine.mode(), Mode::Idle);
    }

    #[test]
    fn test_partial_arrival_keeps_session_waiting() {
        let mut engine = engine(ProtocolKind::I2c, 1).with_chunk_limits(64, 16);
        engine.start_read().unwrap();

        assert_eq!(engine.handle_bytes(&[0u8; 10]), Step::Waiting);
        assert_eq!(engine.handle_bytes(&[0u8; 10]), Step::Waiting);
        assert_eq!(engine.cursor(), 0);
        // The rest of the chunk arrives; the cursor advances once.
        assert!(matches!(engine.handle_bytes(&[0u8; 44]), Step::Send(_)));
        assert_eq!(engine.cursor(), 64);
    }

    #[test]
    fn test_short_final_read_chunk() {
        // 24C01: 128 bytes with a 48-byte chunk -> 48 + 48 + 32
        let mut engine = engine(ProtocolKind::I2c, 0).with_chunk_limits(48, 16);
        let frame = send_frame(engine.start_read().unwrap());
        assert_eq!(frame[6], 48);

        send_frame(engine.handle_bytes(&[0u8; 48]));
        let frame = send_frame(engine.handle_bytes(&[0u8; 48]));
        assert_eq!(frame[6], 32);
        assert!(matches!(engine.handle_bytes(&[0u8; 32]), Step::ReadDone(_)));
    }

    #[test]
    fn test_write_chunks_never_cross_page_boundary() {
        // 24C32 has 32-byte pages. A 6-byte cap walks the cursor to 30,
        // where the page term must shorten the next chunk to 2.
        let mut engine = engine(ProtocolKind::I2c, 5).with_chunk_limits(16, 6);
        let payload = vec![0x5A; 64];
        let mut frame = send_frame(engine.start_write(payload).unwrap());

        let mut lengths = Vec::new();
        loop {
            lengths.push(frame[6] as usize);
            match engine.handle_bytes(b"K") {
                Step::Send(next) => frame = next,
                Step::WriteDone => break,
                other => panic!("unexpected step {:?}", other),
            }
        }

        assert_eq!(lengths, [6, 6, 6, 6, 6, 2, 6, 6, 6, 6, 6, 2]);
        assert_eq!(engine.mode(), Mode::Idle);
    }

    #[test]
    fn test_write_frame_carries_payload_slice() {
        let mut engine = engine(ProtocolKind::I2c, 1).with_chunk_limits(16, 4);
        let payload: Vec<u8> = (0u8..8).collect();
        let frame = send_frame(engine.start_write(payload).unwrap());

        // 7-byte header followed by the first 4 payload bytes
        assert_eq!(frame.len(), 11);
        assert_eq!(&frame[7..], &[0, 1, 2, 3]);

        let frame = send_frame(engine.handle_bytes(b"K"));
        assert_eq!(&frame[7..], &[4, 5, 6, 7]);
    }

    #[test]
    fn test_oversized_write_is_rejected_before_any_send() {
        let mut engine = engine(ProtocolKind::I2c, 1);
        let err = engine.start_write(vec![0; 300]).unwrap_err();
        assert_eq!(
            err,
            Error::OversizedPayload {
                len: 300,
                capacity: 256
            }
        );
        assert_eq!(engine.mode(), Mode::Idle);
        // The engine is untouched and can still start a session.
        assert!(engine.start_read().is_ok());
    }

    #[test]
    fn test_empty_write_completes_immediately() {
        let mut engine = engine(ProtocolKind::Spi, 1);
        assert_eq!(engine.start_write(Vec::new()).unwrap(), Step::WriteDone);
        assert_eq!(engine.mode(), Mode::Idle);
    }

    #[test]
    fn test_busy_engine_rejects_second_session() {
        let mut engine = engine(ProtocolKind::I2c, 1);
        engine.start_read().unwrap();
        assert_eq!(engine.start_read().unwrap_err(), Error::SessionActive);
        assert_eq!(
            engine.start_write(vec![0; 16]).unwrap_err(),
            Error::SessionActive
        );
    }

    #[test]
    fn test_ack_is_scanned_out_of_instrumentation_noise() {
        let mut engine = engine(ProtocolKind::Spi, 1).with_chunk_limits(16, 8);
        engine.start_write(vec![0xA5; 16]).unwrap();

        assert_eq!(engine.handle_bytes(b"debug..."), Step::Ignored);
        assert_eq!(engine.cursor(), 0);
        assert!(matches!(engine.handle_bytes(b"..OK"), Step::Send(_)));
        assert_eq!(engine.cursor(), 8);
        assert_eq!(engine.handle_bytes(b"K"), Step::WriteDone);
    }

    #[test]
    fn test_single_advance_per_group_with_repeated_acks() {
        let mut engine = engine(ProtocolKind::Spi, 1).with_chunk_limits(16, 8);
        engine.start_write(vec![0xA5; 24]).unwrap();

        assert!(matches!(engine.handle_bytes(b"KK"), Step::Send(_)));
        assert_eq!(engine.cursor(), 8);
    }

    #[test]
    fn test_timeout_abandons_session() {
        let mut engine = engine(ProtocolKind::I2c, 1);
        engine.start_read().unwrap();
        engine.handle_bytes(&[0u8; 10]);

        assert_eq!(engine.handle_timeout(), Some(Mode::Reading));
        assert_eq!(engine.mode(), Mode::Idle);
        assert_eq!(engine.cursor(), 0);
        // Late bytes from the abandoned session carry no meaning.
        assert_eq!(engine.handle_bytes(&[0u8; 64]), Step::Ignored);
    }

    #[test]
    fn test_stale_timer_does_not_disturb_idle_engine() {
        let mut engine = engine(ProtocolKind::I2c, 1);
        assert_eq!(engine.handle_timeout(), None);

        engine.start_read().unwrap();
        engine.handle_timeout();
        // A duplicate firing after the reset is a no-op.
        assert_eq!(engine.handle_timeout(), None);
    }

    #[test]
    fn test_disconnect_forces_idle_from_any_state() {
        let mut engine = engine(ProtocolKind::I2c, 1);
        engine.start_write(vec![0; 32]).unwrap();
        engine.handle_disconnect();
        assert_eq!(engine.mode(), Mode::Idle);
        assert_eq!(engine.handle_bytes(b"K"), Step::Ignored);
    }

    #[test]
    fn test_chunk_limits_are_clamped_to_wire_length_field() {
        let engine = engine(ProtocolKind::Spi, 12).with_chunk_limits(4096, 0);
        assert_eq!(engine.read_chunk, 255);
        assert_eq!(engine.write_chunk_cap, 1);
    }
}
