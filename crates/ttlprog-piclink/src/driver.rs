//! Blocking transfer pump
//!
//! The driver owns the single response deadline of a session: it is
//! re-armed when the engine returns `Send` or `Waiting`, left alone on
//! `Ignored`, and dropped when the session completes. A missed deadline
//! resets the engine before the timeout error surfaces, so the engine is
//! always idle and consistent after any failure. Transport errors during a
//! session do the same through a forced disconnect.

use std::time::{Duration, Instant};

use ttlprog_core::engine::{Step, TransferEngine};

use crate::error::{LinkError, Result};
use crate::transport::Transport;

/// Response window before a transfer is abandoned
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Poll interval for inbound bytes
const POLL_INTERVAL_MS: u32 = 20;

/// Terminal state of a pumped session
enum Finished {
    Image(Vec<u8>),
    Written,
}

/// Pumps a [`TransferEngine`] against a [`Transport`] until the session
/// completes or times out
pub struct Driver<T: Transport> {
    transport: T,
    timeout: Duration,
}

impl<T: Transport> Driver<T> {
    /// Create a driver with the default 5-second response window
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: RESPONSE_TIMEOUT,
        }
    }

    /// Override the response window
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Access the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Read the device's full address space
    ///
    /// `progress` is called with (bytes done, bytes total) after every
    /// inbound group.
    pub fn run_read<F>(&mut self, engine: &mut TransferEngine, mut progress: F) -> Result<Vec<u8>>
    where
        F: FnMut(usize, usize),
    {
        let step = engine.start_read()?;
        match self.pump(engine, step, &mut progress)? {
            Finished::Image(image) => Ok(image),
            Finished::Written => Err(LinkError::IoError(
                "read session ended without an image".into(),
            )),
        }
    }

    /// Write `payload` to the device starting at address 0
    ///
    /// An oversized payload is rejected by the engine before any byte
    /// reaches the wire.
    pub fn run_write<F>(
        &mut self,
        engine: &mut TransferEngine,
        payload: Vec<u8>,
        mut progress: F,
    ) -> Result<()>
    where
        F: FnMut(usize, usize),
    {
        let step = engine.start_write(payload)?;
        self.pump(engine, step, &mut progress)?;
        Ok(())
    }

    fn pump<F>(
        &mut self,
        engine: &mut TransferEngine,
        mut step: Step,
        progress: &mut F,
    ) -> Result<Finished>
    where
        F: FnMut(usize, usize),
    {
        let mut deadline = Instant::now() + self.timeout;

        loop {
            match step {
                Step::Send(frame) => {
                    log::trace!("sending {} byte frame", frame.len());
                    if let Err(e) = self.send(&frame) {
                        engine.handle_disconnect();
                        return Err(e);
                    }
                    deadline = Instant::now() + self.timeout;
                }
                Step::Waiting => deadline = Instant::now() + self.timeout,
                Step::Ignored => {}
                Step::ReadDone(image) => return Ok(Finished::Image(image)),
                Step::WriteDone => return Ok(Finished::Written),
            }

            step = self.next_group(engine, deadline)?;
            progress(engine.cursor(), engine.total_len());
        }
    }

    fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.transport.write(frame)?;
        self.transport.flush()
    }

    /// Wait for the next inbound byte group and feed it to the engine
    fn next_group(&mut self, engine: &mut TransferEngine, deadline: Instant) -> Result<Step> {
        let mut buf = [0u8; 256];
        loop {
            let n = match self.transport.read_nonblock(&mut buf, POLL_INTERVAL_MS) {
                Ok(n) => n,
                Err(e) => {
                    engine.handle_disconnect();
                    return Err(e);
                }
            };
            if n > 0 {
                return Ok(engine.handle_bytes(&buf[..n]));
            }
            if Instant::now() >= deadline {
                engine.handle_timeout();
                return Err(LinkError::Timeout);
            }
        }
    }
}
