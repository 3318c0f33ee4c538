//! C11: Debug Communication Channel (target-request) channel, emulated over DCRDR.
//!
//! DCRDR is shared between core-register transfer and this emulated DCC, which is why
//! every register-transfer call in [`super::transfer`] saves and restores it in a
//! separate transaction whenever [`TargetCore::dcc_messaging_enabled`] is set. Byte 0 of
//! DCRDR carries the payload; bit 0 is the producer/consumer handshake: set by whichever
//! side just wrote fresh data, cleared by whichever side just consumed it.

use std::time::{Duration, Instant};

use super::TargetCore;
use crate::error::CortexMError;
use crate::registers::transfer_regs::Dcrdr;
use crate::registers::MemoryMappedRegister;

const DCC_READY: u32 = 0x1;
const DCC_TIMEOUT: Duration = Duration::from_millis(500);

impl TargetCore {
    /// Sends one byte to the target over the emulated DCC, waiting for the target to have
    /// consumed any previous byte first.
    #[tracing::instrument(skip(self))]
    pub fn dcc_write(&mut self, byte: u8) -> Result<(), CortexMError> {
        let start = Instant::now();
        loop {
            let dcrdr = self.memory.read_word_32(Dcrdr::ADDRESS)?;
            if dcrdr & DCC_READY == 0 {
                break;
            }
            if start.elapsed() > DCC_TIMEOUT {
                return Err(CortexMError::Timeout);
            }
            self.adapter.keep_alive();
        }

        let value = (u32::from(byte) << 8) | DCC_READY;
        self.memory.write_word_32(Dcrdr::ADDRESS, value)?;
        self.memory.flush()?;
        Ok(())
    }

    /// Polls for a byte the target has sent; returns `None` without blocking if nothing is
    /// pending.
    #[tracing::instrument(skip(self))]
    pub fn dcc_read(&mut self) -> Result<Option<u8>, CortexMError> {
        let dcrdr = self.memory.read_word_32(Dcrdr::ADDRESS)?;
        if dcrdr & DCC_READY == 0 {
            return Ok(None);
        }
        let byte = (dcrdr >> 8) as u8;
        self.memory.write_word_32(Dcrdr::ADDRESS, 0)?;
        self.memory.flush()?;
        Ok(Some(byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_core;

    #[test]
    fn read_returns_none_when_nothing_pending() {
        let mut core = test_core();
        assert_eq!(core.dcc_read().unwrap(), None);
    }

    #[test]
    fn write_then_read_round_trips_a_byte() {
        let mut core = test_core();
        core.dcc_write(0x42).unwrap();
        let raw = core.memory_mut().read_word_32(Dcrdr::ADDRESS).unwrap();
        assert_eq!(raw & DCC_READY, DCC_READY);
        assert_eq!((raw >> 8) as u8, 0x42);
    }
}
