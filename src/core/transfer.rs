//! C2: core-register transfer engine.

use std::time::{Duration, Instant};

use super::{RegisterCache, TargetCore, TransferMode};
use crate::error::CortexMError;
use crate::registers::{
    base_register_list, transfer_regs::Dcrdr, transfer_regs::Dcrsr, unpack_extra,
    with_fpu_register_list, CoreRegisterEntry, MemoryMappedRegister, RegisterId, EXTRA,
};

const S_REGRDY_TIMEOUT: Duration = Duration::from_millis(500);

impl TargetCore {
    /// Reads one core register via the polled ("slow") protocol.
    ///
    /// Saves/restores DCRDR around the transfer in a *separate* transaction whenever DCC
    /// messaging is enabled, since the register-transfer value register and the emulated
    /// DCC channel are the same physical register.
    #[tracing::instrument(skip(self))]
    pub fn load_core_reg_u32(&mut self, id: RegisterId) -> Result<u32, CortexMError> {
        let saved_dcrdr = if self.dcc_messaging_enabled {
            Some(self.memory.read_word_32(Dcrdr::ADDRESS)?)
        } else {
            None
        };

        let mut dcrsr = Dcrsr::from(0);
        dcrsr.set_regwnr(false);
        dcrsr.set_regsel(id.0 as u32);
        self.memory.write_word_32(Dcrsr::ADDRESS, dcrsr.into())?;

        self.wait_for_register_transfer()?;
        let value = self.memory.read_word_32(Dcrdr::ADDRESS)?;

        if let Some(saved) = saved_dcrdr {
            self.memory.write_word_32(Dcrdr::ADDRESS, saved)?;
            self.memory.flush()?;
        }

        Ok(value)
    }

    /// Writes one core register.
    #[tracing::instrument(skip(self))]
    pub fn store_core_reg_u32(&mut self, id: RegisterId, value: u32) -> Result<(), CortexMError> {
        self.memory.write_word_32(Dcrdr::ADDRESS, value)?;

        let mut dcrsr = Dcrsr::from(0);
        dcrsr.set_regwnr(true);
        dcrsr.set_regsel(id.0 as u32);
        self.memory.write_word_32(Dcrsr::ADDRESS, dcrsr.into())?;

        self.wait_for_register_transfer()?;
        Ok(())
    }

    fn wait_for_register_transfer(&mut self) -> Result<(), CortexMError> {
        let start = Instant::now();
        let mut polled_more_than_once = false;
        loop {
            let dhcsr = self.read_dhcsr_atomic_sticky()?;
            const S_REGRDY: u32 = 1 << 16;
            if dhcsr & S_REGRDY != 0 {
                if polled_more_than_once {
                    self.slow_register_read = true;
                }
                return Ok(());
            }
            polled_more_than_once = true;
            if start.elapsed() > S_REGRDY_TIMEOUT {
                self.slow_register_read = true;
                return Err(CortexMError::Timeout);
            }
            self.adapter.keep_alive();
        }
    }

    /// Reads every register in `list` via the polled protocol, one at a time.
    pub fn slow_read_all_regs(&mut self) -> Result<(), CortexMError> {
        self.transfer_mode = TransferMode::Slow;
        let list = self.register_list();
        for entry in &list {
            if !entry.exists {
                continue;
            }
            let value = self.load_core_reg_u32(entry.id)?;
            self.register_cache.set(entry.id, value);
            if entry.id == EXTRA {
                for (name_bits, byte) in unpack_extra(value).iter() {
                    tracing::trace!(register = %name_bits, value = byte, "unpacked EXTRA");
                }
            }
        }
        self.register_cache.mark_valid();
        Ok(())
    }

    /// Reads every register in a single pipelined batch: enqueue selector-write +
    /// DHCSR-read + DCRDR-read per register with no intervening poll, then flush once.
    /// Falls back to the caller switching to [`TargetCore::slow_read_all_regs`] on
    /// `TIMEOUT`.
    #[tracing::instrument(skip(self))]
    pub fn fast_read_all_regs(&mut self) -> Result<(), CortexMError> {
        let list = self.register_list();
        let mut captures = Vec::with_capacity(list.len());

        for entry in &list {
            if !entry.exists {
                continue;
            }
            let mut dcrsr = Dcrsr::from(0);
            dcrsr.set_regwnr(false);
            dcrsr.set_regsel(entry.id.0 as u32);
            self.memory.write_word_32(Dcrsr::ADDRESS, dcrsr.into())?;
            let dhcsr_addr = crate::registers::dhcsr::Dhcsr::ADDRESS;
            let dhcsr_slot = self.memory.read_word_32(dhcsr_addr)?;
            let value_slot = self.memory.read_word_32(Dcrdr::ADDRESS)?;
            captures.push((entry.id, dhcsr_slot, value_slot));
        }
        self.memory.flush()?;

        const S_REGRDY: u32 = 1 << 16;
        for &(_, dhcsr, _) in &captures {
            if dhcsr & S_REGRDY == 0 {
                self.transfer_mode = TransferMode::Slow;
                return Err(CortexMError::Timeout);
            }
        }

        for (id, dhcsr, value) in captures {
            self.sticky_dhcsr |= dhcsr;
            self.register_cache.set(id, value);
        }
        self.transfer_mode = TransferMode::Fast;
        self.register_cache.mark_valid();
        Ok(())
    }

    /// Refreshes the whole register file: tries the fast path first, degrades to the
    /// slow path on timeout, and opportunistically clears the downgrade flag at the
    /// start of the attempt so a transient issue does not permanently stick.
    pub fn refresh_register_file(&mut self) -> Result<(), CortexMError> {
        self.register_cache.invalidate();
        self.slow_register_read = false;
        match self.fast_read_all_regs() {
            Ok(()) => Ok(()),
            Err(CortexMError::Timeout) => {
                self.slow_register_read = true;
                self.slow_read_all_regs()
            }
            Err(other) => Err(other),
        }
    }

    fn register_list(&self) -> Vec<CoreRegisterEntry> {
        if self.fpu_present {
            with_fpu_register_list()
        } else {
            base_register_list()
        }
    }
}

impl TargetCore {
    pub(crate) fn invalidate_register_cache(&mut self) {
        self.register_cache = RegisterCache::default();
    }
}
