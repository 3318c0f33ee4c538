//! C4: debug-entry pipeline, run on every observed transition into HALTED.

use super::{Architecture, DebugReason, TargetCore};
use crate::error::CortexMError;
use crate::registers::fault::{Bfar, Cfsr, FaultException, Hfsr, Mmfar, Sfar, Sfsr};
use crate::registers::transfer_regs::{Dfsr, Dscsr};
use crate::registers::{MemoryMappedRegister, EXTRA, XPSR};

impl TargetCore {
    /// Runs the full debug-entry pipeline: §4.4 steps 1-8.
    #[tracing::instrument(skip(self))]
    pub fn debug_entry(&mut self) -> Result<(), CortexMError> {
        self.set_maskints_for_halt()?;
        self.clear_halt()?;
        self.read_dhcsr_atomic_sticky()?;

        if !matches!(self.debug_reason, DebugReason::Dbgrq | DebugReason::SingleStep) {
            self.debug_reason = self.examine_debug_reason();
        }

        if self.arch == Architecture::V8M {
            let dscsr: Dscsr = Dscsr::from(self.memory.read_word_32(Dscsr::ADDRESS)?);
            tracing::debug!(secure = dscsr.sbrsecure(), "DSCSR state");
        }

        self.refresh_register_file()?;

        let xpsr = self.register_cache.get(XPSR).unwrap_or(0);
        let exception_number = (xpsr & 0x1ff) as u16;
        self.exception_number = exception_number;

        if exception_number != 0 {
            tracing::debug!(exception_number, "core is in HANDLER mode");
            self.decode_fault_context(exception_number)?;
        } else {
            let extra = self.register_cache.get(EXTRA).unwrap_or(0);
            let control = (extra >> 24) as u8;
            let privileged = control & 0b1 == 0;
            let uses_psp = control & 0b10 != 0;
            tracing::debug!(privileged, uses_psp, "core is in THREAD mode");
        }

        Ok(())
    }

    /// Snapshots and clears DFSR, clears C_STEP, sets C_HALT.
    fn clear_halt(&mut self) -> Result<(), CortexMError> {
        const C_HALT: u32 = 1 << 1;
        const C_STEP: u32 = 1 << 2;
        self.write_debug_halt_mask(C_HALT, C_STEP)?;
        let dfsr = self.memory.read_word_32(Dfsr::ADDRESS)?;
        self.cached_dfsr = dfsr;
        self.memory.write_word_32(Dfsr::ADDRESS, Dfsr::CLEAR_ALL)?;
        Ok(())
    }

    /// The debug-reason truth table, evaluated only when not already pinned by a prior
    /// command to DBGRQ/SINGLESTEP.
    fn examine_debug_reason(&self) -> DebugReason {
        let dfsr = Dfsr::from(self.cached_dfsr);
        if dfsr.bkpt() {
            if dfsr.dwttrap() {
                DebugReason::WptAndBkpt
            } else {
                DebugReason::Breakpoint
            }
        } else if dfsr.dwttrap() {
            DebugReason::Watchpoint
        } else if dfsr.vcatch() {
            DebugReason::Breakpoint
        } else if dfsr.external() || dfsr.halted() {
            DebugReason::Dbgrq
        } else {
            DebugReason::Undefined
        }
    }

    /// C13: reads and logs the fault-status/fault-address registers relevant to the
    /// exception number the core is parked in.
    fn decode_fault_context(&mut self, exception_number: u16) -> Result<(), CortexMError> {
        let Some(exc) = FaultException::from_exception_number(exception_number) else {
            return Ok(());
        };
        match exc {
            FaultException::HardFault => {
                let hfsr = Hfsr::from(self.memory.read_word_32(Hfsr::ADDRESS)?);
                tracing::debug!(?hfsr, "HFSR");
                if hfsr.forced() {
                    let cfsr = Cfsr::from(self.memory.read_word_32(Cfsr::ADDRESS)?);
                    tracing::debug!(?cfsr, "CFSR (forced HardFault escalation)");
                    if cfsr.mmarvalid() {
                        let mmfar = Mmfar::from(self.memory.read_word_32(Mmfar::ADDRESS)?);
                        tracing::debug!(?mmfar, "MMFAR");
                    }
                    if cfsr.bfarvalid() {
                        let bfar = Bfar::from(self.memory.read_word_32(Bfar::ADDRESS)?);
                        tracing::debug!(?bfar, "BFAR");
                    }
                }
            }
            FaultException::MemManage => {
                let cfsr = Cfsr::from(self.memory.read_word_32(Cfsr::ADDRESS)?);
                tracing::debug!(mmfsr = cfsr.mmfsr(), "CFSR.MMFSR");
                if cfsr.mmarvalid() {
                    let mmfar = Mmfar::from(self.memory.read_word_32(Mmfar::ADDRESS)?);
                    tracing::debug!(?mmfar, "MMFAR");
                }
            }
            FaultException::BusFault => {
                let cfsr = Cfsr::from(self.memory.read_word_32(Cfsr::ADDRESS)?);
                tracing::debug!(bfsr = cfsr.bfsr(), "CFSR.BFSR");
                if cfsr.bfarvalid() {
                    let bfar = Bfar::from(self.memory.read_word_32(Bfar::ADDRESS)?);
                    tracing::debug!(?bfar, "BFAR");
                }
            }
            FaultException::UsageFault => {
                let cfsr = Cfsr::from(self.memory.read_word_32(Cfsr::ADDRESS)?);
                tracing::debug!(ufsr = cfsr.ufsr(), "CFSR.UFSR");
            }
            FaultException::SecureFault => {
                let sfsr = Sfsr::from(self.memory.read_word_32(Sfsr::ADDRESS)?);
                tracing::debug!(?sfsr, "SFSR");
                if sfsr.sfarvalid() {
                    let sfar = Sfar::from(self.memory.read_word_32(Sfar::ADDRESS)?);
                    tracing::debug!(?sfar, "SFAR");
                }
            }
            FaultException::DebugMonitor => {
                tracing::debug!(dfsr = self.cached_dfsr, "DFSR (DebugMonitor)");
            }
        }
        Ok(())
    }
}
