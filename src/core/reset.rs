//! C8: reset sequencer.

use std::time::Duration;

use super::{AbstractTargetState, DebugReason, TargetCore};
use crate::error::CortexMError;
use crate::events::TargetEvent;
use crate::registers::dwt::DwtComparator;
use crate::registers::fpb::{FpCtrl, FpRev1CompX, FpRev2CompX, FpbComparator};
use crate::registers::transfer_regs::{Aircr, Dcrdr, Demcr, Dfsr};
use crate::registers::MemoryMappedRegister;

const RESET_SETTLE: Duration = Duration::from_millis(50);
const SOFT_RESET_HALT_TIMEOUT_ITERS: u32 = 100;

impl TargetCore {
    /// Asserts reset, optionally requesting the core halt the instant the reset vector is
    /// taken. Wakes a sleeping core and makes sure debug is enabled before touching any
    /// debug register across the reset boundary, then prefers the adapter's hardware SRST
    /// line unless it is gated off; otherwise drives AIRCR directly, falling back from
    /// VECTRESET to SYSRESETREQ when the target doesn't implement the former.
    #[tracing::instrument(skip(self))]
    pub fn assert_reset(&mut self, halt: bool) -> Result<(), CortexMError> {
        self.reset_halt_requested = halt;
        self.events.emit(TargetEvent::Reset);

        let dhcsr = self.read_dhcsr_atomic_sticky()?;
        const C_DEBUGEN: u32 = 1;
        const S_SLEEP: u32 = 1 << 18;
        if dhcsr & C_DEBUGEN == 0 {
            self.write_debug_halt_mask(0, 0)?;
        }
        if dhcsr & S_SLEEP != 0 {
            tracing::debug!("core asleep, asserting C_HALT to wake it before reset");
            self.set_halt(true)?;
        }

        self.memory.write_word_32(Dcrdr::ADDRESS, 0)?;

        let mut demcr = Demcr::from(self.memory.read_word_32(Demcr::ADDRESS)?);
        demcr.set_trcena(true);
        if halt {
            demcr.set_vc_corereset(true);
            demcr.set_vc_harderr(true);
            demcr.set_vc_buserr(true);
        } else {
            demcr.set_vc_corereset(false);
        }
        self.memory.write_word_32(Demcr::ADDRESS, demcr.into())?;
        self.memory.flush()?;

        if !halt {
            self.set_maskints_for_run()?;
            self.set_halt(false)?;
        }

        let reset_config = self.adapter.reset_config();
        if reset_config.has_srst && !reset_config.srst_no_gating {
            self.adapter.assert_reset();
        } else {
            let mut aircr = Aircr::from(0);
            aircr.vectkey();
            if self.vectreset_supported {
                aircr.set_vectreset(true);
            } else {
                if reset_config.has_srst {
                    self.adapter.assert_reset();
                }
                tracing::warn!("VECTRESET unsupported, falling back to SYSRESETREQ");
                aircr.set_sysresetreq(true);
            }
            self.memory.write_word_32(Aircr::ADDRESS, aircr.into())?;
            self.memory.flush()?;
        }

        self.adapter.reinit_dp();
        self.adapter.sleep(RESET_SETTLE);

        self.state = AbstractTargetState::Reset;
        self.invalidate_register_cache();

        if self.reset_halt_requested {
            self.set_halt(true)?;
        }
        Ok(())
    }

    /// Releases reset (deasserting SRST if the adapter drives it). If SRST is the gating
    /// reset source, the DP itself may have gone down with it, so it is re-initialized
    /// here too.
    #[tracing::instrument(skip(self))]
    pub fn deassert_reset(&mut self) -> Result<(), CortexMError> {
        let reset_config = self.adapter.reset_config();
        if reset_config.has_srst {
            self.adapter.deassert_reset();
            if !reset_config.srst_no_gating {
                self.adapter.reinit_dp();
            }
        }
        Ok(())
    }

    /// VECTRESET-based reset-and-halt, distinct from the assert/deassert pair: drives a
    /// local core reset with vector catch armed and polls up to 100ms for `S_HALT &&
    /// DFSR.VCATCH` rather than waiting for the adapter-driven settle delay.
    #[tracing::instrument(skip(self))]
    pub fn soft_reset_halt(&mut self) -> Result<(), CortexMError> {
        if !self.vectreset_supported {
            return Err(CortexMError::VectResetUnsupported);
        }

        let mut demcr = Demcr::from(self.memory.read_word_32(Demcr::ADDRESS)?);
        demcr.set_trcena(true);
        demcr.set_vc_corereset(true);
        self.memory.write_word_32(Demcr::ADDRESS, demcr.into())?;

        let mut aircr = Aircr::from(0);
        aircr.vectkey();
        aircr.set_vectreset(true);
        self.memory.write_word_32(Aircr::ADDRESS, aircr.into())?;
        self.memory.flush()?;

        const S_HALT: u32 = 1 << 17;
        for _ in 0..SOFT_RESET_HALT_TIMEOUT_ITERS {
            let dhcsr = self.read_dhcsr_atomic_sticky()?;
            let dfsr = Dfsr::from(self.memory.read_word_32(Dfsr::ADDRESS)?);
            if dhcsr & S_HALT != 0 && dfsr.vcatch() {
                self.state = AbstractTargetState::Halted;
                self.debug_reason = DebugReason::Vcatch;
                self.debug_entry()?;
                return Ok(());
            }
            self.adapter.sleep(Duration::from_millis(1));
        }
        Err(CortexMError::Timeout)
    }

    /// Runs once on the RESET -> RUNNING transition observed by [`TargetCore::poll_one`]:
    /// clears the DCC mailbox, re-establishes the run-time ISR-masking policy, restores
    /// the user's vector-catch configuration on top of TRCENA, and rewrites every FPB/DWT
    /// comparator from its shadow state, since silicon gives no guarantee their contents
    /// survive a reset.
    #[tracing::instrument(skip(self))]
    pub(crate) fn end_of_reset(&mut self) -> Result<(), CortexMError> {
        self.memory.write_word_32(Dcrdr::ADDRESS, 0)?;

        let dhcsr = self.read_dhcsr_atomic_sticky()?;
        const C_DEBUGEN: u32 = 1;
        if dhcsr & C_DEBUGEN == 0 {
            self.set_halt(false)?;
        }
        self.set_maskints_for_run()?;

        let mut demcr = Demcr::from(0);
        demcr.set_trcena(true);
        demcr.set_vc_corereset(self.vector_catch & (1 << 0) != 0);
        demcr.set_vc_harderr(self.vector_catch & (1 << 10) != 0);
        demcr.set_vc_interr(self.vector_catch & (1 << 9) != 0);
        demcr.set_vc_buserr(self.vector_catch & (1 << 8) != 0);
        demcr.set_vc_staterr(self.vector_catch & (1 << 7) != 0);
        demcr.set_vc_chkerr(self.vector_catch & (1 << 6) != 0);
        demcr.set_vc_nocperr(self.vector_catch & (1 << 5) != 0);
        demcr.set_vc_mmerr(self.vector_catch & (1 << 4) != 0);
        self.memory.write_word_32(Demcr::ADDRESS, demcr.into())?;

        if self.fpb_enabled {
            let mut ctrl = FpCtrl::from(0);
            ctrl.set_key(true);
            ctrl.set_enable(true);
            self.memory.write_word_32(FpCtrl::ADDRESS, ctrl.into())?;

            for index in 0..self.fp_list.len() {
                let comparator = self.fp_list[index];
                let value: u32 = if !comparator.enabled {
                    0
                } else if self.fp_rev == 0 {
                    FpRev1CompX::breakpoint_configuration(comparator.address)?.into()
                } else {
                    FpRev2CompX::breakpoint_configuration(comparator.address).into()
                };
                self.memory
                    .write_word_32(FpbComparator::address_of(index), value)?;
            }
        }

        for index in 0..self.dwt_list.len() {
            let comparator = self.dwt_list[index];
            let (comp_addr, mask_addr, func_addr) = DwtComparator::addresses(index);
            self.memory.write_word_32(comp_addr, comparator.address)?;
            self.memory.write_word_32(mask_addr, comparator.mask)?;
            let function = if comparator.enabled { comparator.function } else { 0 };
            self.memory.write_word_32(func_addr, function)?;
        }

        self.memory.flush()?;
        self.invalidate_register_cache();
        self.read_dhcsr_atomic_sticky()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_core;

    #[test]
    fn assert_reset_programs_vector_catch_for_halt() {
        let mut core = test_core();
        core.assert_reset(true).unwrap();
        let demcr = Demcr::from(core.memory_mut().read_word_32(Demcr::ADDRESS).unwrap());
        assert!(demcr.vc_corereset());
        assert_eq!(core.state, AbstractTargetState::Reset);
    }

    #[test]
    fn soft_reset_halt_rejects_unsupported_vectreset() {
        let mut core = test_core();
        core.vectreset_supported = false;
        assert!(matches!(
            core.soft_reset_halt(),
            Err(CortexMError::VectResetUnsupported)
        ));
    }
}
