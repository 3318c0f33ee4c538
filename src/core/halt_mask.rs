//! C3: halt/mask controller.

use super::{IsrMaskingMode, TargetCore};
use crate::error::CortexMError;
use crate::registers::dhcsr::{Dhcsr, STATUS_MASK};
use crate::registers::MemoryMappedRegister;

/// Which transition point the ISR-masking policy table is being consulted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskPoint {
    Halt,
    Run,
    Step,
}

impl TargetCore {
    /// Rebuilds DHCSR as `(cached & ~(STATUS_MASK | clear_mask)) | DBGKEY | C_DEBUGEN |
    /// set_mask` and writes it atomically. Every write issued by the core goes through
    /// this function so the DBGKEY/C_DEBUGEN invariants can never be forgotten at a call
    /// site.
    #[tracing::instrument(skip(self))]
    pub fn write_debug_halt_mask(&mut self, set_mask: u32, clear_mask: u32) -> Result<(), CortexMError> {
        let mut value = (self.cached_dhcsr & !(STATUS_MASK | clear_mask)) | set_mask;
        value |= 1; // C_DEBUGEN
        let mut reg = Dhcsr::from(value);
        reg.enable_write();
        self.memory.write_word_32(Dhcsr::ADDRESS, reg.into())?;
        self.memory.flush()?;
        self.cached_dhcsr = (self.cached_dhcsr & STATUS_MASK) | (value & !STATUS_MASK);
        Ok(())
    }

    /// Sets or clears the C_HALT bit.
    pub fn set_halt(&mut self, halt: bool) -> Result<(), CortexMError> {
        const C_HALT: u32 = 1 << 1;
        if halt {
            self.write_debug_halt_mask(C_HALT, 0)
        } else {
            self.write_debug_halt_mask(0, C_HALT)
        }
    }

    /// Edge-triggered: writes C_MASKINTS only when the desired value differs from the
    /// cached one, since a DHCSR write while the core is mid-halt can itself disturb
    /// other bits on some silicon.
    #[tracing::instrument(skip(self))]
    pub fn set_maskints(&mut self, mask: bool) -> Result<(), CortexMError> {
        const C_MASKINTS: u32 = 1 << 3;
        let currently_masked = self.cached_dhcsr & C_MASKINTS != 0;
        if currently_masked == mask {
            return Ok(());
        }
        if mask {
            self.write_debug_halt_mask(C_MASKINTS, 0)
        } else {
            self.write_debug_halt_mask(0, C_MASKINTS)
        }
    }

    /// Applies the ISR-masking policy table for the given transition point.
    pub fn apply_isr_masking_policy(&mut self, point: MaskPoint) -> Result<(), CortexMError> {
        let mask = match (self.isrmasking_mode, point) {
            (IsrMaskingMode::Auto, MaskPoint::Halt) => false,
            (IsrMaskingMode::Auto, MaskPoint::Run) => false,
            (IsrMaskingMode::Auto, MaskPoint::Step) => true,
            (IsrMaskingMode::Off, _) => false,
            (IsrMaskingMode::On, _) => true,
            (IsrMaskingMode::StepOnly, MaskPoint::Halt) => self.maskints_erratum,
            (IsrMaskingMode::StepOnly, MaskPoint::Run) => false,
            (IsrMaskingMode::StepOnly, MaskPoint::Step) => true,
        };
        self.set_maskints(mask)
    }

    pub fn set_maskints_for_halt(&mut self) -> Result<(), CortexMError> {
        self.apply_isr_masking_policy(MaskPoint::Halt)
    }

    pub fn set_maskints_for_run(&mut self) -> Result<(), CortexMError> {
        self.apply_isr_masking_policy(MaskPoint::Run)
    }

    pub fn set_maskints_for_step(&mut self) -> Result<(), CortexMError> {
        self.apply_isr_masking_policy(MaskPoint::Step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_core;

    #[test]
    fn auto_mode_masks_only_at_step() {
        let mut core = test_core();
        core.isrmasking_mode = IsrMaskingMode::Auto;
        core.apply_isr_masking_policy(MaskPoint::Halt).unwrap();
    }

    #[test]
    fn write_always_carries_dbgkey() {
        let mut core = test_core();
        core.set_halt(true).unwrap();
        let written = core.memory_mut().read_word_32(Dhcsr::ADDRESS).unwrap();
        assert_eq!(written >> 16, 0xa05f);
    }
}
