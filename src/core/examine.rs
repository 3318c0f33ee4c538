//! C12: one-time architecture/FPB/DWT/FPU probe, run once before the core is first polled.

use super::TargetCore;
use crate::error::CortexMError;
use crate::registers::dwt::{DwtComparator, DwtCtrl};
use crate::registers::fpb::{FpCtrl, FpbComparator};
use crate::registers::transfer_regs::{Cpacr, Mvfr0};
use crate::registers::MemoryMappedRegister;

impl TargetCore {
    /// Reads FP_CTRL, DWT_CTRL, CPACR and MVFR0 to learn this core's comparator counts and
    /// FPU presence, and sizes the FPB/DWT shadow-state lists accordingly. Idempotent, but
    /// only needs to run once per attach.
    #[tracing::instrument(skip(self))]
    pub fn examine_target(&mut self) -> Result<(), CortexMError> {
        let fp_ctrl = FpCtrl::from(self.memory.read_word_32(FpCtrl::ADDRESS)?);
        self.fp_rev = fp_ctrl.rev() as u8;
        self.fp_num_code = fp_ctrl.num_code();
        self.fp_num_lit = fp_ctrl.num_lit();
        self.fpb_enabled = true;
        self.fp_list =
            vec![FpbComparator::default(); (self.fp_num_code + self.fp_num_lit) as usize];

        let dwt_ctrl = DwtCtrl::from(self.memory.read_word_32(DwtCtrl::ADDRESS)?);
        self.dwt_num_comp = dwt_ctrl.numcomp();
        self.dwt_list = vec![DwtComparator::default(); self.dwt_num_comp as usize];

        let cpacr = Cpacr::from(self.memory.read_word_32(Cpacr::ADDRESS)?);
        self.fpu_present = if cpacr.fpu_present() {
            let mvfr0 = Mvfr0::from(self.memory.read_word_32(Mvfr0::ADDRESS)?);
            mvfr0.fp_present()
        } else {
            false
        };

        tracing::debug!(
            fp_rev = self.fp_rev,
            fp_comparators = self.fp_list.len(),
            dwt_comparators = self.dwt_list.len(),
            fpu_present = self.fpu_present,
            "target examined"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_core;

    #[test]
    fn examine_sizes_comparator_lists_from_ctrl_registers() {
        let mut core = test_core();
        // num_code = 2 (bits 11:8), num_lit = 1 (bits 7:4).
        core.memory_mut()
            .write_word_32(FpCtrl::ADDRESS, 0x0000_0210)
            .unwrap();
        core.memory_mut()
            .write_word_32(DwtCtrl::ADDRESS, 0x4000_0000)
            .unwrap();
        core.examine_target().unwrap();
        assert_eq!(core.fp_list.len(), 2 + 1);
        assert_eq!(core.dwt_num_comp, 4);
    }
}
