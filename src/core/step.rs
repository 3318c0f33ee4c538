//! C6: interrupt-aware single-step engine.

use std::time::{Duration, Instant};

use super::{DebugReason, IsrMaskingMode, TargetCore};
use crate::breakpoints::{Breakpoint, BreakpointKind};
use crate::error::CortexMError;
use crate::events::TargetEvent;

const ISR_STEP_TIMEOUT: Duration = Duration::from_millis(500);

impl TargetCore {
    /// Steps one instruction, preconditioned on the target being HALTED.
    #[tracing::instrument(skip(self))]
    pub fn step(&mut self, current: bool, address: u32) -> Result<(), CortexMError> {
        if self.state != super::AbstractTargetState::Halted {
            return Err(CortexMError::CoreNotHalted);
        }

        let pc = if current {
            self.register_cache.get(crate::registers::PC).unwrap_or(0)
        } else {
            address
        };

        let mut breakpoint_to_restore: Option<Breakpoint> = None;
        if let Some(bp) = self.breakpoints.find(pc) {
            self.breakpoints.unset(&bp);
            breakpoint_to_restore = Some(bp);
        }

        let bkpt_skipped = self.disassembler.bkpt_instruction_size_at(pc).is_some();

        self.debug_reason = DebugReason::SingleStep;
        self.events.emit(TargetEvent::Resumed);

        let mut isr_timed_out = false;

        if !bkpt_skipped {
            if self.isrmasking_mode != IsrMaskingMode::Auto {
                self.set_maskints_for_step()?;
                self.masked_step_primitive()?;
            } else if pc & 0x2 != 0 && self.breakpoints.find(pc & !0x3).is_some() {
                // Erratum shortcut: a 32-bit instruction straddling the half-word with a
                // neighbour breakpoint will not re-break unless stepped with interrupts
                // disabled directly.
                self.masked_step_primitive()?;
            } else {
                isr_timed_out = self.step_with_interrupts_aware(pc, breakpoint_to_restore)?;
            }
        }

        self.read_dhcsr_atomic_sticky()?;
        self.invalidate_register_cache();

        if let Some(bp) = breakpoint_to_restore.take() {
            self.breakpoints.set(&bp);
        }

        if isr_timed_out {
            tracing::debug!("interrupt handlers didn't complete within time, leaving target running");
            self.debug_reason = DebugReason::NotHalted;
            self.state = super::AbstractTargetState::Running;
            return Ok(());
        }

        self.debug_entry()?;
        self.events.emit(TargetEvent::Halted(self.debug_reason));
        Ok(())
    }

    /// `C_STEP|C_MASKINTS` set, then `C_HALT` cleared, then `C_HALT` set again, then
    /// `maskints_for_halt` — the masked-step primitive used by every step path.
    fn masked_step_primitive(&mut self) -> Result<(), CortexMError> {
        const C_STEP: u32 = 1 << 2;
        const C_MASKINTS: u32 = 1 << 3;
        const C_HALT: u32 = 1 << 1;
        self.write_debug_halt_mask(C_HALT | C_MASKINTS, 0)?;
        self.write_debug_halt_mask(C_STEP, C_HALT)?;
        self.write_debug_halt_mask(C_HALT, 0)?;
        self.set_maskints_for_halt()?;
        Ok(())
    }

    /// Installs a temporary breakpoint at `pc` (or falls back to a plain masked step if
    /// no slot is available), runs the core with interrupts enabled until it re-halts or
    /// 500 ms elapse, then performs the masked step. Returns whether the wait timed out.
    fn step_with_interrupts_aware(
        &mut self,
        pc: u32,
        user_breakpoint: Option<Breakpoint>,
    ) -> Result<bool, CortexMError> {
        let kind = if self.fp_rev == 0 && pc > crate::registers::fpb::FpRev1CompX::MAX_ADDRESS {
            BreakpointKind::Software
        } else {
            BreakpointKind::Hardware
        };

        let temp_breakpoint = if user_breakpoint.is_some() {
            user_breakpoint
        } else {
            self.breakpoints.add(pc, kind).ok()
        };

        let Some(temp_breakpoint) = temp_breakpoint else {
            self.set_maskints_for_step()?;
            self.masked_step_primitive()?;
            return Ok(false);
        };
        self.breakpoints.set(&temp_breakpoint);

        tracing::debug!("starting core to serve pending interrupts");
        self.set_maskints_for_run()?;
        const C_HALT: u32 = 1 << 1;
        const C_STEP: u32 = 1 << 2;
        self.write_debug_halt_mask(0, C_HALT | C_STEP)?;

        let start = Instant::now();
        let mut timed_out;
        loop {
            let dhcsr = self.read_dhcsr_atomic_sticky()?;
            const S_HALT: u32 = 1 << 17;
            timed_out = start.elapsed() > ISR_STEP_TIMEOUT;
            if dhcsr & S_HALT != 0 || timed_out {
                break;
            }
            self.adapter.keep_alive();
        }

        self.breakpoints.unset(&temp_breakpoint);
        if user_breakpoint.is_none() {
            self.breakpoints.remove(pc);
        }

        if !timed_out {
            self.masked_step_primitive()?;
        }
        Ok(timed_out)
    }
}
