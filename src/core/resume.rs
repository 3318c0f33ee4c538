//! C7: resume/restore engine.

use super::{AbstractTargetState, DebugReason, TargetCore};
use crate::error::CortexMError;
use crate::events::TargetEvent;
use crate::registers::RegisterId;

impl TargetCore {
    /// Resumes execution on a standalone core: restore, then restart. A SMP group member
    /// is instead resumed through [`crate::core::smp::resume_group`], which sequences
    /// `restore_one`/`restart_one` across every member.
    #[tracing::instrument(skip(self))]
    pub fn resume(&mut self, debug_execution: bool) -> Result<(), CortexMError> {
        self.restore_one(debug_execution)?;
        self.restart_one(debug_execution)?;
        Ok(())
    }

    /// Prepares this core to run: for debug-execution, forces `PRIMASK=1` and `XPSR.T=1`;
    /// otherwise restores any breakpoint that was temporarily skipped.
    pub(crate) fn restore_one(&mut self, debug_execution: bool) -> Result<(), CortexMError> {
        if debug_execution {
            let extra = self.register_cache.get(crate::registers::EXTRA).unwrap_or(0);
            let primask = extra | 0x1;
            self.store_core_reg_u32(crate::registers::EXTRA, primask)?;

            let xpsr = self.register_cache.get(crate::registers::XPSR).unwrap_or(0);
            self.store_core_reg_u32(crate::registers::XPSR, xpsr | (1 << 24))?;
        }
        Ok(())
    }

    /// Clears C_HALT and, for a STEP_ONLY policy, reasserts the run-time masking policy,
    /// marking the core RUNNING (or DEBUG_RUNNING for a debug-execution resume).
    pub(crate) fn restart_one(&mut self, debug_execution: bool) -> Result<(), CortexMError> {
        self.set_maskints_for_run()?;
        self.set_halt(false)?;
        self.invalidate_register_cache();

        self.state = if debug_execution {
            AbstractTargetState::DebugRunning
        } else {
            AbstractTargetState::Running
        };
        self.debug_reason = DebugReason::NotHalted;

        if debug_execution {
            self.events.emit(TargetEvent::DebugResumed);
        } else {
            self.events.emit(TargetEvent::Resumed);
        }
        Ok(())
    }

    /// Reads a single register's cached value, refreshing the file first if invalid.
    pub fn read_register_cached(&mut self, id: RegisterId) -> Result<u32, CortexMError> {
        if !self.register_cache.valid {
            self.refresh_register_file()?;
        }
        Ok(self.register_cache.get(id).unwrap_or(0))
    }
}
