//! C5: poll state machine.

use super::{AbstractTargetState, DebugReason, TargetCore};
use crate::error::CortexMError;
use crate::events::TargetEvent;

impl TargetCore {
    /// One iteration of the poll loop for this target. See §4.5 for the decision tree.
    #[tracing::instrument(skip(self))]
    pub fn poll_one(&mut self) -> Result<(), CortexMError> {
        self.latched_poll_failure = None;
        let prev_state = self.state;

        let dhcsr = self.read_dhcsr_atomic_sticky()?;
        const S_LOCKUP: u32 = 1 << 19;
        const S_HALT: u32 = 1 << 17;
        const S_SLEEP: u32 = 1 << 18;
        const S_RETIRE_ST: u32 = 1 << 24;
        const S_RESET_ST: u32 = 1 << 25;

        if dhcsr & S_LOCKUP != 0 {
            self.set_halt(true)?;
            self.debug_reason = DebugReason::Dbgrq;
            self.latched_poll_failure = Some(CortexMError::Other("core locked up".into()));
            self.read_dhcsr_atomic_sticky()?;
        }

        if self.sticky_dhcsr & S_RESET_ST != 0 {
            self.ack_sticky_reset();
            self.state = AbstractTargetState::Reset;
            tracing::warn!("external reset detected");
            self.events.emit(TargetEvent::ExternalResetDetected);
            return self.finish_poll();
        }

        if prev_state == AbstractTargetState::Reset {
            self.end_of_reset()?;
            self.state = AbstractTargetState::Running;
        }

        let dhcsr = self.cached_dhcsr;
        if dhcsr & S_HALT != 0 {
            self.state = AbstractTargetState::Halted;
            if matches!(
                prev_state,
                AbstractTargetState::Running
                    | AbstractTargetState::Reset
                    | AbstractTargetState::DebugRunning
            ) {
                self.debug_entry()?;
            }
            if self.is_smp_member() {
                self.smp_halt_event_postponed = true;
            } else {
                self.events.emit(TargetEvent::Halted(self.debug_reason));
            }
        } else if prev_state == AbstractTargetState::Unknown
            && (dhcsr & S_RETIRE_ST != 0 || dhcsr & S_SLEEP != 0)
        {
            self.state = AbstractTargetState::Running;
        } else if prev_state == AbstractTargetState::Halted {
            self.invalidate_register_cache();
            self.state = AbstractTargetState::Running;
            tracing::warn!("external resume detected");
            self.events.emit(TargetEvent::Resumed);
        }

        self.finish_poll()
    }

    fn finish_poll(&mut self) -> Result<(), CortexMError> {
        match self.latched_poll_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Whether this core belongs to a SMP group; overridden by [`TargetCore::set_smp_membership`].
    fn is_smp_member(&self) -> bool {
        self.smp_member
    }
}
