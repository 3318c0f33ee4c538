//! C1: DHCSR status tracker.

use super::TargetCore;
use crate::error::CortexMError;
use crate::registers::dhcsr::Dhcsr;
use crate::registers::MemoryMappedRegister;

impl TargetCore {
    /// Reads DHCSR via a single atomic transaction and accumulates its sticky bits.
    ///
    /// `S_RESET_ST` and `S_RETIRE_ST` are read-clear on real silicon: a reader that
    /// doesn't OR the new value into `sticky_dhcsr` can observe a transition and then
    /// silently lose it to a concurrent reader. Every DHCSR read in this core funnels
    /// through here for that reason.
    #[tracing::instrument(skip(self))]
    pub fn read_dhcsr_atomic_sticky(&mut self) -> Result<u32, CortexMError> {
        let value = self.memory.read_word_32(Dhcsr::ADDRESS)?;
        self.memory.flush()?;
        self.cached_dhcsr = value;
        self.sticky_dhcsr |= value;
        Ok(value)
    }

    pub fn dhcsr(&self) -> Dhcsr {
        Dhcsr::from(self.cached_dhcsr)
    }
}
