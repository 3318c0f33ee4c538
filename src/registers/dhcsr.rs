//! Debug Halting Control and Status Register.

use super::MemoryMappedRegister;
use bitfield::bitfield;

bitfield! {
    /// C1.6.3 Debug Halting Control and Status Register.
    ///
    /// The upper half-word is read-clear status; the lower half-word is the write-only
    /// (modulo DBGKEY) control half. Every write must carry [`Dhcsr::enable_write`]'s
    /// key or the processor ignores bits [15:0].
    #[derive(Copy, Clone)]
    pub struct Dhcsr(u32);
    impl Debug;
    pub s_reset_st, _: 25;
    pub s_retire_st, _: 24;
    pub s_lockup, _: 19;
    pub s_sleep, _: 18;
    pub s_halt, _: 17;
    pub s_regrdy, _: 16;
    pub c_maskints, set_c_maskints: 3;
    pub c_step, set_c_step: 2;
    pub c_halt, set_c_halt: 1;
    pub c_debugen, set_c_debugen: 0;
}

/// Mask covering the sixteen read-only status bits, used when rebuilding a write value
/// from a cached read.
pub const STATUS_MASK: u32 = 0xffff_0000;

impl Dhcsr {
    /// Sets the debug key so this value will actually be accepted as a write.
    pub fn enable_write(&mut self) {
        self.0 &= !STATUS_MASK;
        self.0 |= 0xa05f << 16;
    }
}

impl From<u32> for Dhcsr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Dhcsr> for u32 {
    fn from(value: Dhcsr) -> Self {
        value.0
    }
}

impl MemoryMappedRegister for Dhcsr {
    const ADDRESS: u64 = 0xE000_EDF0;
    const NAME: &'static str = "DHCSR";
}
