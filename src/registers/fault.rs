//! NVIC fault-status and fault-address registers, read by the fault-context decoder (C13)
//! when debug entry finds the core parked in a fault handler.

use super::MemoryMappedRegister;
use bitfield::bitfield;

bitfield! {
    /// HardFault Status Register.
    #[derive(Copy, Clone)]
    pub struct Hfsr(u32);
    impl Debug;
    pub debugevt, set_debugevt: 31;
    pub forced, set_forced: 30;
    pub vecttbl, set_vecttbl: 1;
}

impl From<u32> for Hfsr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
impl From<Hfsr> for u32 {
    fn from(value: Hfsr) -> Self {
        value.0
    }
}
impl MemoryMappedRegister for Hfsr {
    const ADDRESS: u64 = 0xE000_ED2C;
    const NAME: &'static str = "HFSR";
}

bitfield! {
    /// Configurable Fault Status Register: MMFSR (byte 0), BFSR (byte 1), UFSR (half 2).
    #[derive(Copy, Clone)]
    pub struct Cfsr(u32);
    impl Debug;
    pub mmarvalid, _: 7;
    pub bfarvalid, _: 15;
    pub mmfsr, _: 7, 0;
    pub bfsr, _: 15, 8;
    pub ufsr, _: 31, 16;
}

impl From<u32> for Cfsr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
impl From<Cfsr> for u32 {
    fn from(value: Cfsr) -> Self {
        value.0
    }
}
impl MemoryMappedRegister for Cfsr {
    const ADDRESS: u64 = 0xE000_ED28;
    const NAME: &'static str = "CFSR";
}

/// MemManage Fault Address Register.
#[derive(Debug, Copy, Clone)]
pub struct Mmfar(pub u32);
impl From<u32> for Mmfar {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
impl From<Mmfar> for u32 {
    fn from(value: Mmfar) -> Self {
        value.0
    }
}
impl MemoryMappedRegister for Mmfar {
    const ADDRESS: u64 = 0xE000_ED34;
    const NAME: &'static str = "MMFAR";
}

/// Bus Fault Address Register.
#[derive(Debug, Copy, Clone)]
pub struct Bfar(pub u32);
impl From<u32> for Bfar {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
impl From<Bfar> for u32 {
    fn from(value: Bfar) -> Self {
        value.0
    }
}
impl MemoryMappedRegister for Bfar {
    const ADDRESS: u64 = 0xE000_ED38;
    const NAME: &'static str = "BFAR";
}

bitfield! {
    /// Secure Fault Status Register (ARMv8-M only).
    #[derive(Copy, Clone)]
    pub struct Sfsr(u32);
    impl Debug;
    pub sfarvalid, _: 6;
}

impl From<u32> for Sfsr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
impl From<Sfsr> for u32 {
    fn from(value: Sfsr) -> Self {
        value.0
    }
}
impl MemoryMappedRegister for Sfsr {
    const ADDRESS: u64 = 0xE000_EDE4;
    const NAME: &'static str = "SFSR";
}

/// Secure Fault Address Register (ARMv8-M only).
#[derive(Debug, Copy, Clone)]
pub struct Sfar(pub u32);
impl From<u32> for Sfar {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
impl From<Sfar> for u32 {
    fn from(value: Sfar) -> Self {
        value.0
    }
}
impl MemoryMappedRegister for Sfar {
    const ADDRESS: u64 = 0xE000_EDE8;
    const NAME: &'static str = "SFAR";
}

/// The exception numbers for which the fault-context decoder has dedicated handling.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FaultException {
    HardFault,
    MemManage,
    BusFault,
    UsageFault,
    SecureFault,
    DebugMonitor,
}

impl FaultException {
    /// Classifies an XPSR exception number, if it is one this decoder handles.
    pub fn from_exception_number(n: u16) -> Option<Self> {
        match n {
            3 => Some(Self::HardFault),
            4 => Some(Self::MemManage),
            5 => Some(Self::BusFault),
            6 => Some(Self::UsageFault),
            7 => Some(Self::SecureFault),
            12 => Some(Self::DebugMonitor),
            _ => None,
        }
    }
}
