//! DCRSR/DCRDR register transfer registers and the reset/fault-catch control registers.

use super::MemoryMappedRegister;
use bitfield::bitfield;

bitfield! {
    /// Debug Core Register Selector Register.
    #[derive(Copy, Clone)]
    pub struct Dcrsr(u32);
    impl Debug;
    pub _, set_regwnr: 16;
    pub _, set_regsel: 6, 0;
}

impl From<u32> for Dcrsr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Dcrsr> for u32 {
    fn from(value: Dcrsr) -> Self {
        value.0
    }
}

impl MemoryMappedRegister for Dcrsr {
    const ADDRESS: u64 = 0xE000_EDF4;
    const NAME: &'static str = "DCRSR";
}

/// Debug Core Register Data Register. Doubles as the payload register for the emulated
/// Debug Communications Channel, hence it is never merged into a wider batched flush.
#[derive(Debug, Copy, Clone)]
pub struct Dcrdr(pub u32);

impl From<u32> for Dcrdr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Dcrdr> for u32 {
    fn from(value: Dcrdr) -> Self {
        value.0
    }
}

impl MemoryMappedRegister for Dcrdr {
    const ADDRESS: u64 = 0xE000_EDF8;
    const NAME: &'static str = "DCRDR";
}

bitfield! {
    /// Debug Exception and Monitor Control Register.
    #[derive(Copy, Clone)]
    pub struct Demcr(u32);
    impl Debug;
    pub trcena, set_trcena: 24;
    pub mon_req, set_mon_req: 19;
    pub mon_step, set_mon_step: 18;
    pub mon_pend, set_mon_pend: 17;
    pub mon_en, set_mon_en: 16;
    pub vc_harderr, set_vc_harderr: 10;
    pub vc_interr, set_vc_interr: 9;
    pub vc_buserr, set_vc_buserr: 8;
    pub vc_staterr, set_vc_staterr: 7;
    pub vc_chkerr, set_vc_chkerr: 6;
    pub vc_nocperr, set_vc_nocperr: 5;
    pub vc_mmerr, set_vc_mmerr: 4;
    pub vc_corereset, set_vc_corereset: 0;
}

impl From<u32> for Demcr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Demcr> for u32 {
    fn from(value: Demcr) -> Self {
        value.0
    }
}

impl MemoryMappedRegister for Demcr {
    const ADDRESS: u64 = 0xE000_EDFC;
    const NAME: &'static str = "DEMCR";
}

bitfield! {
    /// Application Interrupt and Reset Control Register.
    #[derive(Copy, Clone)]
    pub struct Aircr(u32);
    impl Debug;
    pub vectkeystat, set_vectkey: 31, 16;
    pub sysresetreq, set_sysresetreq: 2;
    pub vectclractive, set_vectclractive: 1;
    pub vectreset, set_vectreset: 0;
}

impl Aircr {
    /// Sets the write key (0x05FA) required for any AIRCR write to be accepted.
    pub fn vectkey(&mut self) {
        self.set_vectkey(0x05FA);
    }
}

impl From<u32> for Aircr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Aircr> for u32 {
    fn from(value: Aircr) -> Self {
        value.0
    }
}

impl MemoryMappedRegister for Aircr {
    const ADDRESS: u64 = 0xE000_ED0C;
    const NAME: &'static str = "AIRCR";
}

bitfield! {
    /// Debug Fault Status Register. All bits are write-1-to-clear.
    #[derive(Copy, Clone)]
    pub struct Dfsr(u32);
    impl Debug;
    pub external, set_external: 4;
    pub vcatch, set_vcatch: 3;
    pub dwttrap, set_dwttrap: 2;
    pub bkpt, set_bkpt: 1;
    pub halted, set_halted: 0;
}

impl Dfsr {
    /// A value that clears every known DFSR bit when written back.
    pub const CLEAR_ALL: u32 = 0x1f;
}

impl From<u32> for Dfsr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Dfsr> for u32 {
    fn from(value: Dfsr) -> Self {
        value.0
    }
}

impl MemoryMappedRegister for Dfsr {
    const ADDRESS: u64 = 0xE000_ED30;
    const NAME: &'static str = "DFSR";
}

bitfield! {
    /// Coprocessor Access Control Register.
    #[derive(Copy, Clone)]
    pub struct Cpacr(u32);
    impl Debug;
    pub fpu_privilige, _: 21, 20;
}

impl Cpacr {
    pub fn fpu_present(&self) -> bool {
        self.fpu_privilige() != 0
    }
}

impl From<u32> for Cpacr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Cpacr> for u32 {
    fn from(value: Cpacr) -> Self {
        value.0
    }
}

impl MemoryMappedRegister for Cpacr {
    const ADDRESS: u64 = 0xE000_ED88;
    const NAME: &'static str = "CPACR";
}

bitfield! {
    /// Media and VFP Feature Register 0.
    #[derive(Copy, Clone)]
    pub struct Mvfr0(u32);
    impl Debug;
    pub fpdp, _: 11, 8;
    pub fpsp, _: 7, 4;
}

impl Mvfr0 {
    pub fn fp_present(&self) -> bool {
        self.fpdp() != 0 || self.fpsp() != 0
    }
}

impl From<u32> for Mvfr0 {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Mvfr0> for u32 {
    fn from(value: Mvfr0) -> Self {
        value.0
    }
}

impl MemoryMappedRegister for Mvfr0 {
    const ADDRESS: u64 = 0xE000_EF40;
    const NAME: &'static str = "MVFR0";
}

bitfield! {
    /// Debug Security Control and Status Register (ARMv8-M only).
    #[derive(Copy, Clone)]
    pub struct Dscsr(u32);
    impl Debug;
    pub cds, set_cds: 16;
    pub sbrsel, set_sbrsel: 1;
    pub sbrsecure, set_sbrsecure: 0;
}

impl From<u32> for Dscsr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Dscsr> for u32 {
    fn from(value: Dscsr) -> Self {
        value.0
    }
}

impl MemoryMappedRegister for Dscsr {
    const ADDRESS: u64 = 0xE000_EE08;
    const NAME: &'static str = "DSCSR";
}
