//! Memory-mapped debug registers and the core register catalog.

pub mod dhcsr;
pub mod dwt;
pub mod fault;
pub mod fpb;
pub mod transfer_regs;

/// A register reachable through a memory-mapped address, written and read as a single
/// atomic transaction (DHCSR, DEMCR, DFSR, AIRCR, DCRSR, DCRDR, ...).
pub trait MemoryMappedRegister: Clone + From<u32> + Into<u32> + Sized + std::fmt::Debug {
    /// The register's address in the target's memory map.
    const ADDRESS: u64;
    /// The register's name, used in logging.
    const NAME: &'static str;
}

/// Selector written into DCRSR to pick a core register for transfer.
///
/// Selectors below 16 are the general-purpose registers R0-R15; 16 is XPSR; 17/18 are
/// MSP/PSP; 20 is the packed EXTRA register (CONTROL/FAULTMASK/BASEPRI/PRIMASK); 33 is
/// FPSCR; 64-95 are the FPU S0-S31 registers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterId(pub u16);

impl From<RegisterId> for u32 {
    fn from(value: RegisterId) -> Self {
        u32::from(value.0)
    }
}

pub const R0: RegisterId = RegisterId(0);
pub const SP: RegisterId = RegisterId(13);
pub const RA: RegisterId = RegisterId(14);
pub const PC: RegisterId = RegisterId(15);
pub const XPSR: RegisterId = RegisterId(16);
pub const MSP: RegisterId = RegisterId(17);
pub const PSP: RegisterId = RegisterId(18);
pub const EXTRA: RegisterId = RegisterId(20);
pub const FPSCR: RegisterId = RegisterId(33);

/// Bit offset within the packed EXTRA container register for a sub-8-bit register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PackedSubRegister {
    pub name: &'static str,
    pub container: RegisterId,
    pub bit_offset: u32,
}

pub const CONTROL: PackedSubRegister = PackedSubRegister {
    name: "CONTROL",
    container: EXTRA,
    bit_offset: 24,
};
pub const FAULTMASK: PackedSubRegister = PackedSubRegister {
    name: "FAULTMASK",
    container: EXTRA,
    bit_offset: 16,
};
pub const BASEPRI: PackedSubRegister = PackedSubRegister {
    name: "BASEPRI",
    container: EXTRA,
    bit_offset: 8,
};
pub const PRIMASK: PackedSubRegister = PackedSubRegister {
    name: "PRIMASK",
    container: EXTRA,
    bit_offset: 0,
};

/// Unpacks the four 8-bit sub-registers out of the 32-bit EXTRA container value.
pub fn unpack_extra(container_value: u32) -> [(&'static str, u8); 4] {
    [
        (CONTROL.name, (container_value >> CONTROL.bit_offset) as u8),
        (
            FAULTMASK.name,
            (container_value >> FAULTMASK.bit_offset) as u8,
        ),
        (BASEPRI.name, (container_value >> BASEPRI.bit_offset) as u8),
        (PRIMASK.name, (container_value >> PRIMASK.bit_offset) as u8),
    ]
}

/// An entry in the core's register list, as exposed by the (out-of-scope) register-cache
/// collaborator. The core only needs to know whether a register exists and how to map it
/// to a DCRSR selector; storage/dirty-tracking belongs to that collaborator.
#[derive(Debug, Copy, Clone)]
pub struct CoreRegisterEntry {
    pub id: RegisterId,
    pub name: &'static str,
    pub exists: bool,
}

/// The ordered register list for a bulk read/write, container registers first.
pub fn base_register_list() -> Vec<CoreRegisterEntry> {
    let mut list = Vec::new();
    for i in 0..13u16 {
        list.push(CoreRegisterEntry {
            id: RegisterId(i),
            name: "R",
            exists: true,
        });
    }
    for (id, name) in [(SP, "SP"), (RA, "LR"), (PC, "PC"), (XPSR, "XPSR")] {
        list.push(CoreRegisterEntry {
            id,
            name,
            exists: true,
        });
    }
    for (id, name) in [(MSP, "MSP"), (PSP, "PSP")] {
        list.push(CoreRegisterEntry {
            id,
            name,
            exists: true,
        });
    }
    // EXTRA must precede its packed children; the children themselves are never
    // transferred individually over DCRSR, they are unpacked client-side.
    list.push(CoreRegisterEntry {
        id: EXTRA,
        name: "EXTRA",
        exists: true,
    });
    list
}

/// Extends the base register list with the FPU registers (FPSCR, S0-S31), each S register
/// pair occupying two adjacent selectors for double-precision access.
pub fn with_fpu_register_list() -> Vec<CoreRegisterEntry> {
    let mut list = base_register_list();
    list.push(CoreRegisterEntry {
        id: FPSCR,
        name: "FPSCR",
        exists: true,
    });
    for i in 0..32u16 {
        list.push(CoreRegisterEntry {
            id: RegisterId(64 + i),
            name: "S",
            exists: true,
        });
    }
    list
}
