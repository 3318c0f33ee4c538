//! The per-core debug-control state machine: [`TargetCore`] and its component modules.

pub mod debug_entry;
pub mod dcc;
pub mod examine;
pub mod halt_mask;
pub mod memory_access;
pub mod poll;
pub mod reset;
pub mod resume;
pub mod smp;
pub mod status;
pub mod step;
pub mod transfer;
pub mod watchpoint;

use std::collections::HashMap;

use crate::adapter::Adapter;
use crate::breakpoints::BreakpointStore;
use crate::disassembler::Disassembler;
use crate::events::EventSink;
use crate::memory::ArmMemoryInterface;
use crate::registers::dwt::DwtComparator;
use crate::registers::fpb::FpbComparator;
use crate::registers::RegisterId;

/// The processor's externally observable execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractTargetState {
    Unknown,
    Running,
    Halted,
    Reset,
    DebugRunning,
}

/// Why the core is (or most recently was) halted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugReason {
    Dbgrq,
    Breakpoint,
    Watchpoint,
    WptAndBkpt,
    SingleStep,
    Vcatch,
    External,
    Undefined,
    NotHalted,
}

/// Policy for whether interrupts are masked across halt/run/step transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsrMaskingMode {
    Auto,
    Off,
    On,
    StepOnly,
}

/// The software reset mechanism to drive through AIRCR when no hardware SRST is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftResetConfig {
    VectReset,
    SysResetReq,
}

/// The architecture variant, which governs unaligned-access policy and secure-state
/// queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    V6M,
    V7M,
    V8M,
}

/// The register-transfer transport strategy currently in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Fast,
    Slow,
}

/// A minimal stand-in for the out-of-scope register-cache collaborator: holds the last
/// value read for every register the catalog knows about, plus a single validity flag
/// that is cleared on every RUNNING transition per the core invariant.
#[derive(Debug, Default)]
pub struct RegisterCache {
    pub valid: bool,
    values: HashMap<RegisterId, u32>,
}

impl RegisterCache {
    pub fn invalidate(&mut self) {
        self.valid = false;
        self.values.clear();
    }

    pub fn set(&mut self, id: RegisterId, value: u32) {
        self.values.insert(id, value);
    }

    pub fn get(&self, id: RegisterId) -> Option<u32> {
        self.values.get(&id).copied()
    }

    pub fn mark_valid(&mut self) {
        self.valid = true;
    }
}

/// The per-processor state bundle driving one Cortex-M core through its debug interface.
pub struct TargetCore {
    pub(crate) memory: Box<dyn ArmMemoryInterface>,
    pub(crate) adapter: Box<dyn Adapter>,
    pub(crate) breakpoints: Box<dyn BreakpointStore>,
    pub(crate) disassembler: Box<dyn Disassembler>,
    pub(crate) events: Box<dyn EventSink>,

    pub state: AbstractTargetState,
    pub debug_reason: DebugReason,

    pub cached_dhcsr: u32,
    pub sticky_dhcsr: u32,
    pub cached_dfsr: u32,

    pub slow_register_read: bool,
    pub transfer_mode: TransferMode,
    pub register_cache: RegisterCache,

    pub isrmasking_mode: IsrMaskingMode,
    pub maskints_erratum: bool,

    pub soft_reset_config: SoftResetConfig,
    pub vectreset_supported: bool,

    pub fpb_enabled: bool,
    pub fp_rev: u8,
    pub fp_num_code: u32,
    pub fp_num_lit: u32,
    pub fp_list: Vec<FpbComparator>,
    pub fpu_present: bool,

    pub dwt_num_comp: u32,
    pub dwt_list: Vec<DwtComparator>,

    pub arch: Architecture,
    pub exception_number: u16,

    pub dcc_messaging_enabled: bool,
    pub reset_halt_requested: bool,
    pub vector_catch: u32,

    /// Set by `poll_one` when a SMP group member halted but the group is not yet fully
    /// quiescent; consumed and cleared by `poll_smp`.
    pub smp_halt_event_postponed: bool,

    /// Whether this core is part of a SMP group, set by the group coordinator.
    pub smp_member: bool,

    /// Any failure latched during a poll cycle that must still run to completion
    /// (e.g. a lockup discovery); returned to the caller once the cycle finishes.
    pub(crate) latched_poll_failure: Option<crate::error::CortexMError>,
}

impl TargetCore {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        memory: Box<dyn ArmMemoryInterface>,
        adapter: Box<dyn Adapter>,
        breakpoints: Box<dyn BreakpointStore>,
        disassembler: Box<dyn Disassembler>,
        events: Box<dyn EventSink>,
        isrmasking_mode: IsrMaskingMode,
        maskints_erratum: bool,
        soft_reset_config: SoftResetConfig,
        vectreset_supported: bool,
        arch: Architecture,
        dcc_messaging_enabled: bool,
    ) -> Self {
        Self {
            memory,
            adapter,
            breakpoints,
            disassembler,
            events,
            state: AbstractTargetState::Unknown,
            debug_reason: DebugReason::NotHalted,
            cached_dhcsr: 0,
            sticky_dhcsr: 0,
            cached_dfsr: 0,
            slow_register_read: false,
            transfer_mode: TransferMode::Fast,
            register_cache: RegisterCache::default(),
            isrmasking_mode,
            maskints_erratum,
            soft_reset_config,
            vectreset_supported,
            fpb_enabled: false,
            fp_rev: 1,
            fp_num_code: 0,
            fp_num_lit: 0,
            fp_list: Vec::new(),
            fpu_present: false,
            dwt_num_comp: 0,
            dwt_list: Vec::new(),
            arch,
            exception_number: 0,
            dcc_messaging_enabled,
            reset_halt_requested: false,
            vector_catch: 0,
            smp_halt_event_postponed: false,
            smp_member: false,
            latched_poll_failure: None,
        }
    }

    /// Acknowledges the RESET transition: clears the sticky reset bit now that a caller
    /// has acted on it. Per the core invariant, this is the only place this bit clears.
    pub(crate) fn ack_sticky_reset(&mut self) {
        const S_RESET_ST: u32 = 1 << 25;
        self.sticky_dhcsr &= !S_RESET_ST;
    }

    /// Direct access to the transport, for callers (and tests) that need to inspect or
    /// drive it outside the component methods above.
    pub fn memory_mut(&mut self) -> &mut dyn ArmMemoryInterface {
        self.memory.as_mut()
    }

    pub fn events_mut(&mut self) -> &mut dyn EventSink {
        self.events.as_mut()
    }
}
