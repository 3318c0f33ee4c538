//! Integration tests for the six concrete scenarios this core is built around.

use std::collections::HashMap;
use std::time::Duration;

use cortex_m_debug_core::adapter::{Adapter, ResetConfig};
use cortex_m_debug_core::breakpoints::{Breakpoint, BreakpointKind, BreakpointStore};
use cortex_m_debug_core::disassembler::Disassembler;
use cortex_m_debug_core::error::ArmError;
use cortex_m_debug_core::events::{EventSink, TargetEvent};
use cortex_m_debug_core::memory::ArmMemoryInterface;
use cortex_m_debug_core::registers::dhcsr::Dhcsr;
use cortex_m_debug_core::registers::transfer_regs::Demcr;
use cortex_m_debug_core::registers::MemoryMappedRegister;
use cortex_m_debug_core::{AbstractTargetState, Architecture, DebugReason, IsrMaskingMode, SoftResetConfig, TargetCore};
use pretty_assertions::assert_eq;

#[derive(Debug)]
struct TestMemory {
    words: HashMap<u64, u32>,
    /// Whether DHCSR reads back with S_REGRDY forced set, simulating a transport where
    /// every register transfer completes instantly. Scenario 6 disables this to exercise
    /// the fast-to-slow downgrade.
    regrdy_always_set: bool,
    /// Whether DHCSR reads back with S_HALT forced set, simulating a core that is already
    /// parked at a breakpoint the instant it is polled. Used by the interrupt-aware step
    /// scenario so its wait loop resolves without a real-time wait.
    force_s_halt: bool,
}

impl Default for TestMemory {
    fn default() -> Self {
        Self {
            words: HashMap::new(),
            regrdy_always_set: true,
            force_s_halt: false,
        }
    }
}

impl ArmMemoryInterface for TestMemory {
    fn read_word_32(&mut self, address: u64) -> Result<u32, ArmError> {
        let value = *self.words.get(&address).unwrap_or(&0);
        if address == Dhcsr::ADDRESS {
            let mut value = value;
            if self.regrdy_always_set {
                value |= 1 << 16;
            }
            if self.force_s_halt {
                value |= 1 << 17;
            }
            Ok(value)
        } else {
            Ok(value)
        }
    }
    fn write_word_32(&mut self, address: u64, value: u32) -> Result<(), ArmError> {
        self.words.insert(address, value);
        Ok(())
    }
    fn read_word_8(&mut self, address: u64) -> Result<u8, ArmError> {
        Ok(self.read_word_32(address & !0b11)? as u8)
    }
    fn write_word_8(&mut self, address: u64, value: u8) -> Result<(), ArmError> {
        self.write_word_32(address & !0b11, value as u32)
    }
    fn read_32(&mut self, address: u64, data: &mut [u32]) -> Result<(), ArmError> {
        for (i, slot) in data.iter_mut().enumerate() {
            *slot = self.read_word_32(address + 4 * i as u64)?;
        }
        Ok(())
    }
    fn write_32(&mut self, address: u64, data: &[u32]) -> Result<(), ArmError> {
        for (i, value) in data.iter().enumerate() {
            self.write_word_32(address + 4 * i as u64, *value)?;
        }
        Ok(())
    }
    fn read_8(&mut self, address: u64, data: &mut [u8]) -> Result<(), ArmError> {
        for (i, slot) in data.iter_mut().enumerate() {
            *slot = self.read_word_8(address + i as u64)?;
        }
        Ok(())
    }
    fn write_8(&mut self, address: u64, data: &[u8]) -> Result<(), ArmError> {
        for (i, value) in data.iter().enumerate() {
            self.write_word_8(address + i as u64, *value)?;
        }
        Ok(())
    }
    fn flush(&mut self) -> Result<(), ArmError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct TestAdapter {
    reset_config: ResetConfig,
}

impl Adapter for TestAdapter {
    fn assert_reset(&mut self) {}
    fn deassert_reset(&mut self) {}
    fn reset_config(&self) -> ResetConfig {
        self.reset_config
    }
    fn reinit_dp(&mut self) {}
    fn sleep(&mut self, _duration: Duration) {}
    fn keep_alive(&mut self) {}
}

#[derive(Debug, Default)]
struct TestBreakpoints {
    breakpoints: HashMap<u32, BreakpointKind>,
}

impl BreakpointStore for TestBreakpoints {
    fn find(&self, address: u32) -> Option<Breakpoint> {
        self.breakpoints.get(&address).map(|&kind| Breakpoint { address, kind })
    }
    fn add(&mut self, address: u32, kind: BreakpointKind) -> Result<Breakpoint, ()> {
        self.breakpoints.insert(address, kind);
        Ok(Breakpoint { address, kind })
    }
    fn remove(&mut self, address: u32) {
        self.breakpoints.remove(&address);
    }
    fn set(&mut self, _breakpoint: &Breakpoint) {}
    fn unset(&mut self, _breakpoint: &Breakpoint) {}
}

#[derive(Debug, Default)]
struct TestDisassembler;

impl Disassembler for TestDisassembler {
    fn bkpt_instruction_size_at(&self, _pc: u32) -> Option<u32> {
        None
    }
}

#[derive(Debug, Default)]
struct TestEvents {
    events: Vec<TargetEvent>,
}

impl EventSink for TestEvents {
    fn emit(&mut self, event: TargetEvent) {
        self.events.push(event);
    }
}

fn make_core() -> TargetCore {
    make_core_with_memory(TestMemory::default())
}

fn make_core_with_memory(memory: TestMemory) -> TargetCore {
    make_core_with(memory, TestBreakpoints::default())
}

fn make_core_with(memory: TestMemory, breakpoints: TestBreakpoints) -> TargetCore {
    TargetCore::new(
        Box::new(memory),
        Box::new(TestAdapter::default()),
        Box::new(breakpoints),
        Box::new(TestDisassembler),
        Box::new(TestEvents::default()),
        IsrMaskingMode::Auto,
        false,
        SoftResetConfig::SysResetReq,
        true,
        Architecture::V7M,
        false,
    )
}

const S_HALT: u32 = 1 << 17;
const S_RESET_ST: u32 = 1 << 25;

/// Scenario 1: halt from running.
#[test]
fn halt_from_running_reaches_halted_with_dbgrq() {
    const C_DEBUGEN: u32 = 1;
    const C_HALT: u32 = 1 << 1;

    let mut core = make_core();
    core.state = AbstractTargetState::Running;
    core.set_halt(true).unwrap();

    let written = core.memory_mut().read_word_32(Dhcsr::ADDRESS).unwrap();
    assert_eq!(written >> 16, 0xa05f);
    assert_eq!(written & (C_DEBUGEN | C_HALT), C_DEBUGEN | C_HALT);

    // The adapter reports back that the core has actually entered debug state, halted by
    // the debug request DFSR raises.
    let settled = (written & !0xffff_0000u32) | S_HALT;
    core.memory_mut().write_word_32(Dhcsr::ADDRESS, settled).unwrap();
    use cortex_m_debug_core::registers::transfer_regs::Dfsr;
    core.memory_mut().write_word_32(Dfsr::ADDRESS, 1 /* HALTED */).unwrap();

    core.poll_one().unwrap();
    assert_eq!(core.state, AbstractTargetState::Halted);
    assert_eq!(core.debug_reason, DebugReason::Dbgrq);
    assert!(core.register_cache.valid);
}

/// Scenario 2: external reset detection, then end-of-reset on the next poll.
#[test]
fn external_reset_then_endreset_on_next_poll() {
    let mut core = make_core();
    core.state = AbstractTargetState::Running;

    core.memory_mut().write_word_32(Dhcsr::ADDRESS, S_RESET_ST).unwrap();
    core.poll_one().unwrap();
    assert_eq!(core.state, AbstractTargetState::Reset);
    assert_eq!(core.sticky_dhcsr & S_RESET_ST, 0);

    core.memory_mut().write_word_32(Dhcsr::ADDRESS, 0).unwrap();
    core.poll_one().unwrap();
    assert_eq!(core.state, AbstractTargetState::Running);

    let demcr = Demcr::from(core.memory_mut().read_word_32(Demcr::ADDRESS).unwrap());
    assert!(demcr.trcena());
}

/// Scenario 4: VECTRESET unsupported falls back to SYSRESETREQ.
#[test]
fn vectreset_unsupported_falls_back_to_sysresetreq() {
    let mut core = make_core();
    core.soft_reset_config = SoftResetConfig::VectReset;
    core.vectreset_supported = false;

    core.assert_reset(false).unwrap();

    use cortex_m_debug_core::registers::transfer_regs::Aircr;
    let aircr = Aircr::from(core.memory_mut().read_word_32(Aircr::ADDRESS).unwrap());
    assert!(aircr.sysresetreq());
    assert!(!aircr.vectreset());
    assert_eq!(core.state, AbstractTargetState::Reset);
}

/// Scenario 6: a fast bulk read with S_REGRDY=0 anywhere downgrades to slow reads.
#[test]
fn fast_read_downgrades_to_slow_on_missing_regrdy() {
    use cortex_m_debug_core::error::CortexMError;
    use cortex_m_debug_core::TransferMode;

    let mut core = make_core_with_memory(TestMemory {
        words: HashMap::new(),
        regrdy_always_set: false,
    });

    let result = core.fast_read_all_regs();
    assert!(matches!(result, Err(CortexMError::Timeout)));
    assert_eq!(core.transfer_mode, TransferMode::Slow);
}

/// Scenario 1 variant: debug_reason is DBGRQ after an externally-driven halt is observed.
#[test]
fn poll_after_halt_examines_debug_reason_as_dbgrq() {
    let mut core = make_core();
    core.state = AbstractTargetState::Running;
    use cortex_m_debug_core::registers::transfer_regs::Dfsr;
    core.memory_mut()
        .write_word_32(Dfsr::ADDRESS, 1 << 4 /* EXTERNAL */)
        .unwrap();
    core.memory_mut().write_word_32(Dhcsr::ADDRESS, S_HALT).unwrap();

    core.poll_one().unwrap();
    assert_eq!(core.state, AbstractTargetState::Halted);
    assert_eq!(core.debug_reason, DebugReason::Dbgrq);
}

/// Scenario 3: interrupt-aware step over a breakpoint at the current PC.
#[test]
fn step_over_breakpoint_restores_it_and_halts() {
    let mut breakpoints = TestBreakpoints::default();
    breakpoints.breakpoints.insert(0x0800_1000, BreakpointKind::Hardware);

    let memory = TestMemory {
        force_s_halt: true,
        ..TestMemory::default()
    };

    let mut core = make_core_with(memory, breakpoints);
    core.state = AbstractTargetState::Halted;

    core.step(false, 0x0800_1000).unwrap();

    // A timed-out ISR wait would have left the core RUNNING with NOT_HALTED instead.
    assert_eq!(core.state, AbstractTargetState::Halted);
    assert_eq!(core.debug_reason, DebugReason::SingleStep);
}

/// Scenario 5: SMP halt consolidation.
#[test]
fn smp_poll_consolidates_postponed_halt_events() {
    use cortex_m_debug_core::core::smp;

    let mut core_a = make_core();
    let mut core_b = make_core();
    core_a.smp_member = true;
    core_b.smp_member = true;
    core_a.state = AbstractTargetState::Running;
    core_b.state = AbstractTargetState::Running;
    core_a.memory_mut().write_word_32(Dhcsr::ADDRESS, S_HALT).unwrap();
    core_b.memory_mut().write_word_32(Dhcsr::ADDRESS, S_HALT).unwrap();

    let mut cores = vec![core_a, core_b];
    smp::post_halt_poll(&mut cores).unwrap();
    assert!(cores[0].smp_halt_event_postponed);
    assert!(cores[1].smp_halt_event_postponed);
    assert_eq!(cores[0].state, AbstractTargetState::Halted);
    assert_eq!(cores[1].state, AbstractTargetState::Halted);

    smp::poll_smp(&mut cores).unwrap();
    assert!(!cores[0].smp_halt_event_postponed);
    assert!(!cores[1].smp_halt_event_postponed);
}
