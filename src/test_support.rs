//! Shared test doubles for the unit tests scattered across the component modules.

use std::collections::HashMap;
use std::time::Duration;

use crate::adapter::{Adapter, ResetConfig};
use crate::breakpoints::{Breakpoint, BreakpointKind, BreakpointStore};
use crate::disassembler::Disassembler;
use crate::error::ArmError;
use crate::events::{EventSink, TargetEvent};
use crate::memory::ArmMemoryInterface;

/// An in-memory register file keyed by address, standing in for the real ADI v5
/// transport in unit tests.
#[derive(Debug, Default)]
pub struct MockArmMemory {
    words: HashMap<u64, u32>,
}

impl MockArmMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preset(&mut self, address: u64, value: u32) {
        self.words.insert(address, value);
    }
}

impl ArmMemoryInterface for MockArmMemory {
    fn read_word_32(&mut self, address: u64) -> Result<u32, ArmError> {
        Ok(*self.words.get(&address).unwrap_or(&0))
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
pub struct MockAdapter {
    pub reset_config: ResetConfig,
}

impl Adapter for MockAdapter {
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
pub struct MockBreakpointStore {
    breakpoints: HashMap<u32, BreakpointKind>,
}

impl BreakpointStore for MockBreakpointStore {
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
pub struct MockDisassembler;

impl Disassembler for MockDisassembler {
    fn bkpt_instruction_size_at(&self, _pc: u32) -> Option<u32> {
        None
    }
}

#[derive(Debug, Default)]
pub struct MockEventSink {
    pub events: Vec<TargetEvent>,
}

impl EventSink for MockEventSink {
    fn emit(&mut self, event: TargetEvent) {
        self.events.push(event);
    }
}

/// Builds a [`crate::core::TargetCore`] wired up with the mock collaborators above, in
/// the default AUTO/V7M/SYSRESETREQ configuration used by most component tests.
pub fn test_core() -> crate::core::TargetCore {
    use crate::core::{Architecture, IsrMaskingMode, SoftResetConfig, TargetCore};

    TargetCore::new(
        Box::new(MockArmMemory::new()),
        Box::new(MockAdapter::default()),
        Box::new(MockBreakpointStore::default()),
        Box::new(MockDisassembler),
        Box::new(MockEventSink::default()),
        IsrMaskingMode::Auto,
        false,
        SoftResetConfig::SysResetReq,
        true,
        Architecture::V7M,
        false,
    )
}
