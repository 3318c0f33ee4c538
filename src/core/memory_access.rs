//! C10: memory access gateway.
//!
//! A thin pass-through onto the transport collaborator that adds the one piece of policy
//! that belongs to the core rather than the transport: ARMv6-M targets reject unaligned
//! bus accesses outright, while v7-M/v8-M tolerate them.

use super::{Architecture, TargetCore};
use crate::error::CortexMError;

impl TargetCore {
    pub fn read_memory_32(&mut self, address: u32) -> Result<u32, CortexMError> {
        self.check_alignment(address, 4)?;
        Ok(self.memory.read_word_32(address as u64)?)
    }

    pub fn write_memory_32(&mut self, address: u32, value: u32) -> Result<(), CortexMError> {
        self.check_alignment(address, 4)?;
        self.memory.write_word_32(address as u64, value)?;
        Ok(())
    }

    pub fn read_memory_8(&mut self, address: u32) -> Result<u8, CortexMError> {
        Ok(self.memory.read_word_8(address as u64)?)
    }

    pub fn write_memory_8(&mut self, address: u32, value: u8) -> Result<(), CortexMError> {
        self.memory.write_word_8(address as u64, value)?;
        Ok(())
    }

    pub fn read_memory_block32(&mut self, address: u32, data: &mut [u32]) -> Result<(), CortexMError> {
        self.check_alignment(address, 4)?;
        self.memory.read_32(address as u64, data)?;
        Ok(())
    }

    pub fn write_memory_block32(&mut self, address: u32, data: &[u32]) -> Result<(), CortexMError> {
        self.check_alignment(address, 4)?;
        self.memory.write_32(address as u64, data)?;
        Ok(())
    }

    fn check_alignment(&self, address: u32, size: u8) -> Result<(), CortexMError> {
        if self.arch == Architecture::V6M && address % u32::from(size) != 0 {
            return Err(CortexMError::unaligned(address, size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_core;

    #[test]
    fn v6m_rejects_unaligned_word_access() {
        let mut core = test_core();
        core.arch = Architecture::V6M;
        assert!(matches!(
            core.read_memory_32(0x2000_0001),
            Err(CortexMError::Unaligned { .. })
        ));
    }

    #[test]
    fn v7m_tolerates_unaligned_word_access() {
        let mut core = test_core();
        core.arch = Architecture::V7M;
        assert!(core.read_memory_32(0x2000_0001).is_ok());
    }
}
