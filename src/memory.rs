//! The DAP/AP transport contract the core is generic over.
//!
//! This is the out-of-scope collaborator from the system overview: byte-level SWD/JTAG,
//! AP/DP queuing and flushing live on the other side of this trait. The core only ever
//! calls these methods; it never owns a probe connection itself.

use crate::error::ArmError;

/// A memory-mapped interface onto one Cortex-M core's debug address space.
///
/// Implementations decide for themselves whether a given call is issued immediately
/// (atomic) or queued for a later [`ArmMemoryInterface::flush`] (pipelined); the core
/// relies only on the ordering guarantee that calls issued before a `flush` are
/// serialized on the wire in issue order.
pub trait ArmMemoryInterface {
    /// Reads one 32-bit word at `address`.
    fn read_word_32(&mut self, address: u64) -> Result<u32, ArmError>;

    /// Writes one 32-bit word at `address`.
    fn write_word_32(&mut self, address: u64, value: u32) -> Result<(), ArmError>;

    /// Reads one byte at `address`.
    fn read_word_8(&mut self, address: u64) -> Result<u8, ArmError>;

    /// Writes one byte at `address`.
    fn write_word_8(&mut self, address: u64, value: u8) -> Result<(), ArmError>;

    /// Reads `data.len()` 32-bit words starting at `address` into `data`.
    fn read_32(&mut self, address: u64, data: &mut [u32]) -> Result<(), ArmError>;

    /// Writes `data` as consecutive 32-bit words starting at `address`.
    fn write_32(&mut self, address: u64, data: &[u32]) -> Result<(), ArmError>;

    /// Reads `data.len()` bytes starting at `address` into `data`.
    fn read_8(&mut self, address: u64, data: &mut [u8]) -> Result<(), ArmError>;

    /// Writes `data` as consecutive bytes starting at `address`.
    fn write_8(&mut self, address: u64, data: &[u8]) -> Result<(), ArmError>;

    /// Flushes any transactions queued since the last flush, in issue order.
    fn flush(&mut self) -> Result<(), ArmError>;
}
