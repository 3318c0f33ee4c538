//! Error taxonomy for the debug-control core.

/// Errors that can occur while driving a Cortex-M core through its debug interface.
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub enum CortexMError {
    /// A bounded wait (register-ready, interrupt-step, soft-reset-halt) expired.
    Timeout,

    /// The operation requires the core to be halted, but it is not.
    CoreNotHalted,

    /// Address 0x{address:08x} is not aligned to {size} bytes, which ARMv6-M requires.
    Unaligned {
        /// The offending address.
        address: u32,
        /// The required alignment in bytes.
        size: u8,
    },

    /// Unable to install a hardware breakpoint at 0x{0:#010x}; only addresses below
    /// 0x2000_0000 are reachable with a revision-0 Flash Patch & Breakpoint unit.
    UnsupportedBreakpointAddress(u32),

    /// VECTRESET is not supported on this core and no fallback reset mechanism is configured.
    VectResetUnsupported,

    /// The debug access port transport reported an error.
    Transport(#[from] ArmError),

    /// {0}
    Other(String),
}

impl CortexMError {
    pub(crate) fn unaligned(address: u32, size: u8) -> Self {
        Self::Unaligned { address, size }
    }
}

/// A stand-in for the transport-layer error type this core is generic over.
///
/// In a full debugger host this would be the ADI v5 access-port error type; the core
/// only needs to wrap it and propagate it, so it is represented here as an opaque,
/// from-anything error with a transport-supplied message.
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub enum ArmError {
    /// A timeout occurred during an access-port transaction.
    Timeout,

    /// The access port transaction failed: {0}
    Dap(String),

    /// {0}
    Other(String),
}

impl From<anyhow::Error> for CortexMError {
    fn from(err: anyhow::Error) -> Self {
        CortexMError::Other(err.to_string())
    }
}
