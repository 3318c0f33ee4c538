//! The debug-adapter collaborator: SRST control and the host's cooperative scheduler.

use std::time::Duration;

/// Configuration of which hardware reset sources the adapter exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetConfig {
    pub has_srst: bool,
    pub srst_no_gating: bool,
}

/// The probe/adapter side of reset control and host cooperative scheduling.
///
/// Out of scope: actual SWD/JTAG pin wiggling. The core only needs to ask for SRST to be
/// asserted or released and to be told the adapter's reset capability.
pub trait Adapter {
    fn assert_reset(&mut self);
    fn deassert_reset(&mut self);
    fn reset_config(&self) -> ResetConfig;

    /// Re-establishes the debug port connection, needed after a reset that may have
    /// taken the DP itself down along with the core (e.g. a gated hardware SRST).
    fn reinit_dp(&mut self);

    /// Sleeps for `duration`, pumping any host timers that must keep running (USB
    /// keep-alives, UI refresh) while the core waits out a bounded budget.
    fn sleep(&mut self, duration: Duration);

    /// A courtesy call made every iteration of a polling loop so the host can service
    /// other work without the core owning a thread of its own.
    fn keep_alive(&mut self);
}
