//! C9: SMP group coordination.
//!
//! A SMP group is just a set of [`TargetCore`]s that must be halted, polled, and resumed
//! as one unit; the group itself owns no state beyond the members' own `smp_member` /
//! `smp_halt_event_postponed` flags, so these are free functions over a core slice rather
//! than a wrapping struct.

use super::{AbstractTargetState, TargetCore};
use crate::error::CortexMError;
use crate::events::TargetEvent;

/// Halts every member of the group. Errors from individual members are collected and the
/// first one is returned after every member has been attempted.
pub fn halt_all(cores: &mut [TargetCore]) -> Result<(), CortexMError> {
    let mut first_err = None;
    for core in cores.iter_mut() {
        if let Err(err) = core.set_halt(true) {
            tracing::warn!(?err, "failed to halt SMP member");
            first_err.get_or_insert(err);
        }
    }
    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Polls every member once, running each member's own debug-entry pipeline as it halts.
pub fn post_halt_poll(cores: &mut [TargetCore]) -> Result<(), CortexMError> {
    for core in cores.iter_mut() {
        core.poll_one()?;
    }
    Ok(())
}

/// Consolidates postponed halt events: once every member is quiescent (not RUNNING), emits
/// the deferred `Halted` event for each member that is still carrying
/// `smp_halt_event_postponed`. Called after the group's last member finishes its own
/// `poll_one`.
pub fn poll_smp(cores: &mut [TargetCore]) -> Result<(), CortexMError> {
    let all_quiescent = cores
        .iter()
        .all(|c| c.state != AbstractTargetState::Running);
    if !all_quiescent {
        return Ok(());
    }
    for core in cores.iter_mut() {
        if core.smp_halt_event_postponed {
            core.smp_halt_event_postponed = false;
            core.events.emit(TargetEvent::Halted(core.debug_reason));
        }
    }
    Ok(())
}

/// Resumes the whole group for a `leader`-initiated resume: restores every other member
/// first (swallowing individual failures as warnings, matching the lenient original
/// behaviour), then the leader, then restarts every member.
pub fn resume_group(cores: &mut [TargetCore], leader: usize) -> Result<(), CortexMError> {
    for (i, core) in cores.iter_mut().enumerate() {
        if i == leader {
            continue;
        }
        if let Err(err) = core.restore_one(false) {
            tracing::warn!(?err, member = i, "SMP member restore failed, continuing");
        }
    }
    cores[leader].restore_one(false)?;

    for core in cores.iter_mut() {
        core.restart_one(false)?;
    }
    Ok(())
}
