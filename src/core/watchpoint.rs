//! C14: watchpoint hit classifier.

use super::TargetCore;
use crate::error::CortexMError;
use crate::registers::dwt::{DwtComparator, DwtFunction, WatchpointKind};

/// One DWT comparator's match, reported back to the caller after a `DebugReason::Watchpoint`
/// or `WptAndBkpt` halt.
#[derive(Debug, Clone, Copy)]
pub struct WatchpointHit {
    pub comparator_index: usize,
    pub address: u32,
    pub kind: WatchpointKind,
}

/// DWT_FUNCTION encodings for load/store/load-or-store access watchpoints (the remaining
/// encodings cover non-watchpoint comparator modes and never classify as a hit here).
const FUNCTION_WATCH_READ: u32 = 0b0101;
const FUNCTION_WATCH_WRITE: u32 = 0b0110;
const FUNCTION_WATCH_READWRITE: u32 = 0b0111;

impl TargetCore {
    /// Scans every DWT comparator's live FUNCTION register for a set MATCHED bit, since
    /// the shadow state only carries what was last configured, not what last fired.
    #[tracing::instrument(skip(self))]
    pub fn hit_watchpoint(&mut self) -> Result<Option<WatchpointHit>, CortexMError> {
        for index in 0..self.dwt_list.len() {
            let (_, _, func_addr) = DwtComparator::addresses(index);
            let function = DwtFunction::from(self.memory.read_word_32(func_addr)?);
            if !function.matched() {
                continue;
            }
            let Some(kind) = classify(function.function()) else {
                continue;
            };
            return Ok(Some(WatchpointHit {
                comparator_index: index,
                address: self.dwt_list[index].address,
                kind,
            }));
        }
        Ok(None)
    }
}

fn classify(function: u32) -> Option<WatchpointKind> {
    match function {
        FUNCTION_WATCH_READ => Some(WatchpointKind::Read),
        FUNCTION_WATCH_WRITE => Some(WatchpointKind::Write),
        FUNCTION_WATCH_READWRITE => Some(WatchpointKind::ReadWrite),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_core;

    #[test]
    fn reports_no_hit_when_nothing_matched() {
        let mut core = test_core();
        assert!(core.hit_watchpoint().unwrap().is_none());
    }

    #[test]
    fn classifies_a_matched_write_watchpoint() {
        let mut core = test_core();
        core.dwt_list = vec![DwtComparator {
            enabled: true,
            address: 0x2000_0010,
            mask: 0,
            function: FUNCTION_WATCH_WRITE,
        }];
        let (_, _, func_addr) = DwtComparator::addresses(0);
        let mut function = DwtFunction::from(0);
        function.set_matched(true);
        function.set_function(FUNCTION_WATCH_WRITE);
        core.memory_mut()
            .write_word_32(func_addr, function.into())
            .unwrap();

        let hit = core.hit_watchpoint().unwrap().unwrap();
        assert_eq!(hit.comparator_index, 0);
        assert_eq!(hit.address, 0x2000_0010);
        assert_eq!(hit.kind, WatchpointKind::Write);
    }
}
