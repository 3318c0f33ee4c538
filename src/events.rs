//! Target event bus: an opaque collaborator the core emits state-change notifications
//! into so a debugger front-end can update its view without polling.

use crate::core::DebugReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEvent {
    Halted(DebugReason),
    Resumed,
    DebugResumed,
    Reset,
    ExternalResetDetected,
}

/// Out-of-scope collaborator: the event bus / callback registry.
pub trait EventSink {
    fn emit(&mut self, event: TargetEvent);
}

/// An event sink that drops everything, useful for operations invoked without a live
/// front-end attached (tests, scripted sequences).
#[derive(Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&mut self, _event: TargetEvent) {}
}

/// An event sink that records events in arrival order, used by tests to assert on the
/// exact sequence the core emits.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    pub events: Vec<TargetEvent>,
}

impl EventSink for RecordingEventSink {
    fn emit(&mut self, event: TargetEvent) {
        self.events.push(event);
    }
}
