use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Candidate, CandidateId, Decision, Preview, TimerHandle, TimerTask};

/// Supplies uniform draws in [0, 1) for the match roll.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Clock plus deferred-task queue.
///
/// Tasks are data, not closures: the owner polls `take_due` and dispatches
/// whatever came back against its own state.
pub trait Scheduler {
    fn now(&self) -> DateTime<Utc>;
    fn schedule(&mut self, after: Duration, task: TimerTask) -> TimerHandle;
    /// Returns false if the handle already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
    /// Remove and return every task due at or before `now()`, earliest first.
    fn take_due(&mut self) -> Vec<TimerTask>;
}

/// Notification emitted by a session after each state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum SessionEvent {
    Preview {
        candidate: CandidateId,
        preview: Preview,
    },
    Committed {
        decision: Decision,
        matched: bool,
    },
    StackChanged {
        top: Option<CandidateId>,
        is_empty: bool,
    },
    UndoAvailability {
        available: bool,
    },
    Restored {
        candidate: Candidate,
    },
}

/// Receives session events.
pub trait EventSink {
    fn emit(&mut self, event: SessionEvent);
}

impl EventSink for Vec<SessionEvent> {
    fn emit(&mut self, event: SessionEvent) {
        self.push(event);
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: SessionEvent) {}
}
