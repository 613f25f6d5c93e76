use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use swipedeck_core::errors::UndoError;
use swipedeck_core::types::{Candidate, Decision, SlotId};

use crate::decision::DecisionEngine;
use crate::stack::CandidateStack;

/// The most recently removed candidate, restorable until `expires_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UndoSlot {
    pub slot_id: SlotId,
    pub candidate: Candidate,
    pub decision: Decision,
    pub expires_at: DateTime<Utc>,
}

impl UndoSlot {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Result of a capture.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub slot_id: SlotId,
    pub expires_at: DateTime<Utc>,
    /// Slot that was live before this capture. Its candidate stays removed.
    pub displaced: Option<UndoSlot>,
}

/// Single-slot undo: Empty or Holding.
#[derive(Debug, Clone, Default)]
pub struct UndoController {
    slot: Option<UndoSlot>,
    next_slot: u64,
}

impl UndoController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `candidate` for `window`, discarding any slot already held.
    pub fn capture(
        &mut self,
        candidate: Candidate,
        decision: Decision,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Capture {
        self.next_slot += 1;
        let slot_id = SlotId(self.next_slot);
        let expires_at = now
            .checked_add_signed(window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let displaced = self.slot.replace(UndoSlot {
            slot_id,
            candidate,
            decision,
            expires_at,
        });
        if let Some(old) = &displaced {
            debug!(slot = old.slot_id.0, candidate = %old.candidate.id, "undo slot displaced");
        }
        Capture {
            slot_id,
            expires_at,
            displaced,
        }
    }

    /// Put the held candidate back on top of `stack` and reverse its decision.
    ///
    /// If the stack refuses the candidate the slot is kept and the error
    /// returned.
    pub fn restore(
        &mut self,
        stack: &mut CandidateStack,
        decisions: &mut DecisionEngine,
    ) -> Result<Candidate, UndoError> {
        let slot = self.slot.take().ok_or(UndoError::NothingToUndo)?;
        if let Err(err) = stack.reinsert_front(slot.candidate.clone()) {
            self.slot = Some(slot);
            return Err(err.into());
        }
        decisions.reverse(&slot.candidate.id);
        debug!(slot = slot.slot_id.0, candidate = %slot.candidate.id, "undo slot restored");
        Ok(slot.candidate)
    }

    /// Clear the slot if it is still `slot_id`. Stale expiries are ignored.
    pub fn expire(&mut self, slot_id: SlotId) -> bool {
        match &self.slot {
            Some(held) if held.slot_id == slot_id => {
                self.slot = None;
                debug!(slot = slot_id.0, "undo slot expired");
                true
            }
            _ => false,
        }
    }

    /// Drop the slot without restoring it.
    pub fn clear(&mut self) -> Option<UndoSlot> {
        self.slot.take()
    }

    pub fn is_holding(&self) -> bool {
        self.slot.is_some()
    }

    pub fn slot(&self) -> Option<&UndoSlot> {
        self.slot.as_ref()
    }
}
