use chrono::Duration;
use tracing::{debug, error, info, warn};

use swipedeck_core::config::EngineConfig;
use swipedeck_core::errors::{SessionError, StackError};
use swipedeck_core::traits::{EventSink, RandomSource, Scheduler, SessionEvent};
use swipedeck_core::types::{
    Candidate, CandidateId, Commitment, Decision, DecisionKind, DragVector, Preview, TimerHandle,
    TimerTask,
};

use super::clock::{saturating_add, ManualScheduler};
use crate::decision::{DecisionEngine, RecordedDecision};
use crate::gesture::GestureClassifier;
use crate::stack::CandidateStack;
use crate::undo::UndoController;

/// A committed decision whose card has not left the stack yet.
#[derive(Debug, Clone)]
struct PendingExit {
    candidate: CandidateId,
    decision: Decision,
    timer: TimerHandle,
}

/// One deck session: the four components wired through an injected clock,
/// random source and event sink.
///
/// Decisions are recorded at commit time. The card itself leaves the stack
/// when the exit timer fires, and only then becomes restorable.
pub struct Session<R, S, E> {
    config: EngineConfig,
    classifier: GestureClassifier,
    stack: CandidateStack,
    decisions: DecisionEngine,
    undo: UndoController,
    rng: R,
    scheduler: S,
    sink: E,
    pending_exit: Option<PendingExit>,
    undo_timer: Option<TimerHandle>,
}

impl<R: RandomSource, S: Scheduler, E: EventSink> Session<R, S, E> {
    pub fn new(
        candidates: Vec<Candidate>,
        config: EngineConfig,
        rng: R,
        scheduler: S,
        sink: E,
    ) -> Result<Self, SessionError> {
        let stack = CandidateStack::new(candidates)?;
        info!(candidates = stack.len(), "session started");
        Ok(Self {
            classifier: GestureClassifier::new(config.gestures),
            decisions: DecisionEngine::new(config.matching),
            undo: UndoController::new(),
            config,
            stack,
            rng,
            scheduler,
            sink,
            pending_exit: None,
            undo_timer: None,
        })
    }

    /// Feed one drag sample. Returns `None` while the top is locked or the
    /// stack is empty; nothing is emitted in that case.
    pub fn drag(&mut self, drag: DragVector) -> Option<Preview> {
        if self.pending_exit.is_some() {
            return None;
        }
        let candidate = self.stack.top()?.id.clone();
        let preview = self.classifier.preview(drag);
        self.sink.emit(SessionEvent::Preview { candidate, preview });
        Some(preview)
    }

    /// Finish a gesture. A snap-back changes nothing and returns `Ok(None)`.
    pub fn release(&mut self, drag: DragVector) -> Result<Option<RecordedDecision>, SessionError> {
        match self.classifier.commit(drag) {
            Commitment::SnapBack => {
                debug!(dx = drag.dx, dy = drag.dy, "gesture snapped back");
                Ok(None)
            }
            Commitment::Commit(kind) => self.decide(kind).map(Some),
        }
    }

    /// Commit `kind` for the top candidate, as a gesture or a button would.
    pub fn decide(&mut self, kind: DecisionKind) -> Result<RecordedDecision, SessionError> {
        if let Some(pending) = &self.pending_exit {
            warn!(candidate = %pending.candidate, %kind, "commit refused, exit pending");
            return Err(SessionError::ExitPending(pending.candidate.clone()));
        }
        let top = self.stack.top().cloned().ok_or(StackError::Empty)?;
        let now = self.scheduler.now();
        let recorded = self.decisions.record(&top, kind, now, &mut self.rng);
        info!(candidate = %top.id, %kind, matched = recorded.matched, "decision committed");
        self.sink.emit(SessionEvent::Committed {
            decision: recorded.decision.clone(),
            matched: recorded.matched,
        });

        let delay = self.config.timing.exit_delay();
        if delay <= Duration::zero() {
            self.complete_exit(&top.id, recorded.decision.clone());
        } else {
            let timer = self.scheduler.schedule(
                delay,
                TimerTask::RemoveTop {
                    candidate: top.id.clone(),
                },
            );
            self.pending_exit = Some(PendingExit {
                candidate: top.id,
                decision: recorded.decision.clone(),
                timer,
            });
            if self.undo.is_holding() {
                self.sink
                    .emit(SessionEvent::UndoAvailability { available: false });
            }
        }
        Ok(recorded)
    }

    /// Restore the candidate held in the undo slot. Refused while an exit is
    /// pending; the exit timer fires first and its capture replaces the slot.
    pub fn undo(&mut self) -> Result<Candidate, SessionError> {
        if let Some(pending) = &self.pending_exit {
            warn!(candidate = %pending.candidate, "undo refused, exit pending");
            return Err(SessionError::ExitPending(pending.candidate.clone()));
        }
        let candidate = self.undo.restore(&mut self.stack, &mut self.decisions)?;
        if let Some(timer) = self.undo_timer.take() {
            self.scheduler.cancel(timer);
        }
        info!(candidate = %candidate.id, "candidate restored");
        self.sink.emit(SessionEvent::Restored {
            candidate: candidate.clone(),
        });
        self.emit_stack_changed();
        self.sink
            .emit(SessionEvent::UndoAvailability { available: false });
        Ok(candidate)
    }

    /// Replace the whole stack. Recorded decisions are kept; a pending exit
    /// and the undo slot are dropped.
    pub fn refresh(&mut self, candidates: Vec<Candidate>) -> Result<(), SessionError> {
        if let Err(err) = self.stack.replace_all(candidates) {
            error!(%err, "refresh rejected");
            return Err(err.into());
        }
        if let Some(exit) = self.pending_exit.take() {
            self.scheduler.cancel(exit.timer);
            debug!(candidate = %exit.candidate, "pending exit dropped by refresh");
        }
        if let Some(timer) = self.undo_timer.take() {
            self.scheduler.cancel(timer);
        }
        let had_slot = self.undo.clear().is_some();
        info!(candidates = self.stack.len(), "stack refreshed");
        self.emit_stack_changed();
        if had_slot {
            self.sink
                .emit(SessionEvent::UndoAvailability { available: false });
        }
        Ok(())
    }

    /// Dispatch every task the scheduler reports as due. Returns how many ran.
    pub fn run_due(&mut self) -> usize {
        let mut fired = 0;
        loop {
            let due = self.scheduler.take_due();
            if due.is_empty() {
                return fired;
            }
            for task in due {
                self.fire(task);
                fired += 1;
            }
        }
    }

    fn fire(&mut self, task: TimerTask) {
        match task {
            TimerTask::RemoveTop { candidate } => {
                match self.pending_exit.take() {
                    Some(exit) if exit.candidate == candidate => {
                        self.complete_exit(&exit.candidate, exit.decision);
                    }
                    other => {
                        self.pending_exit = other;
                        debug!(%candidate, "stale exit timer ignored");
                    }
                }
            }
            TimerTask::ExpireUndo { slot } => {
                if self.undo.expire(slot) {
                    self.undo_timer = None;
                    info!(slot = slot.0, "undo window closed");
                    self.sink
                        .emit(SessionEvent::UndoAvailability { available: false });
                }
            }
        }
    }

    fn complete_exit(&mut self, id: &CandidateId, decision: Decision) {
        let Some(removed) = self.stack.remove(id) else {
            warn!(candidate = %id, "exiting candidate is no longer in the stack");
            return;
        };
        debug!(candidate = %removed.id, remaining = self.stack.len(), "candidate removed");
        self.emit_stack_changed();

        if let Some(timer) = self.undo_timer.take() {
            self.scheduler.cancel(timer);
        }
        let capture = self.undo.capture(
            removed,
            decision,
            self.scheduler.now(),
            self.config.timing.undo_window(),
        );
        let timer = self.scheduler.schedule(
            self.config.timing.undo_window(),
            TimerTask::ExpireUndo {
                slot: capture.slot_id,
            },
        );
        self.undo_timer = Some(timer);
        self.sink
            .emit(SessionEvent::UndoAvailability { available: true });
    }

    fn emit_stack_changed(&mut self) {
        self.sink.emit(SessionEvent::StackChanged {
            top: self.stack.top().map(|c| c.id.clone()),
            is_empty: self.stack.is_empty(),
        });
    }

    pub fn top(&self) -> Option<&Candidate> {
        self.stack.top()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// False while an exit is pending, even if a slot is held.
    pub fn can_undo(&self) -> bool {
        self.pending_exit.is_none() && self.undo.is_holding()
    }

    /// Candidate whose exit timer is still running, if any.
    pub fn exit_pending(&self) -> Option<&CandidateId> {
        self.pending_exit.as_ref().map(|p| &p.candidate)
    }

    pub fn decisions(&self) -> &DecisionEngine {
        &self.decisions
    }

    pub fn stack(&self) -> &CandidateStack {
        &self.stack
    }

    pub fn undo_controller(&self) -> &UndoController {
        &self.undo
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut E {
        &mut self.sink
    }

    pub fn into_sink(self) -> E {
        self.sink
    }
}

impl<R: RandomSource, E: EventSink> Session<R, ManualScheduler, E> {
    /// Move the virtual clock forward by `by`, firing each timer at its own
    /// due time.
    pub fn advance(&mut self, by: Duration) {
        let target = saturating_add(self.scheduler.now(), by.max(Duration::zero()));
        while let Some(task) = self.scheduler.pop_due_until(target) {
            self.fire(task);
        }
        self.scheduler.set_now(target);
    }
}
