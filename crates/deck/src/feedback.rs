use serde::Serialize;
use tracing::info;

use swipedeck_core::traits::SessionEvent;
use swipedeck_core::types::{DecisionKind, Preview};

/// Haptic-style cue for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCue {
    Light,
    Medium,
    Heavy,
    Success,
}

pub trait FeedbackService {
    fn play(&mut self, cue: FeedbackCue);
}

/// Logs each cue instead of driving hardware.
#[derive(Debug, Default)]
pub struct TracingFeedback;

impl FeedbackService for TracingFeedback {
    fn play(&mut self, cue: FeedbackCue) {
        info!(?cue, "feedback");
    }
}

/// Turns session events into cues. A preview cue plays when a lean is
/// entered, not on every drag sample.
#[derive(Debug, Default)]
pub struct CueMapper {
    last_preview: Option<Preview>,
}

impl CueMapper {
    pub fn cue_for(&mut self, event: &SessionEvent) -> Option<FeedbackCue> {
        match event {
            SessionEvent::Preview { preview, .. } => {
                if self.last_preview == Some(*preview) {
                    return None;
                }
                self.last_preview = Some(*preview);
                match preview {
                    Preview::Neutral => None,
                    Preview::Leaning(DecisionKind::StrongApprove) => Some(FeedbackCue::Medium),
                    Preview::Leaning(_) => Some(FeedbackCue::Light),
                }
            }
            SessionEvent::Committed { decision, .. } => {
                self.last_preview = None;
                Some(match decision.kind {
                    DecisionKind::Approve => FeedbackCue::Success,
                    DecisionKind::Reject => FeedbackCue::Light,
                    DecisionKind::StrongApprove => FeedbackCue::Heavy,
                })
            }
            SessionEvent::StackChanged { .. } | SessionEvent::Restored { .. } => {
                self.last_preview = None;
                None
            }
            SessionEvent::UndoAvailability { .. } => None,
        }
    }

    /// Map every event and play the resulting cues in order.
    pub fn play_all(
        &mut self,
        events: &[SessionEvent],
        service: &mut dyn FeedbackService,
    ) -> Vec<FeedbackCue> {
        let cues: Vec<_> = events.iter().filter_map(|e| self.cue_for(e)).collect();
        for cue in &cues {
            service.play(*cue);
        }
        cues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use swipedeck_core::types::Decision;

    impl FeedbackService for Vec<FeedbackCue> {
        fn play(&mut self, cue: FeedbackCue) {
            self.push(cue);
        }
    }

    fn preview(p: Preview) -> SessionEvent {
        SessionEvent::Preview {
            candidate: "p1".into(),
            preview: p,
        }
    }

    fn committed(kind: DecisionKind) -> SessionEvent {
        SessionEvent::Committed {
            decision: Decision {
                seq: 1,
                candidate_id: "p1".into(),
                kind,
                at: DateTime::default(),
            },
            matched: false,
        }
    }

    #[test]
    fn lean_plays_once_per_entry() {
        let events = [
            preview(Preview::Neutral),
            preview(Preview::Leaning(DecisionKind::Approve)),
            preview(Preview::Leaning(DecisionKind::Approve)),
            preview(Preview::Neutral),
            preview(Preview::Leaning(DecisionKind::StrongApprove)),
        ];
        let mut played = Vec::new();
        let cues = CueMapper::default().play_all(&events, &mut played);
        assert_eq!(cues, [FeedbackCue::Light, FeedbackCue::Medium]);
        assert_eq!(played, cues);
    }

    #[test]
    fn commit_cues_by_kind() {
        let mut m = CueMapper::default();
        assert_eq!(
            m.cue_for(&committed(DecisionKind::Approve)),
            Some(FeedbackCue::Success)
        );
        assert_eq!(
            m.cue_for(&committed(DecisionKind::Reject)),
            Some(FeedbackCue::Light)
        );
        assert_eq!(
            m.cue_for(&committed(DecisionKind::StrongApprove)),
            Some(FeedbackCue::Heavy)
        );
        assert_eq!(
            m.cue_for(&SessionEvent::UndoAvailability { available: true }),
            None
        );
    }

    #[test]
    fn new_top_replays_lean_cue() {
        let mut m = CueMapper::default();
        let lean = preview(Preview::Leaning(DecisionKind::Reject));
        assert!(m.cue_for(&lean).is_some());
        m.cue_for(&SessionEvent::StackChanged {
            top: Some("p2".into()),
            is_empty: false,
        });
        assert_eq!(m.cue_for(&lean), Some(FeedbackCue::Light));
    }
}
