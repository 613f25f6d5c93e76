use swipedeck_core::config::GestureThresholds;
use swipedeck_core::types::{Commitment, DecisionKind, DragVector, Preview};

/// Maps drag vectors to previews and commitments.
///
/// Horizontal displacement is checked first in both phases, so a drag that
/// clears the horizontal threshold is approve/reject no matter how far up it
/// also went. Commit thresholds sit above preview thresholds: feedback shows
/// well before a release would act on it.
///
/// Comparisons are strict; NaN components never cross a threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureClassifier {
    thresholds: GestureThresholds,
}

impl GestureClassifier {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    /// Classify an in-progress drag sample. No side effects.
    pub fn preview(&self, drag: DragVector) -> Preview {
        let t = &self.thresholds;
        match classify(drag, t.preview_horizontal, t.preview_vertical) {
            Some(kind) => Preview::Leaning(kind),
            None => Preview::Neutral,
        }
    }

    /// Classify the final drag vector at release.
    pub fn commit(&self, drag: DragVector) -> Commitment {
        let t = &self.thresholds;
        match classify(drag, t.commit_horizontal, t.commit_vertical) {
            Some(kind) => Commitment::Commit(kind),
            None => Commitment::SnapBack,
        }
    }
}

fn classify(drag: DragVector, horizontal: f64, vertical: f64) -> Option<DecisionKind> {
    if drag.dx.abs() > horizontal {
        if drag.dx > 0.0 {
            Some(DecisionKind::Approve)
        } else {
            Some(DecisionKind::Reject)
        }
    } else if drag.dy < -vertical {
        Some(DecisionKind::StrongApprove)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> GestureClassifier {
        GestureClassifier::default()
    }

    fn commit(dx: f64, dy: f64) -> Commitment {
        classifier().commit(DragVector::new(dx, dy))
    }

    fn preview(dx: f64, dy: f64) -> Preview {
        classifier().preview(DragVector::new(dx, dy))
    }

    const DY_SWEEP: [f64; 9] = [-1000.0, -200.0, -121.0, -120.0, -80.0, 0.0, 50.0, 300.0, 1e6];

    #[test]
    fn wide_horizontal_commits_regardless_of_dy() {
        for dy in DY_SWEEP {
            for dx in [100.5, 101.0, 150.0, 999.0] {
                assert_eq!(
                    commit(dx, dy),
                    Commitment::Commit(DecisionKind::Approve),
                    "dx={dx} dy={dy}"
                );
                assert_eq!(
                    commit(-dx, dy),
                    Commitment::Commit(DecisionKind::Reject),
                    "dx={} dy={dy}",
                    -dx
                );
            }
        }
    }

    #[test]
    fn upward_within_horizontal_band_strong_approves() {
        for dx in [-100.0, -60.0, 0.0, 10.0, 99.9, 100.0] {
            for dy in [-120.5, -121.0, -200.0, -5000.0] {
                assert_eq!(
                    commit(dx, dy),
                    Commitment::Commit(DecisionKind::StrongApprove),
                    "dx={dx} dy={dy}"
                );
            }
        }
    }

    #[test]
    fn short_drags_snap_back() {
        for dx in [-100.0, -50.0, 0.0, 60.0, 100.0] {
            for dy in [-120.0, -90.0, 0.0, 500.0] {
                assert_eq!(commit(dx, dy), Commitment::SnapBack, "dx={dx} dy={dy}");
            }
        }
    }

    #[test]
    fn horizontal_priority_over_vertical() {
        assert_eq!(commit(150.0, -500.0), Commitment::Commit(DecisionKind::Approve));
        assert_eq!(commit(-150.0, -500.0), Commitment::Commit(DecisionKind::Reject));
        assert_eq!(
            preview(60.0, -500.0),
            Preview::Leaning(DecisionKind::Approve)
        );
    }

    #[test]
    fn preview_neutral_inside_thresholds() {
        for dx in [-50.0, -10.0, 0.0, 25.0, 50.0] {
            for dy in [-80.0, -40.0, 0.0, 300.0] {
                assert_eq!(preview(dx, dy), Preview::Neutral, "dx={dx} dy={dy}");
            }
        }
    }

    #[test]
    fn preview_flips_before_commit() {
        // Preview leans, but release at the same point does nothing.
        assert_eq!(preview(51.0, 0.0), Preview::Leaning(DecisionKind::Approve));
        assert_eq!(commit(51.0, 0.0), Commitment::SnapBack);
        assert_eq!(preview(-51.0, 0.0), Preview::Leaning(DecisionKind::Reject));
        assert_eq!(commit(-51.0, 0.0), Commitment::SnapBack);
        assert_eq!(
            preview(0.0, -81.0),
            Preview::Leaning(DecisionKind::StrongApprove)
        );
        assert_eq!(commit(0.0, -81.0), Commitment::SnapBack);
    }

    #[test]
    fn short_diagonal_drag_previews_but_snaps_back() {
        assert_eq!(commit(60.0, -90.0), Commitment::SnapBack);
        assert_eq!(preview(60.0, -90.0), Preview::Leaning(DecisionKind::Approve));
    }

    #[test]
    fn nan_component_never_crosses_threshold() {
        assert_eq!(commit(f64::NAN, f64::NAN), Commitment::SnapBack);
        assert_eq!(preview(f64::NAN, -500.0), Preview::Leaning(DecisionKind::StrongApprove));
        assert_eq!(commit(f64::NAN, 0.0), Commitment::SnapBack);
    }

    #[test]
    fn custom_thresholds_apply() {
        let c = GestureClassifier::new(GestureThresholds {
            preview_horizontal: 10.0,
            preview_vertical: 10.0,
            commit_horizontal: 20.0,
            commit_vertical: 20.0,
        });
        assert_eq!(
            c.commit(DragVector::new(21.0, 0.0)),
            Commitment::Commit(DecisionKind::Approve)
        );
        assert_eq!(
            c.commit(DragVector::new(0.0, -21.0)),
            Commitment::Commit(DecisionKind::StrongApprove)
        );
    }
}
