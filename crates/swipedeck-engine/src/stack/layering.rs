use serde::Serialize;
use swipedeck_core::types::CandidateId;

use super::candidate_stack::CandidateStack;

const TOP_SCALE: f64 = 1.0;
const SECOND_SCALE: f64 = 0.98;
const BACKGROUND_SCALE: f64 = 0.95;
const OFFSET_STEP: f64 = 10.0;

/// How one card in the visible pile should be drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardLayer {
    pub candidate: CandidateId,
    pub depth: usize,
    pub scale: f64,
    pub offset_y: f64,
    pub z_index: usize,
}

/// Scale and vertical offset for a card `depth` positions below the top.
pub fn layer_geometry(depth: usize) -> (f64, f64) {
    match depth {
        0 => (TOP_SCALE, 0.0),
        1 => (SECOND_SCALE, OFFSET_STEP),
        _ => (BACKGROUND_SCALE, OFFSET_STEP * 2.0),
    }
}

impl CandidateStack {
    /// The first `limit` cards with presentation geometry, top first.
    pub fn layers(&self, limit: usize) -> Vec<CardLayer> {
        let len = self.len();
        self.iter()
            .take(limit)
            .enumerate()
            .map(|(depth, c)| {
                let (scale, offset_y) = layer_geometry(depth);
                CardLayer {
                    candidate: c.id.clone(),
                    depth,
                    scale,
                    offset_y,
                    z_index: len - depth,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swipedeck_core::types::Candidate;

    #[test]
    fn top_two_cards_step_down_then_flatten() {
        let stack = CandidateStack::new(
            ["p1", "p2", "p3", "p4"]
                .iter()
                .map(|id| Candidate::new(*id, *id))
                .collect(),
        )
        .unwrap();

        let layers = stack.layers(3);
        assert_eq!(layers.len(), 3);
        assert_eq!((layers[0].scale, layers[0].offset_y), (1.0, 0.0));
        assert_eq!((layers[1].scale, layers[1].offset_y), (0.98, 10.0));
        assert_eq!((layers[2].scale, layers[2].offset_y), (0.95, 20.0));
        assert_eq!(layers[0].z_index, 4);
        assert!(layers.windows(2).all(|w| w[0].z_index > w[1].z_index));
    }

    #[test]
    fn empty_stack_has_no_layers() {
        assert!(CandidateStack::default().layers(3).is_empty());
    }
}
