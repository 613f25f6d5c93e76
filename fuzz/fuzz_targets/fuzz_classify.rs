#![no_main]
use libfuzzer_sys::fuzz_target;

use swipedeck_core::types::{Commitment, DecisionKind, DragVector};
use swipedeck_engine::gesture::GestureClassifier;

fuzz_target!(|data: &[u8]| {
    if data.len() < 16 {
        return;
    }
    let dx = f64::from_le_bytes(data[0..8].try_into().unwrap());
    let dy = f64::from_le_bytes(data[8..16].try_into().unwrap());
    let drag = DragVector::new(dx, dy);
    let classifier = GestureClassifier::default();
    let _ = classifier.preview(drag);
    match classifier.commit(drag) {
        Commitment::Commit(DecisionKind::Approve) => assert!(dx > 0.0),
        Commitment::Commit(DecisionKind::Reject) => assert!(dx < 0.0),
        Commitment::Commit(DecisionKind::StrongApprove) => assert!(dy < 0.0),
        Commitment::SnapBack => {}
    }
});
