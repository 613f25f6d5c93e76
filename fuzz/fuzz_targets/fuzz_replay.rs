#![no_main]
use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;

use swipedeck_core::config::EngineConfig;
use swipedeck_core::types::Candidate;
use swipedeck_engine::replay::{run, Script, Step};

fuzz_target!(|data: &[u8]| {
    let Ok(mut script) = serde_json::from_slice::<Script>(data) else {
        return;
    };
    // let a trailing exit timer fire so every decided card has left
    script.steps.push(Step::Wait { ms: 300 });
    let roster: Vec<Candidate> = ["a", "b", "c", "d"]
        .iter()
        .map(|id| Candidate::new(*id, *id))
        .collect();
    let report = run(roster, &script, &EngineConfig::default(), 0)
        .expect("a valid roster never fails a replay");

    let unique: HashSet<_> = report.stack.iter().collect();
    assert_eq!(unique.len(), report.stack.len());
    assert!(report.stack.len() <= 4);

    // a refresh puts decided candidates back on purpose
    if script.steps.iter().any(|s| matches!(s, Step::Refresh { .. })) {
        return;
    }
    let buckets = &report.buckets;
    for id in &report.stack {
        let decided = buckets
            .approved
            .iter()
            .chain(&buckets.rejected)
            .chain(&buckets.strongly_approved)
            .any(|c| &c.id == id);
        assert!(!decided, "{id} is still stacked after being decided");
    }
});
