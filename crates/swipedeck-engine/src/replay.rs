use anyhow::{Context, Result};
use chrono::Duration;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use swipedeck_core::config::EngineConfig;
use swipedeck_core::errors::SessionError;
use swipedeck_core::traits::SessionEvent;
use swipedeck_core::types::{Candidate, CandidateId, DecisionKind, DragVector};

use crate::decision::{DecisionBuckets, MatchEntry, SeededRandom};
use crate::session::{ManualScheduler, Session};

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// In-progress drag samples; previews only.
    Drag { samples: Vec<[f64; 2]> },
    Release { dx: f64, dy: f64 },
    /// A single drag sample followed by a release at the same point.
    Swipe { dx: f64, dy: f64 },
    /// Button press.
    Decide { kind: DecisionKind },
    Undo,
    Wait { ms: u64 },
    /// Reload the starting roster, optionally in a seeded random order.
    Refresh {
        #[serde(default)]
        shuffle: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub steps: Vec<Step>,
}

/// A step the session declined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefusedStep {
    pub step: usize,
    pub reason: String,
}

/// Final state after a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub stack: Vec<CandidateId>,
    pub buckets: DecisionBuckets,
    /// Candidates whose match roll succeeded, in announcement order. Undo
    /// does not take a match back.
    pub matches: Vec<CandidateId>,
    pub summary: Vec<MatchEntry>,
    pub can_undo: bool,
    pub events: Vec<SessionEvent>,
    pub refused: Vec<RefusedStep>,
}

pub fn load_script(path: &str) -> Result<Script> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read script {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("{path}: invalid script"))
}

/// Run `script` against a fresh session over `roster`.
///
/// Benign refusals (nothing to undo, exit pending, empty stack) are recorded
/// in the report and the replay continues. Any other session error stops it.
pub fn run(
    roster: Vec<Candidate>,
    script: &Script,
    config: &EngineConfig,
    seed: u64,
) -> Result<ReplayReport, SessionError> {
    let mut session = Session::new(
        roster.clone(),
        config.clone(),
        SeededRandom::new(seed),
        ManualScheduler::default(),
        Vec::new(),
    )?;
    let mut shuffler = StdRng::seed_from_u64(seed.rotate_left(32));
    let mut matches = Vec::new();
    let mut refused = Vec::new();

    for (idx, step) in script.steps.iter().enumerate() {
        let outcome = match step {
            Step::Drag { samples } => {
                for [dx, dy] in samples {
                    session.drag(DragVector::new(*dx, *dy));
                }
                Ok(None)
            }
            Step::Release { dx, dy } => session.release(DragVector::new(*dx, *dy)),
            Step::Swipe { dx, dy } => {
                let drag = DragVector::new(*dx, *dy);
                session.drag(drag);
                session.release(drag)
            }
            Step::Decide { kind } => session.decide(*kind).map(Some),
            Step::Undo => session.undo().map(|_| None),
            Step::Wait { ms } => {
                session.advance(Duration::milliseconds(
                    i64::try_from(*ms).unwrap_or(i64::MAX),
                ));
                Ok(None)
            }
            Step::Refresh { shuffle } => {
                let mut fresh = roster.clone();
                if *shuffle {
                    fresh.shuffle(&mut shuffler);
                }
                session.refresh(fresh).map(|_| None)
            }
        };

        match outcome {
            Ok(Some(recorded)) if recorded.matched => {
                info!(candidate = %recorded.decision.candidate_id, "match");
                matches.push(recorded.decision.candidate_id);
            }
            Ok(_) => {}
            Err(err) if err.is_benign() => {
                warn!(step = idx, %err, "step refused");
                refused.push(RefusedStep {
                    step: idx,
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(ReplayReport {
        stack: session.stack().ids(),
        buckets: session.decisions().snapshot(),
        matches,
        summary: session.decisions().matches_summary(),
        can_undo: session.can_undo(),
        events: session.into_sink(),
        refused,
    })
}
