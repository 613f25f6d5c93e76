use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use swipedeck_core::config::MatchPolicy;
use swipedeck_core::traits::RandomSource;
use swipedeck_core::types::{Candidate, CandidateId, Decision, DecisionKind};

/// A decision as it was committed, with the match roll made for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedDecision {
    pub decision: Decision,
    pub matched: bool,
}

/// Decided candidates partitioned by kind, in decision order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionBuckets {
    pub approved: Vec<Candidate>,
    pub rejected: Vec<Candidate>,
    pub strongly_approved: Vec<Candidate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub approved: usize,
    pub rejected: usize,
    pub strongly_approved: usize,
}

/// One row of the matches summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchEntry {
    pub candidate: Candidate,
    pub strong: bool,
}

impl DecisionBuckets {
    pub fn bucket(&self, kind: DecisionKind) -> &[Candidate] {
        match kind {
            DecisionKind::Approve => &self.approved,
            DecisionKind::Reject => &self.rejected,
            DecisionKind::StrongApprove => &self.strongly_approved,
        }
    }

    fn bucket_mut(&mut self, kind: DecisionKind) -> &mut Vec<Candidate> {
        match kind {
            DecisionKind::Approve => &mut self.approved,
            DecisionKind::Reject => &mut self.rejected,
            DecisionKind::StrongApprove => &mut self.strongly_approved,
        }
    }

    pub fn contains(&self, kind: DecisionKind, id: &CandidateId) -> bool {
        self.bucket(kind).iter().any(|c| &c.id == id)
    }

    pub fn counts(&self) -> BucketCounts {
        BucketCounts {
            approved: self.approved.len(),
            rejected: self.rejected.len(),
            strongly_approved: self.strongly_approved.len(),
        }
    }
}

/// Append-only decision log plus the per-kind buckets and match roll.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    policy: MatchPolicy,
    log: Vec<Decision>,
    buckets: DecisionBuckets,
    next_seq: u64,
}

impl DecisionEngine {
    pub fn new(policy: MatchPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Record a decision and roll for a match.
    ///
    /// Reject never draws from `rng`, so the draw sequence depends only on
    /// the positive decisions made.
    pub fn record(
        &mut self,
        candidate: &Candidate,
        kind: DecisionKind,
        at: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> RecordedDecision {
        self.next_seq += 1;
        let decision = Decision {
            seq: self.next_seq,
            candidate_id: candidate.id.clone(),
            kind,
            at,
        };
        self.log.push(decision.clone());
        self.buckets.bucket_mut(kind).push(candidate.clone());

        let matched = match self.policy.chance(kind) {
            Some(chance) => rng.next_unit() < chance.value(),
            None => false,
        };
        debug!(candidate = %candidate.id, %kind, seq = decision.seq, matched, "decision recorded");

        RecordedDecision { decision, matched }
    }

    /// Drop the most recent decision for `id`. Absent ids are a no-op.
    pub fn reverse(&mut self, id: &CandidateId) -> Option<Decision> {
        let idx = self.log.iter().rposition(|d| &d.candidate_id == id)?;
        let decision = self.log.remove(idx);
        let bucket = self.buckets.bucket_mut(decision.kind);
        if let Some(pos) = bucket.iter().rposition(|c| &c.id == id) {
            bucket.remove(pos);
        }
        debug!(candidate = %id, kind = %decision.kind, seq = decision.seq, "decision reversed");
        Some(decision)
    }

    pub fn buckets(&self) -> &DecisionBuckets {
        &self.buckets
    }

    pub fn snapshot(&self) -> DecisionBuckets {
        self.buckets.clone()
    }

    pub fn log(&self) -> &[Decision] {
        &self.log
    }

    pub fn counts(&self) -> BucketCounts {
        self.buckets.counts()
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Approved then strongly approved candidates, flagged by strength.
    pub fn matches_summary(&self) -> Vec<MatchEntry> {
        let approved = self.buckets.approved.iter().map(|c| MatchEntry {
            candidate: c.clone(),
            strong: false,
        });
        let strong = self.buckets.strongly_approved.iter().map(|c| MatchEntry {
            candidate: c.clone(),
            strong: true,
        });
        approved.chain(strong).collect()
    }
}
