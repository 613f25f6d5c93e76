use std::collections::{HashSet, VecDeque};

use swipedeck_core::errors::StackError;
use swipedeck_core::types::{Candidate, CandidateId};

/// Ordered candidates; the front is the next one to be acted on.
///
/// Ids are unique at all times. Every mutation that could introduce a
/// duplicate checks first and leaves the stack untouched on failure.
#[derive(Debug, Clone, Default)]
pub struct CandidateStack {
    items: VecDeque<Candidate>,
}

impl CandidateStack {
    pub fn new(candidates: Vec<Candidate>) -> Result<Self, StackError> {
        let mut stack = Self::default();
        stack.replace_all(candidates)?;
        Ok(stack)
    }

    pub fn top(&self) -> Option<&Candidate> {
        self.items.front()
    }

    pub fn remove_top(&mut self) -> Result<Candidate, StackError> {
        self.items.pop_front().ok_or(StackError::Empty)
    }

    /// Take out the candidate with `id`, wherever it sits.
    pub fn remove(&mut self, id: &CandidateId) -> Option<Candidate> {
        let pos = self.items.iter().position(|c| &c.id == id)?;
        self.items.remove(pos)
    }

    /// Put a candidate back on top. Only undo does this.
    pub fn reinsert_front(&mut self, candidate: Candidate) -> Result<(), StackError> {
        if self.contains(&candidate.id) {
            return Err(StackError::Duplicate(candidate.id));
        }
        self.items.push_front(candidate);
        Ok(())
    }

    /// Swap in a whole new sequence, or nothing at all if it has duplicates.
    pub fn replace_all(&mut self, candidates: Vec<Candidate>) -> Result<(), StackError> {
        if let Some(dup) = first_duplicate(&candidates) {
            return Err(StackError::Duplicate(dup.clone()));
        }
        self.items = candidates.into();
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn contains(&self, id: &CandidateId) -> bool {
        self.items.iter().any(|c| &c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<CandidateId> {
        self.items.iter().map(|c| c.id.clone()).collect()
    }
}

fn first_duplicate(candidates: &[Candidate]) -> Option<&CandidateId> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .iter()
        .map(|c| &c.id)
        .find(|id| !seen.insert(*id))
}
