use crate::types::CandidateId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    #[error("candidate stack is empty")]
    Empty,
    #[error("duplicate candidate id: {0}")]
    Duplicate(CandidateId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UndoError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error(transparent)]
    Stack(#[from] StackError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Stack(#[from] StackError),
    #[error(transparent)]
    Undo(#[from] UndoError),
    #[error("candidate {0} is still leaving the stack")]
    ExitPending(CandidateId),
}

impl SessionError {
    /// True for refusals the UI is expected to race into and swallow.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            SessionError::Undo(UndoError::NothingToUndo)
                | SessionError::ExitPending(_)
                | SessionError::Stack(StackError::Empty)
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("threshold {name} must be finite and positive, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
    #[error("commit threshold {commit} must not be below preview threshold {preview}")]
    ThresholdOrder {
        preview: &'static str,
        commit: &'static str,
    },
    #[error("undo window must be positive")]
    ZeroUndoWindow,
}

/// Structured roster check result for `deck check --json`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RosterReport {
    pub file: String,
    pub candidates: usize,
    pub pass: bool,
    pub errors: Vec<RosterIssue>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RosterIssue {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<CandidateId>,
}
