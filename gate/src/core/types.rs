//! Shared deterministic types for the completion gate.
//!
//! These types define stable contracts between core components. They carry no
//! I/O and serialize to the same JSON across runs.

use serde::{Deserialize, Serialize};

/// Status of a single todo item as declared by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

/// One todo entry. `content` is the identity used across snapshots.
///
/// Unknown fields (`id`, `priority`, `activeForm`, ...) are dropped on parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub content: String,
    pub status: TodoStatus,
}

impl TodoItem {
    pub fn new(content: impl Into<String>, status: TodoStatus) -> Self {
        Self {
            content: content.into(),
            status,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TodoStatus::Completed
    }
}

/// One full submission of the todo list, in agent order.
pub type Snapshot = Vec<TodoItem>;

/// Why a batch was blocked.
///
/// Callers may match on the kind (or on the reason prefix) to tell the
/// confirmation request apart from a hard retry ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// First completion attempt for at least one item.
    ConfirmationRequired,
    /// At least one completed item reached `max_retry_attempts`.
    RetryLimitExceeded,
    /// The external judge rejected the completion claim.
    JudgeRejected,
}

/// Aggregate outcome for a whole submission.
///
/// There is exactly one decision per batch; items are never partially blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Nothing newly completed needs review.
    Allow,
    /// Pass-through that must be confirmed by the external judge.
    Judge { items: Vec<TodoItem> },
    /// Blocked with an actionable reason naming every implicated item.
    Block {
        kind: BlockKind,
        items: Vec<String>,
        reason: String,
    },
}

impl Decision {
    pub fn is_blocking(&self) -> bool {
        matches!(self, Decision::Block { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Decision::Block { reason, .. } => Some(reason),
            Decision::Allow | Decision::Judge { .. } => None,
        }
    }
}

/// Ledger bookkeeping produced by one policy evaluation.
///
/// Lists follow submission order so log output matches what the agent sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationSummary {
    /// Identities whose counters were reset because they are not completed.
    pub reset: Vec<String>,
    /// Identities that reached the retry ceiling.
    pub exceeded: Vec<String>,
    /// Newly completed identities with no prior attempts.
    pub first_attempt: Vec<String>,
    /// Newly completed identities with prior attempts.
    pub subsequent: Vec<String>,
    /// Identities whose counters were incremented.
    pub incremented: Vec<String>,
}

/// Decision plus the ledger changes that led to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: Decision,
    pub summary: EvaluationSummary,
}
