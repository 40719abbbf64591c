//! Orchestration for one todo submission.
//!
//! Evaluates the submission against stored state, persists the ledger and
//! snapshots, and consults the judge when the policy passes the batch through.

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::core::diff::newly_completed;
use crate::core::policy::evaluate;
use crate::core::reason;
use crate::core::types::{BlockKind, Decision, EvaluationSummary, TodoItem};
use crate::io::judge::{Judge, JudgeRequest, Verdict};
use crate::io::ledger_store::{load_ledger, save_ledger};
use crate::io::snapshot_store::{baseline, commit};
use crate::io::store::KeyValueStore;

/// Per-call settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    /// Completion attempts allowed per item (compared before incrementing).
    pub max_retry_attempts: i64,
    /// Evaluate against stored state without writing anything or calling the judge.
    pub dry_run: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            max_retry_attempts: 5,
            dry_run: false,
        }
    }
}

/// Result of processing one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Final decision after judgment (if any).
    pub decision: Decision,
    /// Newly completed identities relative to the baseline snapshot.
    pub newly_completed: Vec<String>,
    /// Ledger changes made by the policy.
    pub summary: EvaluationSummary,
    /// Judge answer, when the judge was consulted.
    pub verdict: Option<Verdict>,
    /// Ledger entries removed after the judge approved.
    pub resolved: Vec<String>,
}

/// Process one submission end to end.
///
/// Snapshots are committed whatever the decision, so the next call diffs
/// against this submission. Store write failures abort with an error.
#[instrument(skip_all, fields(items = submission.len(), dry_run = options.dry_run))]
pub fn run_check<S: KeyValueStore, J: Judge>(
    store: &S,
    judge: &J,
    submission: &[TodoItem],
    options: &CheckOptions,
) -> Result<CheckOutcome> {
    let previous = baseline(store)?;
    let fresh = newly_completed(submission, previous.as_deref());
    debug!(
        baseline = previous.is_some(),
        newly_completed = fresh.len(),
        "diffed submission"
    );

    let mut ledger = load_ledger(store)?;
    let evaluation = evaluate(submission, &fresh, options.max_retry_attempts, &mut ledger);
    info!(
        decision = decision_label(&evaluation.decision),
        first_attempt = ?evaluation.summary.first_attempt,
        subsequent = ?evaluation.summary.subsequent,
        exceeded = ?evaluation.summary.exceeded,
        "policy evaluated"
    );

    if !options.dry_run {
        // Ledger first: if the commit then fails, the stale baseline makes the
        // retry diff the same completions again, and the recorded attempt sends
        // them to the judge instead of letting them through unchecked.
        save_ledger(store, &ledger)?;
        commit(store, submission)?;
    }

    let judge_items = match &evaluation.decision {
        Decision::Judge { items } => Some(items.clone()),
        Decision::Allow | Decision::Block { .. } => None,
    };
    let mut outcome = CheckOutcome {
        decision: evaluation.decision,
        newly_completed: fresh.iter().map(|item| item.content.clone()).collect(),
        summary: evaluation.summary,
        verdict: None,
        resolved: Vec::new(),
    };

    let Some(items) = judge_items else {
        return Ok(outcome);
    };
    if options.dry_run {
        debug!("dry run, judge not consulted");
        return Ok(outcome);
    }

    let verdict = judge
        .judge(&JudgeRequest {
            items: &items,
            previous: previous.as_deref(),
            current: submission,
        })
        .context("judge completion claims")?;

    if verdict.approve {
        outcome.resolved = ledger.resolve(items.iter().map(|item| item.content.as_str()));
        save_ledger(store, &ledger)?;
        info!(resolved = ?outcome.resolved, "judge approved completion");
        outcome.decision = Decision::Allow;
    } else {
        info!(reason = %verdict.reason, "judge rejected completion");
        outcome.decision = Decision::Block {
            kind: BlockKind::JudgeRejected,
            items: items.into_iter().map(|item| item.content).collect(),
            reason: reason::judge_rejected(&verdict.reason),
        };
    }
    outcome.verdict = Some(verdict);
    Ok(outcome)
}

fn decision_label(decision: &Decision) -> &'static str {
    match decision {
        Decision::Allow => "allow",
        Decision::Judge { .. } => "judge",
        Decision::Block {
            kind: BlockKind::ConfirmationRequired,
            ..
        } => "block:confirmation",
        Decision::Block {
            kind: BlockKind::RetryLimitExceeded,
            ..
        } => "block:retry_limit",
        Decision::Block {
            kind: BlockKind::JudgeRejected,
            ..
        } => "block:judge",
    }
}
