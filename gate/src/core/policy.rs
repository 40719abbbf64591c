//! Attempt policy: turns a submission plus ledger state into one decision.
//!
//! Evaluation order is fixed:
//! 1. reset counters of items that are no longer completed,
//! 2. block the whole batch if any completed item reached the ceiling,
//! 3. split newly completed items into first and subsequent attempts,
//! 4. count an attempt for every completed item,
//! 5. block first attempts, send subsequent attempts to the judge, else allow.

use std::collections::HashSet;

use crate::core::ledger::AttemptLedger;
use crate::core::reason;
use crate::core::types::{BlockKind, Decision, Evaluation, EvaluationSummary, TodoItem};

/// Evaluate one submission and update `ledger` in place.
///
/// `current` is the full submitted batch; `newly_completed` is the diff
/// against the baseline snapshot. `max_retry_attempts` is compared before
/// incrementing, so attempts `1..=max` pass and attempt `max + 1` blocks.
/// Values `<= 0` block every completed item; no value panics.
pub fn evaluate(
    current: &[TodoItem],
    newly_completed: &[TodoItem],
    max_retry_attempts: i64,
    ledger: &mut AttemptLedger,
) -> Evaluation {
    let batch = first_occurrences(current);
    let mut summary = EvaluationSummary::default();

    for item in batch.iter().filter(|item| !item.is_completed()) {
        if ledger.count(&item.content) > 0 {
            summary.reset.push(item.content.clone());
        }
        ledger.reset(&item.content);
    }

    let completed: Vec<&TodoItem> = batch.iter().copied().filter(|i| i.is_completed()).collect();

    summary.exceeded = completed
        .iter()
        .filter(|item| i64::from(ledger.count(&item.content)) >= max_retry_attempts)
        .map(|item| item.content.clone())
        .collect();
    if !summary.exceeded.is_empty() {
        let decision = Decision::Block {
            kind: BlockKind::RetryLimitExceeded,
            reason: reason::retry_limit_exceeded(&summary.exceeded, max_retry_attempts),
            items: summary.exceeded.clone(),
        };
        return Evaluation { decision, summary };
    }

    let completed_ids: HashSet<&str> = completed
        .iter()
        .map(|item| item.content.as_str())
        .collect();
    let mut subsequent_items = Vec::new();
    for item in first_occurrences(newly_completed) {
        if !item.is_completed() || !completed_ids.contains(item.content.as_str()) {
            continue;
        }
        if ledger.count(&item.content) == 0 {
            summary.first_attempt.push(item.content.clone());
        } else {
            summary.subsequent.push(item.content.clone());
            subsequent_items.push(item.clone());
        }
    }

    for item in &completed {
        ledger.increment(&item.content);
        summary.incremented.push(item.content.clone());
    }

    let decision = if !summary.first_attempt.is_empty() {
        Decision::Block {
            kind: BlockKind::ConfirmationRequired,
            reason: reason::confirmation_required(&summary.first_attempt),
            items: summary.first_attempt.clone(),
        }
    } else if !subsequent_items.is_empty() {
        Decision::Judge {
            items: subsequent_items,
        }
    } else {
        Decision::Allow
    };

    Evaluation { decision, summary }
}

/// Keep the first item per identity; later duplicates are ignored.
fn first_occurrences(items: &[TodoItem]) -> Vec<&TodoItem> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.content.as_str()))
        .collect()
}
