//! Block reason wording.
//!
//! Reasons quote every implicated identity verbatim. The leading phrase is
//! stable so hosts can tell the block kinds apart by text alone.

pub const CONFIRMATION_PREFIX: &str = "Confirmation required";
pub const RETRY_LIMIT_PREFIX: &str = "Retry limit exceeded";
pub const JUDGE_REJECTED_PREFIX: &str = "Completion rejected";

pub fn confirmation_required(items: &[String]) -> String {
    match items {
        [single] => format!(
            "{CONFIRMATION_PREFIX} before marking {} as completed. \
             Verify the work is actually done, then submit the todo list again.",
            quote(single)
        ),
        _ => format!(
            "{CONFIRMATION_PREFIX} before marking {} todos as completed: {}. \
             Verify the work is actually done, then submit the todo list again.",
            items.len(),
            quote_all(items)
        ),
    }
}

pub fn retry_limit_exceeded(items: &[String], max_retry_attempts: i64) -> String {
    match items {
        [single] => format!(
            "{RETRY_LIMIT_PREFIX}: {} reached the limit of {max_retry_attempts} completion attempts \
             without being accepted. Stop retrying and ask the user how to proceed.",
            quote(single)
        ),
        _ => format!(
            "{RETRY_LIMIT_PREFIX}: {} each reached the limit of {max_retry_attempts} completion attempts \
             without being accepted. Stop retrying and ask the user how to proceed.",
            quote_all(items)
        ),
    }
}

pub fn judge_rejected(judge_reason: &str) -> String {
    let judge_reason = judge_reason.trim();
    if judge_reason.is_empty() {
        return format!("{JUDGE_REJECTED_PREFIX}: the reviewer did not accept the claimed work.");
    }
    format!("{JUDGE_REJECTED_PREFIX}: {judge_reason}")
}

fn quote(identity: &str) -> String {
    format!("\"{identity}\"")
}

fn quote_all(items: &[String]) -> String {
    items
        .iter()
        .map(|item| quote(item))
        .collect::<Vec<_>>()
        .join(", ")
}
