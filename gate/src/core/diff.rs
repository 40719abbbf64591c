//! Completion diff between consecutive snapshots.

use std::collections::HashSet;

use crate::core::snapshot::find_item;
use crate::core::types::TodoItem;

/// Items completed in `current` that were not completed in `previous`.
///
/// `None` means no snapshot was ever stored and is treated as empty. The
/// result keeps `current` order. Within either snapshot the first item with a
/// given identity is the one that counts.
pub fn newly_completed(current: &[TodoItem], previous: Option<&[TodoItem]>) -> Vec<TodoItem> {
    let previous = previous.unwrap_or(&[]);
    let mut seen = HashSet::new();
    current
        .iter()
        .filter(|item| seen.insert(item.content.as_str()))
        .filter(|item| item.is_completed())
        .filter(|item| {
            !find_item(previous, &item.content).is_some_and(|prev| prev.is_completed())
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{completed as done, in_progress, pending};

    fn contents(items: &[TodoItem]) -> Vec<&str> {
        items.iter().map(|item| item.content.as_str()).collect()
    }

    #[test]
    fn same_snapshot_has_no_new_completions() {
        let snapshot = vec![done("a"), pending("b"), done("c")];
        assert!(newly_completed(&snapshot, Some(&snapshot)).is_empty());
    }

    #[test]
    fn missing_previous_treats_every_completion_as_new() {
        let snapshot = vec![done("a"), pending("b"), done("c")];
        let fresh = newly_completed(&snapshot, None);
        assert_eq!(contents(&fresh), vec!["a", "c"]);
        assert_eq!(fresh, newly_completed(&snapshot, Some(&[])));
    }

    #[test]
    fn status_transition_into_completed_is_new() {
        let previous = vec![pending("a"), in_progress("b"), done("c")];
        let current = vec![done("a"), done("b"), done("c"), done("d")];
        let fresh = newly_completed(&current, Some(&previous));
        assert_eq!(contents(&fresh), vec!["a", "b", "d"]);
    }

    #[test]
    fn keeps_current_order() {
        let previous = vec![pending("x"), pending("y")];
        let current = vec![done("y"), done("x")];
        assert_eq!(
            contents(&newly_completed(&current, Some(&previous))),
            vec!["y", "x"]
        );
    }

    #[test]
    fn duplicate_identity_in_current_uses_first_match() {
        let current = vec![pending("dup"), done("dup"), done("x"), pending("x")];
        assert_eq!(contents(&newly_completed(&current, None)), vec!["x"]);
    }

    #[test]
    fn duplicate_identity_in_previous_uses_first_match() {
        let previous = vec![pending("dup"), done("dup")];
        let current = vec![done("dup")];
        assert_eq!(
            contents(&newly_completed(&current, Some(&previous))),
            vec!["dup"]
        );
    }
}
