//! Snapshot persistence sequencing.
//!
//! The current slot always holds the latest submission and the previous slot
//! the one before it. [`commit`] must capture the stored current snapshot
//! before overwriting it; reordering those writes loses the diff baseline.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::snapshot::{Parsed, parse_stored_snapshot};
use crate::core::types::{Snapshot, TodoItem};
use crate::io::store::{KeyValueStore, StoreKey};

/// Snapshot that preceded the submission being evaluated.
///
/// This is the stored current slot, read before the new submission is
/// committed. `None` if nothing usable was stored.
pub fn baseline<S: KeyValueStore>(store: &S) -> Result<Option<Snapshot>> {
    load_slot(store, StoreKey::CurrentTodos)
}

/// Snapshot held in the previous slot.
pub fn load_previous<S: KeyValueStore>(store: &S) -> Result<Option<Snapshot>> {
    load_slot(store, StoreKey::PreviousTodos)
}

/// Roll the stored current snapshot into the previous slot, then store `next`.
///
/// When nothing usable was stored, the previous slot is left untouched rather
/// than written as an empty list.
pub fn commit<S: KeyValueStore>(store: &S, next: &[TodoItem]) -> Result<()> {
    let raw_current = store.get(StoreKey::CurrentTodos)?;
    match parse_stored_snapshot(raw_current.as_deref()) {
        Parsed::Loaded(_) => {
            if let Some(raw) = raw_current.as_deref() {
                store
                    .set(StoreKey::PreviousTodos, raw)
                    .context("save previous todo snapshot")?;
            }
        }
        Parsed::Missing => debug!("no stored todo snapshot to roll into history"),
        Parsed::Malformed { error } => {
            warn!(%error, "stored todo snapshot is malformed, not rolling into history");
        }
    }

    let mut buf = serde_json::to_string_pretty(next).context("serialize todo snapshot")?;
    buf.push('\n');
    store
        .set(StoreKey::CurrentTodos, &buf)
        .context("save current todo snapshot")?;
    debug!(items = next.len(), "todo snapshot committed");
    Ok(())
}

fn load_slot<S: KeyValueStore>(store: &S, key: StoreKey) -> Result<Option<Snapshot>> {
    let raw = store.get(key)?;
    match parse_stored_snapshot(raw.as_deref()) {
        Parsed::Loaded(snapshot) => Ok(Some(snapshot)),
        Parsed::Missing => Ok(None),
        Parsed::Malformed { error } => {
            warn!(key = key.file_name(), %error, "stored todo snapshot is malformed, ignoring");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;
    use crate::test_support::{FailingStore, completed, pending};

    #[test]
    fn first_commit_skips_previous_slot() {
        let store = MemoryStore::new();
        commit(&store, &[pending("a")]).expect("commit");

        assert_eq!(store.get(StoreKey::PreviousTodos).expect("get"), None);
        assert_eq!(baseline(&store).expect("baseline"), Some(vec![pending("a")]));
    }

    #[test]
    fn commit_rolls_current_into_previous() {
        let store = MemoryStore::new();
        commit(&store, &[pending("a")]).expect("commit 1");
        commit(&store, &[completed("a")]).expect("commit 2");
        commit(&store, &[completed("a"), pending("b")]).expect("commit 3");

        assert_eq!(
            load_previous(&store).expect("previous"),
            Some(vec![completed("a")])
        );
        assert_eq!(
            baseline(&store).expect("baseline"),
            Some(vec![completed("a"), pending("b")])
        );
    }

    #[test]
    fn empty_list_is_a_valid_snapshot() {
        let store = MemoryStore::new();
        commit(&store, &[]).expect("commit 1");
        commit(&store, &[pending("a")]).expect("commit 2");
        assert_eq!(load_previous(&store).expect("previous"), Some(Vec::new()));
    }

    #[test]
    fn malformed_current_is_not_rolled_into_previous() {
        let store = MemoryStore::new()
            .with(StoreKey::CurrentTodos, "garbage")
            .with(StoreKey::PreviousTodos, "[]");
        assert_eq!(baseline(&store).expect("baseline"), None);

        commit(&store, &[pending("a")]).expect("commit");

        assert_eq!(
            store.get(StoreKey::PreviousTodos).expect("get").as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn write_failure_on_current_propagates() {
        let store = FailingStore::failing_on(StoreKey::CurrentTodos);
        let err = commit(&store, &[pending("a")]).expect_err("expected failure");
        assert!(format!("{err:#}").contains("save current todo snapshot"));
    }

    #[test]
    fn write_failure_on_previous_stops_before_current() {
        let store = FailingStore::failing_on(StoreKey::PreviousTodos);
        store
            .inner()
            .set(StoreKey::CurrentTodos, "[]")
            .expect("seed");

        assert!(commit(&store, &[pending("a")]).is_err());
        assert_eq!(
            store.inner().get(StoreKey::CurrentTodos).expect("get").as_deref(),
            Some("[]")
        );
    }
}
