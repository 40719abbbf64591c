//! Session lifecycle and manual ledger maintenance.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::core::ledger::AttemptLedger;
use crate::core::types::Snapshot;
use crate::io::ledger_store::{clear_ledger, load_ledger, save_ledger};
use crate::io::snapshot_store::{baseline, load_previous};
use crate::io::store::KeyValueStore;

/// Start a new session: every attempt counter is wiped.
pub fn reset_session<S: KeyValueStore>(store: &S) -> Result<()> {
    clear_ledger(store)?;
    info!("session reset, attempt ledger cleared");
    Ok(())
}

/// Mark items as accepted outside the hook flow and drop their counters.
///
/// Returns the identities that had an entry.
pub fn accept<S: KeyValueStore>(store: &S, identities: &[String]) -> Result<Vec<String>> {
    let mut ledger = load_ledger(store)?;
    let resolved = ledger.resolve(identities);
    if !resolved.is_empty() {
        save_ledger(store, &ledger)?;
    }
    info!(?resolved, "accepted completions");
    Ok(resolved)
}

/// Everything the gate currently remembers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub attempts: AttemptLedger,
    pub current: Option<Snapshot>,
    pub previous: Option<Snapshot>,
}

pub fn status<S: KeyValueStore>(store: &S) -> Result<StatusReport> {
    Ok(StatusReport {
        attempts: load_ledger(store)?,
        current: baseline(store)?,
        previous: load_previous(store)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::{MemoryStore, StoreKey};
    use crate::test_support::completed;

    #[test]
    fn reset_wipes_ledger_but_keeps_snapshots() {
        let store = MemoryStore::new()
            .with(StoreKey::Attempts, r#"{"a": 3}"#)
            .with(StoreKey::CurrentTodos, "[]");

        reset_session(&store).expect("reset");

        let report = status(&store).expect("status");
        assert!(report.attempts.is_empty());
        assert_eq!(report.current, Some(Vec::new()));
    }

    #[test]
    fn accept_removes_only_named_entries() {
        let store = MemoryStore::new().with(StoreKey::Attempts, r#"{"a": 3, "b": 1}"#);

        let resolved =
            accept(&store, &["a".to_string(), "zzz".to_string()]).expect("accept");

        assert_eq!(resolved, vec!["a".to_string()]);
        let ledger = load_ledger(&store).expect("ledger");
        assert_eq!(ledger.count("a"), 0);
        assert_eq!(ledger.count("b"), 1);
    }

    #[test]
    fn status_serializes_all_documents() {
        let store = MemoryStore::new()
            .with(StoreKey::Attempts, r#"{"a": 1}"#)
            .with(
                StoreKey::CurrentTodos,
                r#"[{"content": "a", "status": "completed"}]"#,
            );

        let report = status(&store).expect("status");
        assert_eq!(report.current, Some(vec![completed("a")]));
        assert_eq!(report.previous, None);
        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["attempts"]["a"], 1);
        assert!(json["previous"].is_null());
    }
}
