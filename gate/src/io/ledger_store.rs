//! Attempt ledger persistence.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::ledger::AttemptLedger;
use crate::core::snapshot::Parsed;
use crate::io::store::{KeyValueStore, StoreKey};

/// Load the ledger. Missing or corrupt documents yield an empty ledger.
pub fn load_ledger<S: KeyValueStore>(store: &S) -> Result<AttemptLedger> {
    let raw = store.get(StoreKey::Attempts)?;
    let ledger = match AttemptLedger::parse(raw.as_deref()) {
        Parsed::Loaded(ledger) => ledger,
        Parsed::Missing => AttemptLedger::new(),
        Parsed::Malformed { error } => {
            warn!(%error, "attempt ledger is malformed, starting from empty");
            AttemptLedger::new()
        }
    };
    debug!(entries = ledger.len(), "attempt ledger loaded");
    Ok(ledger)
}

pub fn save_ledger<S: KeyValueStore>(store: &S, ledger: &AttemptLedger) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(ledger).context("serialize attempt ledger")?;
    buf.push('\n');
    store
        .set(StoreKey::Attempts, &buf)
        .context("save attempt ledger")
}

/// Wipe every counter (session boundary).
pub fn clear_ledger<S: KeyValueStore>(store: &S) -> Result<()> {
    debug!("clearing attempt ledger");
    store
        .delete(StoreKey::Attempts)
        .context("clear attempt ledger")
}
