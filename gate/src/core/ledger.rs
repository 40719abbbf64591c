//! Per-identity completion attempt counters.
//!
//! The ledger is advisory: a corrupt stored document degrades to an empty
//! ledger, which makes every completion look like a first attempt.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::snapshot::Parsed;

/// Mapping from todo identity to completion attempt count.
///
/// Absent identities count as zero. Keys are sorted so the persisted form is
/// stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptLedger {
    attempts: BTreeMap<String, u32>,
}

impl AttemptLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a stored ledger, keeping the missing/corrupt cases explicit.
    pub fn parse(raw: Option<&str>) -> Parsed<Self> {
        Parsed::from_json(raw)
    }

    pub fn count(&self, identity: &str) -> u32 {
        self.attempts.get(identity).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, identity: &str) {
        let count = self.attempts.entry(identity.to_string()).or_insert(0);
        *count = count.saturating_add(1);
    }

    pub fn reset(&mut self, identity: &str) {
        self.attempts.remove(identity);
    }

    pub fn reset_many<I, S>(&mut self, identities: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for identity in identities {
            self.reset(identity.as_ref());
        }
    }

    /// Drop entries for items an external judge accepted.
    ///
    /// Same effect as [`Self::reset_many`]; returns the identities that
    /// actually had an entry.
    pub fn resolve<I, S>(&mut self, identities: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        identities
            .into_iter()
            .filter_map(|identity| {
                let identity = identity.as_ref();
                self.attempts
                    .remove(identity)
                    .map(|_| identity.to_string())
            })
            .collect()
    }

    pub fn clear_all(&mut self) {
        self.attempts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.attempts
            .iter()
            .map(|(identity, count)| (identity.as_str(), *count))
    }
}
