//! Deterministic, pure logic for the completion gate.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! snapshots and ledgers and return deterministic outputs suitable for tests.

pub mod diff;
pub mod ledger;
pub mod policy;
pub mod reason;
pub mod snapshot;
pub mod types;
