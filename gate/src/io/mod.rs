//! I/O helpers for gate commands.

pub mod config;
pub mod hook;
pub mod judge;
pub mod ledger_store;
pub mod process;
pub mod snapshot_store;
pub mod store;
