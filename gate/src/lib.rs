//! Completion-claim gate for agent-maintained todo lists.
//!
//! An agent periodically replaces its whole todo list. For every item that
//! moves into `completed`, the gate decides whether to let the claim through,
//! ask for confirmation first, or refuse it after too many attempts.
//!
//! - **[`core`]**: Pure, deterministic logic (snapshot diff, attempt ledger,
//!   policy, reason wording). No I/O.
//! - **[`io`]**: Side effects (state store, config, judge process, hook
//!   transport). Isolated behind traits so tests run in memory.
//!
//! Orchestration modules ([`check`], [`session`]) coordinate core logic with
//! I/O to implement CLI commands.

pub mod check;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
