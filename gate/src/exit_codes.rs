//! Stable exit codes for gate CLI commands.

/// Command succeeded, or the submission was let through.
pub const OK: i32 = 0;
/// Command failed due to invalid input/config/state or other errors.
pub const INVALID: i32 = 1;
/// `gate check` blocked the submission.
pub const BLOCKED: i32 = 2;
