//! Hook transport: JSON event on stdin, JSON response on stdout.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::snapshot::snapshot_from_value;
use crate::core::types::{Decision, Snapshot};

/// Tool whose input carries a full todo list replacement.
pub const TODO_TOOL: &str = "TodoWrite";

/// Raw hook event as delivered by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,
    pub hook_event_name: String,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<Value>,
}

/// What the gate should do with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    /// A todo list submission to evaluate.
    TodoSubmission(Snapshot),
    /// A new session began; attempt counters start over.
    SessionStart,
    /// Any event the gate does not act on.
    Ignored,
}

/// Classify a hook payload.
pub fn parse_hook_input(raw: &str) -> Result<(HookInput, HookEvent)> {
    let input: HookInput = serde_json::from_str(raw).context("parse hook input")?;
    let event = match input.hook_event_name.as_str() {
        "SessionStart" => HookEvent::SessionStart,
        "PreToolUse" if input.tool_name.as_deref() == Some(TODO_TOOL) => {
            let tool_input = input
                .tool_input
                .clone()
                .context("TodoWrite hook is missing tool_input")?;
            let snapshot =
                snapshot_from_value(tool_input).context("parse TodoWrite tool_input.todos")?;
            HookEvent::TodoSubmission(snapshot)
        }
        _ => HookEvent::Ignored,
    };
    Ok((input, event))
}

/// Response written to stdout. An empty object lets the call through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HookOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl HookOutput {
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            decision: Some("block"),
            reason: Some(reason.into()),
        }
    }

    pub fn from_decision(decision: &Decision) -> Self {
        match decision.reason() {
            Some(reason) => Self::block(reason),
            None => Self::pass(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("serialize hook output")
    }
}
