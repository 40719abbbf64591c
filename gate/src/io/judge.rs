//! External judgment of completion claims.
//!
//! The [`Judge`] trait decouples orchestration from the reviewer backend.
//! [`CommandJudge`] pipes a rendered prompt to a configured command; tests use
//! scripted judges that return fixed verdicts without spawning processes.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::core::types::TodoItem;
use crate::io::config::JudgeConfig;
use crate::io::process::{ProcessLimits, run_with_input};

const JUDGE_TEMPLATE: &str = include_str!("prompts/judge.md");

/// Claimed items plus the snapshots around them.
#[derive(Debug, Clone, Copy)]
pub struct JudgeRequest<'a> {
    /// Newly completed items that already had failed attempts.
    pub items: &'a [TodoItem],
    pub previous: Option<&'a [TodoItem]>,
    pub current: &'a [TodoItem],
}

/// Reviewer answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub approve: bool,
    #[serde(default)]
    pub reason: String,
}

impl Verdict {
    pub fn approve(reason: impl Into<String>) -> Self {
        Self {
            approve: true,
            reason: reason.into(),
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            approve: false,
            reason: reason.into(),
        }
    }
}

pub trait Judge {
    fn judge(&self, request: &JudgeRequest<'_>) -> Result<Verdict>;
}

/// Approves every claim. Used when no judge command is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproveAll;

impl Judge for ApproveAll {
    fn judge(&self, request: &JudgeRequest<'_>) -> Result<Verdict> {
        debug!(items = request.items.len(), "no judge configured, approving");
        Ok(Verdict::approve("no judge configured"))
    }
}

/// Runs a reviewer command: prompt on stdin, JSON verdict on stdout.
#[derive(Debug, Clone)]
pub struct CommandJudge {
    command: Vec<String>,
    limits: ProcessLimits,
}

impl CommandJudge {
    pub fn new(command: Vec<String>, timeout: Duration, output_limit_bytes: usize) -> Self {
        Self {
            command,
            limits: ProcessLimits {
                timeout,
                output_limit_bytes,
            },
        }
    }

    pub fn from_config(cfg: &JudgeConfig) -> Self {
        Self::new(
            cfg.command.clone(),
            Duration::from_secs(cfg.timeout_secs),
            cfg.output_limit_bytes,
        )
    }
}

impl Judge for CommandJudge {
    #[instrument(skip_all, fields(items = request.items.len()))]
    fn judge(&self, request: &JudgeRequest<'_>) -> Result<Verdict> {
        let program = self
            .command
            .first()
            .ok_or_else(|| anyhow!("judge command is empty"))?;
        let prompt = render_prompt(request)?;

        info!(program = %program, "invoking judge");
        let output = run_with_input(&self.command, &prompt, self.limits)
            .with_context(|| format!("run judge {program}"))?;

        if output.timed_out {
            bail!("judge timed out after {}s", self.limits.timeout.as_secs());
        }
        if !output.status.success() {
            bail!(
                "judge exited with {:?}: {}",
                output.status.code(),
                output.stderr.text().trim()
            );
        }

        let verdict = parse_verdict(&output.stdout.text())?;
        debug!(approve = verdict.approve, "judge verdict");
        Ok(verdict)
    }
}

/// Build the judge for a config: a command when one is set, else [`ApproveAll`].
pub fn judge_from_config(cfg: &JudgeConfig) -> Box<dyn Judge> {
    if cfg.command.is_empty() {
        Box::new(ApproveAll)
    } else {
        Box::new(CommandJudge::from_config(cfg))
    }
}

impl<J: Judge + ?Sized> Judge for Box<J> {
    fn judge(&self, request: &JudgeRequest<'_>) -> Result<Verdict> {
        (**self).judge(request)
    }
}

pub fn render_prompt(request: &JudgeRequest<'_>) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("judge", JUDGE_TEMPLATE)
        .context("load judge template")?;
    let template = env.get_template("judge")?;
    let claimed: Vec<&str> = request
        .items
        .iter()
        .map(|item| item.content.as_str())
        .collect();
    let rendered = template
        .render(context! {
            claimed => claimed,
            previous => request.previous,
            current => request.current,
        })
        .context("render judge prompt")?;
    Ok(rendered)
}

/// Parse the verdict from judge stdout.
///
/// Accepts a bare JSON object, or falls back to the last line that is one so
/// reviewers may print chatter before the answer.
pub fn parse_verdict(stdout: &str) -> Result<Verdict> {
    let trimmed = stdout.trim();
    if let Ok(verdict) = serde_json::from_str::<Verdict>(trimmed) {
        return Ok(verdict);
    }
    let from_line = trimmed
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .find_map(|line| serde_json::from_str::<Verdict>(line).ok());
    match from_line {
        Some(verdict) => Ok(verdict),
        None => {
            warn!(bytes = stdout.len(), "judge output had no verdict");
            Err(anyhow!("judge output is not a verdict: {}", preview(trimmed)))
        }
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 200;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
