//! Gate configuration stored under `.gate/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::io::store::write_atomic;

/// Accepted range for `max_retry_attempts`.
pub const MAX_RETRY_ATTEMPTS_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

/// Gate configuration (TOML).
///
/// Missing fields default to the values in [`GateConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GateConfig {
    /// Completion attempts allowed per todo before further claims are refused.
    pub max_retry_attempts: u32,

    /// Directory holding snapshots and the attempt ledger, relative to the root.
    pub state_dir: PathBuf,

    pub judge: JudgeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JudgeConfig {
    /// Command that reviews completion claims (prompt on stdin, JSON verdict on
    /// stdout). Empty approves every claim without review.
    pub command: Vec<String>,

    /// Wall-clock limit for one judge invocation.
    pub timeout_secs: u64,

    /// Truncate captured judge stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            timeout_secs: 120,
            output_limit_bytes: 100_000,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: 5,
            state_dir: PathBuf::from(".gate").join("state"),
            judge: JudgeConfig::default(),
        }
    }
}

impl GateConfig {
    pub fn validate(&self) -> Result<()> {
        if !MAX_RETRY_ATTEMPTS_RANGE.contains(&self.max_retry_attempts) {
            return Err(anyhow!(
                "max_retry_attempts must be between {} and {} (got {})",
                MAX_RETRY_ATTEMPTS_RANGE.start(),
                MAX_RETRY_ATTEMPTS_RANGE.end(),
                self.max_retry_attempts
            ));
        }
        if self.state_dir.as_os_str().is_empty() {
            return Err(anyhow!("state_dir must not be empty"));
        }
        if self.judge.timeout_secs == 0 {
            return Err(anyhow!("judge.timeout_secs must be > 0"));
        }
        if self.judge.output_limit_bytes == 0 {
            return Err(anyhow!("judge.output_limit_bytes must be > 0"));
        }
        if self
            .judge
            .command
            .first()
            .is_some_and(|program| program.trim().is_empty())
        {
            return Err(anyhow!("judge.command[0] must not be blank"));
        }
        Ok(())
    }

    /// State directory resolved against the project root.
    pub fn state_dir_in(&self, root: &Path) -> PathBuf {
        root.join(&self.state_dir)
    }
}

/// Canonical config location for a project root.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(".gate").join("config.toml")
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `GateConfig::default()`.
pub fn load_config(path: &Path) -> Result<GateConfig> {
    if !path.exists() {
        let cfg = GateConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: GateConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &GateConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}
