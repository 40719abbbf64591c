//! Completion-claim gate CLI.
//!
//! Runs as a hook next to a coding agent: each todo list submission is read
//! from stdin and answered on stdout. State lives under `.gate/` in the
//! project root.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gate::check::{CheckOptions, run_check};
use gate::core::snapshot::parse_snapshot;
use gate::exit_codes;
use gate::io::config::{GateConfig, config_path, load_config, write_config};
use gate::io::hook::{HookEvent, HookOutput, parse_hook_input};
use gate::io::judge::judge_from_config;
use gate::io::store::FileStore;
use gate::logging;
use gate::session::{accept, reset_session, status};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "gate",
    version,
    about = "Gate completion claims in agent todo lists"
)]
struct Cli {
    /// Project root holding `.gate/`.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write `.gate/config.toml` with defaults if missing.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Handle one hook event from stdin and print the response JSON.
    Hook {
        /// Evaluate without saving state or calling the judge.
        #[arg(long)]
        dry_run: bool,
    },
    /// Evaluate a todo list file (`[...]` or `{"todos": [...]}`).
    Check {
        /// Path to the todo list JSON.
        #[arg(long)]
        todos: PathBuf,
        /// Evaluate without saving state or calling the judge.
        #[arg(long)]
        dry_run: bool,
    },
    /// Drop attempt counters for accepted items.
    Accept {
        /// Todo contents, verbatim.
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Clear every attempt counter (new session).
    Reset,
    /// Print stored snapshots and attempt counters.
    Status,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = cli.root.as_path();
    match cli.command {
        Command::Init { force } => cmd_init(root, force),
        Command::Hook { dry_run } => cmd_hook(root, dry_run),
        Command::Check { todos, dry_run } => cmd_check(root, &todos, dry_run),
        Command::Accept { items } => cmd_accept(root, &items),
        Command::Reset => cmd_reset(root),
        Command::Status => cmd_status(root),
    }
}

fn open(root: &Path) -> Result<(GateConfig, FileStore)> {
    let cfg = load_config(&config_path(root))?;
    let store = FileStore::new(cfg.state_dir_in(root));
    debug!(state_dir = %store.dir().display(), "opened gate state");
    Ok((cfg, store))
}

fn options(cfg: &GateConfig, dry_run: bool) -> CheckOptions {
    CheckOptions {
        max_retry_attempts: i64::from(cfg.max_retry_attempts),
        dry_run,
    }
}

fn cmd_init(root: &Path, force: bool) -> Result<i32> {
    let path = config_path(root);
    if force || !path.exists() {
        write_config(&path, &GateConfig::default())?;
    }
    Ok(exit_codes::OK)
}

fn cmd_hook(root: &Path, dry_run: bool) -> Result<i32> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("read hook input from stdin")?;
    let (input, event) = parse_hook_input(&raw)?;
    debug!(event = %input.hook_event_name, session_id = ?input.session_id, "hook event");

    let output = match event {
        HookEvent::TodoSubmission(submission) => {
            let (cfg, store) = open(root)?;
            let judge = judge_from_config(&cfg.judge);
            let outcome = run_check(&store, &judge, &submission, &options(&cfg, dry_run))?;
            HookOutput::from_decision(&outcome.decision)
        }
        HookEvent::SessionStart => {
            if !dry_run {
                let (_, store) = open(root)?;
                reset_session(&store)?;
            }
            HookOutput::pass()
        }
        HookEvent::Ignored => HookOutput::pass(),
    };
    println!("{}", output.to_json()?);
    Ok(exit_codes::OK)
}

fn cmd_check(root: &Path, todos: &Path, dry_run: bool) -> Result<i32> {
    let raw = fs::read_to_string(todos).with_context(|| format!("read {}", todos.display()))?;
    let submission =
        parse_snapshot(&raw).with_context(|| format!("parse todos {}", todos.display()))?;
    let (cfg, store) = open(root)?;
    let judge = judge_from_config(&cfg.judge);
    let outcome = run_check(&store, &judge, &submission, &options(&cfg, dry_run))?;
    let payload =
        serde_json::to_string_pretty(&outcome.decision).context("serialize decision")?;
    println!("{payload}");
    if outcome.decision.is_blocking() {
        return Ok(exit_codes::BLOCKED);
    }
    Ok(exit_codes::OK)
}

fn cmd_accept(root: &Path, items: &[String]) -> Result<i32> {
    let (_, store) = open(root)?;
    for identity in accept(&store, items)? {
        println!("{identity}");
    }
    Ok(exit_codes::OK)
}

fn cmd_reset(root: &Path) -> Result<i32> {
    let (_, store) = open(root)?;
    reset_session(&store)?;
    Ok(exit_codes::OK)
}

fn cmd_status(root: &Path) -> Result<i32> {
    let (_, store) = open(root)?;
    let report = status(&store)?;
    let payload = serde_json::to_string_pretty(&report).context("serialize status")?;
    println!("{payload}");
    Ok(exit_codes::OK)
}
