//! Reviewer process execution: argv in, text out, bounded in time and size.

use std::io::{Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Time and output bounds for one child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessLimits {
    pub timeout: Duration,
    /// Bytes kept per stream; the rest is drained and counted.
    pub output_limit_bytes: usize,
}

/// One captured output stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Captured {
    pub bytes: Vec<u8>,
    pub dropped: usize,
}

impl Captured {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: Captured,
    pub stderr: Captured,
    pub timed_out: bool,
}

/// Spawn `argv`, write `input` to its stdin, and collect its output.
///
/// Both pipes are drained on reader threads started before stdin is written,
/// so a child that answers before reading everything cannot deadlock us.
#[instrument(skip_all, fields(program = argv.first().map(String::as_str), timeout_secs = limits.timeout.as_secs()))]
pub fn run_with_input(argv: &[String], input: &str, limits: ProcessLimits) -> Result<ProcessOutput> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("command is empty"))?;
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawn {program}"))?;
    debug!("child spawned");

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;
    let stdout_reader = spawn_reader(stdout, limits.output_limit_bytes);
    let stderr_reader = spawn_reader(stderr, limits.output_limit_bytes);

    if let Some(stdin) = child.stdin.take() {
        feed(stdin, input.as_bytes());
    }

    let (status, timed_out) = wait_or_kill(&mut child, limits.timeout)?;
    let stdout = collect(stdout_reader).context("collect stdout")?;
    let stderr = collect(stderr_reader).context("collect stderr")?;
    if stdout.dropped > 0 || stderr.dropped > 0 {
        warn!(
            stdout_dropped = stdout.dropped,
            stderr_dropped = stderr.dropped,
            "child output truncated"
        );
    }

    debug!(exit_code = ?status.code(), timed_out, "child finished");
    Ok(ProcessOutput {
        status,
        stdout,
        stderr,
        timed_out,
    })
}

// Dropping the handle closes the pipe so the child sees EOF.
fn feed(mut stdin: ChildStdin, input: &[u8]) {
    if let Err(err) = stdin.write_all(input) {
        warn!(%err, "child closed stdin before reading all input");
    }
}

fn wait_or_kill(child: &mut Child, timeout: Duration) -> Result<(ExitStatus, bool)> {
    if let Some(status) = child.wait_timeout(timeout).context("wait for child")? {
        return Ok((status, false));
    }
    warn!(timeout_secs = timeout.as_secs(), "child timed out, killing");
    child.kill().context("kill child")?;
    let status = child.wait().context("wait for killed child")?;
    Ok((status, true))
}

fn spawn_reader<R: Read + Send + 'static>(reader: R, limit: usize) -> JoinHandle<Result<Captured>> {
    thread::spawn(move || read_limited(reader, limit))
}

fn collect(handle: JoinHandle<Result<Captured>>) -> Result<Captured> {
    handle
        .join()
        .map_err(|_| anyhow!("output reader thread panicked"))?
}

fn read_limited<R: Read>(mut reader: R, limit: usize) -> Result<Captured> {
    let mut captured = Captured::default();
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).context("read child output")?;
        if n == 0 {
            return Ok(captured);
        }
        let keep = n.min(limit.saturating_sub(captured.bytes.len()));
        captured.bytes.extend_from_slice(&chunk[..keep]);
        captured.dropped += n - keep;
    }
}
