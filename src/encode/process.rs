use std::io::{Read, Write as _};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    /// Empty unless the run captured stdout.
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("failed to spawn '{program}' (is it installed and on PATH?): {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("failed to wait for '{program}': {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },

    #[error("'{program}' timed out after {}s and was killed", after.as_secs_f64())]
    TimedOut { program: String, after: Duration },
}

/// Run `cmd` to completion, killing it once `timeout` elapses.
///
/// stdout is discarded. stderr is drained on a helper thread so a chatty child cannot stall on
/// a full pipe; `stdin`, when given, is written from another helper thread and then closed.
///
/// On unix the child leads its own process group and a timeout kills the whole group.
pub fn run_with_timeout(
    cmd: &mut Command,
    stdin: Option<&[u8]>,
    timeout: Duration,
) -> Result<ProcessOutput, ProcessError> {
    run(cmd, stdin, false, timeout)
}

/// Like [`run_with_timeout`] without stdin, keeping what the child writes to stdout.
pub fn run_capturing_stdout(
    cmd: &mut Command,
    timeout: Duration,
) -> Result<ProcessOutput, ProcessError> {
    run(cmd, None, true, timeout)
}

fn run(
    cmd: &mut Command,
    stdin: Option<&[u8]>,
    capture_stdout: bool,
    timeout: Duration,
) -> Result<ProcessOutput, ProcessError> {
    let program = cmd.get_program().to_string_lossy().to_string();
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(if capture_stdout {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt as _;
        // Own process group, so a timeout also reaches whatever the child spawned.
        cmd.process_group(0);
    }

    debug!(program = %program, args = ?cmd.get_args().collect::<Vec<_>>(), "spawning");
    let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.clone(),
        source,
    })?;

    let writer: Option<JoinHandle<()>> = match (child.stdin.take(), stdin) {
        (Some(mut pipe), Some(bytes)) => {
            let bytes = bytes.to_vec();
            Some(std::thread::spawn(move || {
                // A child that exits without reading its input reports through its status.
                let _ = pipe.write_all(&bytes);
            }))
        }
        _ => None,
    };

    let stdout_drain = child.stdout.take().map(drain);
    let stderr_drain = child.stderr.take().map(drain);

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() >= timeout => {
                kill_tree(&mut child);
                // Grandchildren may still hold the pipes; the helper threads finish on their own.
                drop(writer);
                drop(stdout_drain);
                drop(stderr_drain);
                return Err(ProcessError::TimedOut {
                    program,
                    after: timeout,
                });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(source) => return Err(ProcessError::Wait { program, source }),
        }
    };

    join_quietly(writer);
    Ok(ProcessOutput {
        status,
        stdout: collect(stdout_drain),
        stderr: collect(stderr_drain),
    })
}

fn drain(mut pipe: impl Read + Send + 'static) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Kill the child and, on unix, every process in its group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        let killed = Command::new("kill")
            .args(["-KILL", "--", &group])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Err(e) = killed {
            warn!(pid = child.id(), error = %e, "could not signal process group");
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn join_quietly(handle: Option<JoinHandle<()>>) {
    if let Some(h) = handle {
        let _ = h.join();
    }
}

/// Keep the last `max_lines` lines of a diagnostic.
pub fn tail_lines(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

/// Return `true` when `program -version` runs successfully.
pub fn is_tool_on_path(program: &std::path::Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/process.rs"]
mod tests;
