//! Child process execution: spawn, stream stdout/stderr in arrival
//! order, log, and enforce the hard timeout.
//!
//! The read loop follows the same `tokio::select!`-over-pipes-plus-
//! deadline shape as a PTY/pipe process runner, simplified here to a
//! single non-interactive call-and-collect instead of a long-lived
//! interactive session.

use boxedin_core::sandbox::{SandboxOutcome, StreamKind};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::process::Command;

/// Run `cmd` to completion, writing output to `log_path` and `on_chunk`
/// as it arrives, and killing the child if `timeout_ms` elapses first.
/// Never returns an error — startup or runtime failure is folded into
/// the returned [`SandboxOutcome`].
pub async fn execute(
    mut cmd: Command,
    stdin: Option<&str>,
    timeout_ms: u64,
    log_path: &Path,
    on_chunk: &(dyn Fn(StreamKind, &[u8]) + Send + Sync),
) -> SandboxOutcome {
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return SandboxOutcome {
                code: -1,
                stdout: String::new(),
                stderr: e.to_string(),
                log_file: log_path.display().to_string(),
            };
        }
    };

    if let Some(data) = stdin.filter(|s| !s.is_empty()) {
        if let Some(handle) = &mut child.stdin {
            let _ = handle.write_all(data.as_bytes()).await;
        }
    }
    drop(child.stdin.take());

    let mut log = match File::create(log_path).await {
        Ok(f) => Some(BufWriter::new(f)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to create run log file, continuing without one");
            None
        }
    };

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let mut stdout_open = stdout.is_some();
    let mut stderr_open = stderr.is_some();
    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();
    let mut out_chunk = [0u8; 8192];
    let mut err_chunk = [0u8; 8192];

    let sleep = tokio::time::sleep(Duration::from_millis(timeout_ms));
    tokio::pin!(sleep);
    let mut timed_out = false;

    let code = loop {
        if !stdout_open && !stderr_open {
            tokio::select! {
                status = child.wait() => {
                    break status.ok().and_then(|s| s.code()).unwrap_or(-1);
                }
                _ = &mut sleep, if !timed_out => {
                    timed_out = true;
                    let _ = child.kill().await;
                }
            }
            continue;
        }

        tokio::select! {
            res = async { stdout.as_mut().unwrap().read(&mut out_chunk).await }, if stdout_open => {
                match res {
                    Ok(0) | Err(_) => stdout_open = false,
                    Ok(n) => {
                        let bytes = &out_chunk[..n];
                        stdout_buf.extend_from_slice(bytes);
                        on_chunk(StreamKind::Stdout, bytes);
                        if let Some(log) = log.as_mut() {
                            let _ = log.write_all(bytes).await;
                        }
                    }
                }
            }
            res = async { stderr.as_mut().unwrap().read(&mut err_chunk).await }, if stderr_open => {
                match res {
                    Ok(0) | Err(_) => stderr_open = false,
                    Ok(n) => {
                        let bytes = &err_chunk[..n];
                        stderr_buf.extend_from_slice(bytes);
                        on_chunk(StreamKind::Stderr, bytes);
                        if let Some(log) = log.as_mut() {
                            let _ = log.write_all(bytes).await;
                        }
                    }
                }
            }
            _ = &mut sleep, if !timed_out => {
                timed_out = true;
                let _ = child.kill().await;
            }
        }
    };

    if let Some(mut log) = log {
        let _ = log.flush().await;
    }

    SandboxOutcome {
        code,
        stdout: String::from_utf8_lossy(&stdout_buf).into_owned(),
        stderr: String::from_utf8_lossy(&stderr_buf).into_owned(),
        log_file: log_path.display().to_string(),
    }
}
