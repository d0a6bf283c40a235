//! One sandboxed invocation, wired to the reporter — shared by
//! [`crate::run_chain`] and [`crate::autofix`].
//!
//! `Sandbox::run`'s streaming callback is a plain synchronous `Fn`;
//! `Reporter::on_event` is async. A channel bridges the two: the
//! callback pushes chunks onto an unbounded channel, a spawned task
//! drains it into `reporter.on_event`, and we join that task before
//! emitting `RunEnd` — preserving the `RunStart` → `RunChunk*` →
//! `RunEnd` ordering invariant even though the chunks themselves arrive
//! on a different task.

use boxedin_core::sandbox::{Sandbox, SandboxOutcome, SandboxRequest, StreamKind};
use boxedin_core::reporter::{Reporter, ReporterEvent};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Run `request` against `sandbox`, emitting `RunStart`/`RunChunk`/
/// `RunEnd` on `reporter` in order.
pub async fn execute(
    sandbox: &Arc<dyn Sandbox>,
    reporter: &Arc<dyn Reporter>,
    tool_id: &str,
    request: SandboxRequest,
) -> SandboxOutcome {
    reporter
        .on_event(ReporterEvent::RunStart {
            id: tool_id.to_string(),
        })
        .await;

    let (tx, mut rx) = mpsc::unbounded_channel::<(StreamKind, Vec<u8>)>();
    let forward_reporter = Arc::clone(reporter);
    let forward_id = tool_id.to_string();
    let forward_task = tokio::spawn(async move {
        while let Some((kind, bytes)) = rx.recv().await {
            let stream = match kind {
                StreamKind::Stdout => "stdout",
                StreamKind::Stderr => "stderr",
            };
            let data = String::from_utf8_lossy(&bytes).into_owned();
            forward_reporter
                .on_event(ReporterEvent::RunChunk {
                    id: forward_id.clone(),
                    stream: stream.to_string(),
                    data,
                })
                .await;
        }
    });

    let on_chunk = move |kind: StreamKind, bytes: &[u8]| {
        let _ = tx.send((kind, bytes.to_vec()));
    };

    let outcome = match sandbox.run(request, &on_chunk).await {
        Ok(outcome) => outcome,
        Err(e) => SandboxOutcome {
            code: -1,
            stdout: String::new(),
            stderr: e.to_string(),
            log_file: String::new(),
        },
    };
    drop(on_chunk);
    let _ = forward_task.await;

    reporter
        .on_event(ReporterEvent::RunEnd {
            id: tool_id.to_string(),
            code: outcome.code,
        })
        .await;

    outcome
}
