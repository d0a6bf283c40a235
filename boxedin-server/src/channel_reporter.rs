//! A [`Reporter`] that forwards every event onto an unbounded channel —
//! the bridge between one `AgentLoop::run` call and one SSE connection.

use async_trait::async_trait;
use boxedin_core::{Reporter, ReporterEvent};
use tokio::sync::mpsc::UnboundedSender;

/// Forwards events to a channel. Send failures (receiver dropped, e.g.
/// the client disconnected mid-run) are silently ignored — per
/// [`Reporter`]'s contract, a misbehaving observer never interrupts the
/// agent loop.
pub struct ChannelReporter(pub UnboundedSender<ReporterEvent>);

#[async_trait]
impl Reporter for ChannelReporter {
    async fn on_event(&self, event: ReporterEvent) {
        let _ = self.0.send(event);
    }
}
