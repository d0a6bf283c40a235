//! `Reporter` dispatch for boxedin — spec.md §4.7.
//!
//! [`ReporterRegistry`] collects zero or more [`Reporter`]s into one
//! ordered, best-effort pipeline: every registered reporter sees every
//! event, in registration order, and a reporter that panics-free-errors
//! (there is no fallible path — `on_event` returns nothing) never
//! prevents the next one from running. `AgentLoop` depends on nothing
//! beyond the `Reporter` trait itself; the registry is a convenience for
//! callers that want to fan one stream of events out to several
//! observers (e.g. a console log and an SSE channel at once).

use async_trait::async_trait;
use boxedin_core::reporter::{Reporter, ReporterEvent};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Dispatches one [`ReporterEvent`] stream to an ordered list of
/// [`Reporter`]s, registered at construction or via [`ReporterRegistry::add`].
#[derive(Default)]
pub struct ReporterRegistry {
    reporters: Vec<Arc<dyn Reporter>>,
}

impl ReporterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reporter. Dispatch order follows registration order.
    pub fn add(&mut self, reporter: Arc<dyn Reporter>) {
        self.reporters.push(reporter);
    }
}

#[async_trait]
impl Reporter for ReporterRegistry {
    async fn on_event(&self, event: ReporterEvent) {
        for reporter in &self.reporters {
            reporter.on_event(event.clone()).await;
        }
    }
}

/// A [`Reporter`] that logs each event as a human-readable `tracing`
/// line. Used by `boxedin-cli`.
pub struct ConsoleReporter;

#[async_trait]
impl Reporter for ConsoleReporter {
    async fn on_event(&self, event: ReporterEvent) {
        match event {
            ReporterEvent::Plan { plan } => {
                tracing::info!(steps = plan.steps.len(), "plan produced");
            }
            ReporterEvent::CreateTools { created } => {
                tracing::info!(?created, "tools created");
            }
            ReporterEvent::RunStart { id } => {
                tracing::info!(tool = %id, "run started");
            }
            ReporterEvent::RunChunk { id, stream, data } => {
                tracing::debug!(tool = %id, %stream, %data, "run chunk");
            }
            ReporterEvent::RunEnd { id, code } => {
                tracing::info!(tool = %id, code, "run ended");
            }
            ReporterEvent::Result { result } => {
                tracing::info!(tool = %result.id, code = result.code, "run result recorded");
            }
            ReporterEvent::Done { answer } => {
                tracing::info!(answer = answer.as_deref().unwrap_or(""), "goal done");
            }
            ReporterEvent::Error { message } => {
                tracing::warn!(%message, "reporter observed error");
            }
        }
    }
}

/// A [`Reporter`] that buffers every event it sees, in order, for later
/// inspection. Used by `boxedin-server`'s `POST /api/run` (which returns
/// the whole log in one response) and by tests.
#[derive(Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<ReporterEvent>>,
}

impl CollectingReporter {
    /// An empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every event collected so far, in arrival order.
    pub async fn events(&self) -> Vec<ReporterEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl Reporter for CollectingReporter {
    async fn on_event(&self, event: ReporterEvent) {
        self.events.lock().await.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxedin_core::Plan;

    #[tokio::test]
    async fn empty_registry_accepts_events() {
        let registry = ReporterRegistry::new();
        registry
            .on_event(ReporterEvent::Done { answer: None })
            .await;
    }

    #[tokio::test]
    async fn dispatches_to_every_registered_reporter_in_order() {
        let mut registry = ReporterRegistry::new();
        let a = Arc::new(CollectingReporter::new());
        let b = Arc::new(CollectingReporter::new());
        registry.add(a.clone());
        registry.add(b.clone());

        registry
            .on_event(ReporterEvent::RunStart { id: "echo".into() })
            .await;
        registry
            .on_event(ReporterEvent::RunEnd {
                id: "echo".into(),
                code: 0,
            })
            .await;

        for collector in [&a, &b] {
            let events = collector.events().await;
            assert_eq!(events.len(), 2);
            assert!(matches!(events[0], ReporterEvent::RunStart { .. }));
            assert!(matches!(events[1], ReporterEvent::RunEnd { .. }));
        }
    }

    #[tokio::test]
    async fn collecting_reporter_preserves_arrival_order() {
        let collector = CollectingReporter::new();
        collector
            .on_event(ReporterEvent::Plan {
                plan: Plan::fallback(),
            })
            .await;
        collector
            .on_event(ReporterEvent::CreateTools {
                created: vec!["echo".into()],
            })
            .await;
        let events = collector.events().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ReporterEvent::Plan { .. }));
        assert!(matches!(events[1], ReporterEvent::CreateTools { .. }));
    }

    #[tokio::test]
    async fn usable_as_dyn_reporter() {
        let mut registry = ReporterRegistry::new();
        registry.add(Arc::new(CollectingReporter::new()));
        let reporter: Box<dyn Reporter> = Box::new(registry);
        reporter
            .on_event(ReporterEvent::Error {
                message: "boom".into(),
            })
            .await;
    }
}
