// src/engine/events.rs

//! Structured events for a run.
//!
//! [`EventSink`] is a [`Handlers`] implementation that turns every callback
//! into a [`RunEvent`] on a channel, so a harness can collect a run's output
//! deterministically instead of writing its own handlers.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::engine::Handlers;
use crate::engine::report::RunReport;
use crate::errors::{GcmdError, NodeError, Result};
use crate::types::{NodeName, StreamKind};

/// One thing that happened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// A line from one of the node's output streams, without its line ending.
    Line {
        node: NodeName,
        stream: StreamKind,
        payload: Vec<u8>,
    },
    /// The node's process exited on its own.
    Exited { node: NodeName, code: i32 },
    /// A per-node error; terminal unless `error.is_terminal()` is false.
    Error { node: NodeName, error: NodeError },
}

impl RunEvent {
    pub fn node(&self) -> &str {
        match self {
            RunEvent::Line { node, .. } | RunEvent::Exited { node, .. } | RunEvent::Error { node, .. } => {
                node
            }
        }
    }

    /// Whether this is the node's single terminal report.
    pub fn is_terminal(&self) -> bool {
        match self {
            RunEvent::Line { .. } => false,
            RunEvent::Exited { .. } => true,
            RunEvent::Error { error, .. } => error.is_terminal(),
        }
    }
}

/// Handlers that forward everything as [`RunEvent`]s.
///
/// The channel is unbounded so a slow consumer never stalls a reader.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<RunEvent>,
}

impl EventSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RunEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: RunEvent) {
        // Receiver gone means nobody is listening any more; the run goes on.
        let _ = self.tx.send(event);
    }
}

impl Handlers for EventSink {
    fn on_stdout_line(&self, node: &str, line: &[u8]) {
        self.send(RunEvent::Line {
            node: node.to_string(),
            stream: StreamKind::Stdout,
            payload: line.to_vec(),
        });
    }

    fn on_stderr_line(&self, node: &str, line: &[u8]) {
        self.send(RunEvent::Line {
            node: node.to_string(),
            stream: StreamKind::Stderr,
            payload: line.to_vec(),
        });
    }

    fn on_exit(&self, node: &str, code: i32) {
        self.send(RunEvent::Exited {
            node: node.to_string(),
            code,
        });
    }

    fn on_error(&self, node: &str, error: &NodeError) {
        self.send(RunEvent::Error {
            node: node.to_string(),
            error: error.clone(),
        });
    }
}

/// A run in progress, observed as a sequence of events.
///
/// Returned by [`crate::engine::Dispatcher::run_events`]; every call starts a
/// fresh run with its own event sequence.
#[derive(Debug)]
pub struct EventRun {
    events: mpsc::UnboundedReceiver<RunEvent>,
    handle: JoinHandle<Result<RunReport>>,
}

impl EventRun {
    pub(crate) fn new(
        events: mpsc::UnboundedReceiver<RunEvent>,
        handle: JoinHandle<Result<RunReport>>,
    ) -> Self {
        Self { events, handle }
    }

    /// Next event, or `None` once the run has finished and every event has
    /// been consumed.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Wait for the run to finish, ignoring any events not yet consumed.
    pub async fn finish(self) -> Result<RunReport> {
        self.handle
            .await
            .map_err(|e| GcmdError::Other(anyhow::anyhow!("run task failed: {e}")))?
    }

    /// Collect every remaining event and the final report.
    pub async fn collect(mut self) -> Result<(Vec<RunEvent>, RunReport)> {
        let mut events = Vec::new();
        while let Some(event) = self.events.recv().await {
            events.push(event);
        }
        let report = self.finish().await?;
        Ok((events, report))
    }
}
