// src/exec/invocation.rs

//! Lifecycle of one node's process.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, error, info, warn};

use crate::config::Job;
use crate::engine::Handlers;
use crate::errors::{NodeError, NodeErrorKind};
use crate::exec::backend::{ProcessBackend, ProcessHandle, SpawnedProcess};
use crate::exec::stream_reader::StreamReader;
use crate::marker::replace_marker;
use crate::types::{NodeName, NodeStatus, StreamKind};

/// Everything an invocation needs that is shared across the run.
pub struct InvocationContext {
    pub job: Arc<Job>,
    pub backend: Arc<dyn ProcessBackend>,
    pub handlers: Arc<dyn Handlers>,
}

/// Per-invocation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationState {
    /// Arguments resolved, process not started yet.
    Pending,
    /// Process started and not yet reaped.
    Running,
    Exited(i32),
    Failed(NodeError),
}

enum WaitOutcome {
    Exited(Option<i32>),
    TimedOut(Duration),
    WaitFailed(io::Error),
}

/// Runtime record for one node, owned by the task running it.
#[derive(Debug)]
pub struct NodeInvocation {
    index: usize,
    node: NodeName,
    args: Vec<String>,
    state: InvocationState,
    reported: Arc<AtomicBool>,
}

impl NodeInvocation {
    /// Prepare the invocation of `node`, the `index`-th entry of the job's
    /// node list. Arguments are resolved here.
    pub fn new(index: usize, node: NodeName, job: &Job) -> Self {
        let args = replace_marker(&job.args, &job.marker, &node);
        Self {
            index,
            node,
            args,
            state: InvocationState::Pending,
            reported: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Flag set once the terminal report for this node has been emitted.
    ///
    /// The dispatcher uses it to avoid a second report if the task panics.
    pub fn reported_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.reported)
    }

    /// Run the process to completion and report its terminal status.
    ///
    /// Returns only after both output streams are drained and exactly one
    /// of `on_exit` / `on_error` has been called for this node.
    pub async fn run(mut self, ctx: &InvocationContext) -> NodeStatus {
        let job = &ctx.job;
        info!(
            node = %self.node,
            index = self.index,
            command = %job.command,
            args = ?self.args,
            "starting node process"
        );

        let SpawnedProcess {
            stdout,
            stderr,
            mut handle,
        } = match ctx.backend.spawn(&job.command, &self.args) {
            Ok(spawned) => spawned,
            Err(err) => {
                warn!(node = %self.node, index = self.index, error = %err, "node process did not start");
                return self.finish(NodeStatus::Failed(err), ctx);
            }
        };
        self.state = InvocationState::Running;

        let stdout_reader =
            StreamReader::new(self.node.clone(), StreamKind::Stdout, Arc::clone(&ctx.handlers))
                .spawn(stdout);
        let stderr_reader =
            StreamReader::new(self.node.clone(), StreamKind::Stderr, Arc::clone(&ctx.handlers))
                .spawn(stderr);
        let readers = [stdout_reader, stderr_reader];

        let outcome = wait_for_exit(handle.as_mut(), job.timeout).await;

        let status = match outcome {
            WaitOutcome::Exited(code) => {
                let code = code.unwrap_or(-1);
                info!(node = %self.node, index = self.index, exit_code = code, "node process exited");
                drain_readers(&self.node, readers, None).await;
                NodeStatus::Exited(code)
            }
            WaitOutcome::TimedOut(limit) => {
                warn!(node = %self.node, index = self.index, timeout = ?limit, "node process timed out; killing");
                kill_process(&self.node, handle.as_mut()).await;
                drain_readers(&self.node, readers, Some(job.drain_grace)).await;
                NodeStatus::Failed(NodeError::timeout(format!(
                    "no exit after {:?}; process killed",
                    limit
                )))
            }
            WaitOutcome::WaitFailed(e) => {
                error!(node = %self.node, index = self.index, error = %e, "waiting for node process failed");
                kill_process(&self.node, handle.as_mut()).await;
                drain_readers(&self.node, readers, Some(job.drain_grace)).await;
                NodeStatus::Failed(NodeError::new(
                    NodeErrorKind::Wait,
                    format!("waiting for process: {}", e),
                ))
            }
        };

        self.finish(status, ctx)
    }

    /// Record the terminal state and emit the one terminal report.
    fn finish(mut self, status: NodeStatus, ctx: &InvocationContext) -> NodeStatus {
        self.state = match &status {
            NodeStatus::Exited(code) => InvocationState::Exited(*code),
            NodeStatus::Failed(err) => InvocationState::Failed(err.clone()),
        };
        debug!(node = %self.node, index = self.index, state = ?self.state, "invocation finished");

        if !self.reported.swap(true, Ordering::SeqCst) {
            match &status {
                NodeStatus::Exited(code) => ctx.handlers.on_exit(&self.node, *code),
                NodeStatus::Failed(err) => ctx.handlers.on_error(&self.node, err),
            }
        }

        status
    }
}

async fn wait_for_exit(handle: &mut dyn ProcessHandle, limit: Option<Duration>) -> WaitOutcome {
    let result = match limit {
        None => handle.wait().await,
        Some(limit) => match timeout(limit, handle.wait()).await {
            Ok(result) => result,
            Err(_) => return WaitOutcome::TimedOut(limit),
        },
    };

    match result {
        Ok(code) => WaitOutcome::Exited(code),
        Err(e) => WaitOutcome::WaitFailed(e),
    }
}

async fn kill_process(node: &str, handle: &mut dyn ProcessHandle) {
    if let Err(e) = handle.kill().await {
        warn!(node = %node, error = %e, "failed to kill node process");
    }
}

/// Wait for both readers of an invocation.
///
/// With a `grace`, readers still running once it elapses are aborted; this
/// only happens when a killed process left its pipes open in a descendant.
/// Either way every reader task has finished when this returns.
async fn drain_readers(node: &str, readers: [JoinHandle<u64>; 2], grace: Option<Duration>) {
    // A grace too large to be a deadline is the same as no deadline.
    let deadline = grace.and_then(|g| Instant::now().checked_add(g));

    for mut reader in readers {
        let joined = match deadline {
            None => Some((&mut reader).await),
            Some(deadline) => timeout_at(deadline, &mut reader).await.ok(),
        };

        match joined {
            Some(Ok(_lines)) => {}
            Some(Err(e)) if e.is_panic() => {
                error!(node = %node, "stream reader panicked (handler panic?)");
            }
            Some(Err(e)) => {
                debug!(node = %node, error = %e, "stream reader cancelled");
            }
            None => {
                warn!(node = %node, "output still open after drain grace; abandoning reader");
                reader.abort();
                let _ = reader.await;
            }
        }
    }
}
