// src/engine/dispatcher.rs

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::{Job, validate_job};
use crate::engine::events::{EventRun, EventSink};
use crate::engine::handlers::Handlers;
use crate::engine::report::{NodeResult, RunReport};
use crate::errors::{NodeError, NodeErrorKind, Result};
use crate::exec::{
    ConcurrencyGate, InvocationContext, NodeInvocation, ProcessBackend, TokioProcessBackend,
};
use crate::types::{NodeName, NodeStatus};

/// Drives a [`Job`] to completion: one invocation per node, at most
/// `maxflight` running at once.
///
/// The dispatcher is cheap to clone and can be run any number of times;
/// each run is independent.
#[derive(Clone)]
pub struct Dispatcher {
    job: Arc<Job>,
    backend: Arc<dyn ProcessBackend>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("job", &self.job)
            .finish_non_exhaustive()
    }
}

/// An invocation that has been launched but not joined yet.
struct Launched {
    index: usize,
    node: NodeName,
    reported: Arc<AtomicBool>,
    handle: JoinHandle<NodeStatus>,
}

impl Dispatcher {
    /// Dispatcher that spawns real OS processes.
    pub fn new(job: Job) -> Self {
        Self::with_backend(job, TokioProcessBackend)
    }

    pub fn with_backend(job: Job, backend: impl ProcessBackend + 'static) -> Self {
        Self {
            job: Arc::new(job),
            backend: Arc::new(backend),
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    /// Run the job and wait for every node.
    ///
    /// - Fails only if the job is invalid, before anything is launched and
    ///   before any handler is called.
    /// - Nodes are dispatched in list order; node k+1 waits for a free slot,
    ///   never for node k itself.
    /// - Returns once every invocation has drained its output and reported.
    pub async fn run(&self, handlers: Arc<dyn Handlers>) -> Result<RunReport> {
        validate_job(&self.job)?;
        let gate = ConcurrencyGate::new(self.job.maxflight)?;

        let ctx = Arc::new(InvocationContext {
            job: Arc::clone(&self.job),
            backend: Arc::clone(&self.backend),
            handlers: Arc::clone(&handlers),
        });

        info!(
            command = %self.job.command,
            nodes = self.job.nodes.len(),
            maxflight = self.job.maxflight,
            timeout = ?self.job.timeout,
            "run started"
        );

        let mut launched = Vec::with_capacity(self.job.nodes.len());

        for (index, node) in self.job.nodes.iter().enumerate() {
            let permit = gate.acquire().await?;
            debug!(node = %node, index, in_flight = gate.in_flight(), "dispatching node");

            let invocation = NodeInvocation::new(index, node.clone(), &self.job);
            let reported = invocation.reported_flag();
            let ctx = Arc::clone(&ctx);

            let handle = tokio::spawn(async move {
                // Held until the invocation has drained and reported.
                let _permit = permit;
                invocation.run(&ctx).await
            });

            launched.push(Launched {
                index,
                node: node.clone(),
                reported,
                handle,
            });
        }

        let mut results = Vec::with_capacity(launched.len());
        for item in launched {
            let status = join_invocation(item.handle, &item.node, &item.reported, &handlers).await;
            results.push(NodeResult {
                index: item.index,
                node: item.node,
                status,
            });
        }

        let report = RunReport::new(results);
        info!(
            nodes = report.len(),
            unsuccessful = report.unsuccessful().count(),
            peak_in_flight = gate.peak(),
            "run finished"
        );

        Ok(report)
    }

    /// Run the job, observing it as a stream of [`crate::engine::RunEvent`]s.
    ///
    /// Validation happens before this returns, so an invalid job fails here
    /// and no run is started.
    pub fn run_events(&self) -> Result<EventRun> {
        validate_job(&self.job)?;

        let (sink, rx) = EventSink::new();
        let dispatcher = self.clone();
        let handle = tokio::spawn(async move { dispatcher.run(Arc::new(sink)).await });

        Ok(EventRun::new(rx, handle))
    }
}

/// Join one invocation task.
///
/// A panic (normally from a handler) is recorded for that node only. If the
/// node had not produced its terminal report yet, it gets one now.
async fn join_invocation(
    handle: JoinHandle<NodeStatus>,
    node: &str,
    reported: &AtomicBool,
    handlers: &Arc<dyn Handlers>,
) -> NodeStatus {
    match handle.await {
        Ok(status) => status,
        Err(e) => {
            error!(node = %node, error = %e, "node invocation task failed");
            let err = NodeError::new(NodeErrorKind::Panicked, e.to_string());
            if !reported.swap(true, Ordering::SeqCst) {
                handlers.on_error(node, &err);
            }
            NodeStatus::Failed(err)
        }
    }
}
