// src/exec/backend.rs

//! Pluggable process backend.
//!
//! Invocations talk to a `ProcessBackend` instead of `tokio::process`
//! directly. Production code uses [`TokioProcessBackend`]; tests can hand
//! the dispatcher a fake backend that scripts output and exit codes without
//! spawning OS processes.

use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::errors::NodeError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One readable output stream of a started process.
pub type OutputStream = Pin<Box<dyn AsyncRead + Send>>;

/// Handle on a started process.
pub trait ProcessHandle: Send {
    /// Wait for the process to exit.
    ///
    /// Resolves to the exit code, or `None` when the process was terminated
    /// by a signal.
    fn wait(&mut self) -> BoxFuture<'_, io::Result<Option<i32>>>;

    /// Forcibly terminate the process and reap it.
    fn kill(&mut self) -> BoxFuture<'_, io::Result<()>>;

    /// OS process id, if there is one.
    fn id(&self) -> Option<u32> {
        None
    }
}

/// A started process together with its two output streams.
pub struct SpawnedProcess {
    pub stdout: OutputStream,
    pub stderr: OutputStream,
    pub handle: Box<dyn ProcessHandle>,
}

impl fmt::Debug for SpawnedProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnedProcess")
            .field("pid", &self.handle.id())
            .finish_non_exhaustive()
    }
}

/// Trait abstracting how one node's process is started.
///
/// Errors must be classified: [`NodeError::pipe_setup`] when the output
/// streams could not be created, [`NodeError::process_start`] when the
/// program could not be started. Either way no process may be left
/// running.
pub trait ProcessBackend: Send + Sync {
    fn spawn(&self, command: &str, args: &[String]) -> Result<SpawnedProcess, NodeError>;
}

/// Real backend built on `tokio::process::Command`.
///
/// The program is executed directly (no shell); stdin is `/dev/null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessBackend;

impl ProcessBackend for TokioProcessBackend {
    fn spawn(&self, command: &str, args: &[String]) -> Result<SpawnedProcess, NodeError> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| classify_spawn_error(command, e))?;

        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                // Already running: make sure it does not outlive the error.
                if let Err(e) = child.start_kill() {
                    warn!(command, error = %e, "failed to kill process after pipe setup error");
                }
                return Err(NodeError::pipe_setup(format!(
                    "stdout/stderr pipes unavailable for '{}'",
                    command
                )));
            }
        };

        debug!(command, pid = ?child.id(), "process spawned");

        Ok(SpawnedProcess {
            stdout: Box::pin(stdout),
            stderr: Box::pin(stderr),
            handle: Box::new(TokioChild { child }),
        })
    }
}

/// Pipes are the first descriptors allocated when spawning, so running out
/// of descriptors means pipe setup failed rather than the program.
fn classify_spawn_error(command: &str, err: io::Error) -> NodeError {
    const ENFILE: i32 = 23;
    const EMFILE: i32 = 24;

    match err.raw_os_error() {
        Some(ENFILE) | Some(EMFILE) => {
            NodeError::pipe_setup(format!("creating pipes for '{}': {}", command, err))
        }
        _ => NodeError::process_start(format!("spawning '{}': {}", command, err)),
    }
}

struct TokioChild {
    child: Child,
}

impl ProcessHandle for TokioChild {
    fn wait(&mut self) -> BoxFuture<'_, io::Result<Option<i32>>> {
        Box::pin(async move {
            let status = self.child.wait().await?;
            Ok(status.code())
        })
    }

    fn kill(&mut self) -> BoxFuture<'_, io::Result<()>> {
        Box::pin(self.child.kill())
    }

    fn id(&self) -> Option<u32> {
        self.child.id()
    }
}
