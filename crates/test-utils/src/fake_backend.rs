use std::collections::HashMap;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, ReadBuf};

use gcmd::errors::NodeError;
use gcmd::exec::{BoxFuture, ProcessBackend, ProcessHandle, SpawnedProcess};

/// Scripted behaviour of one fake process.
#[derive(Debug, Clone, Default)]
pub struct FakeScript {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub exit_code: i32,
    /// How long the process "runs" before exiting.
    pub run_for: Duration,
    /// Never exit on its own; only `kill` ends it.
    pub hang: bool,
    /// Exit as if killed by a signal (no exit code).
    pub signaled: bool,
    pub fail_start: bool,
    pub fail_pipes: bool,
    /// stdout fails with an IO error after its lines were read.
    pub stdout_read_error: bool,
}

impl FakeScript {
    pub fn exit(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Self::default()
        }
    }

    pub fn stdout_line(mut self, line: &str) -> Self {
        self.stdout.push(line.to_string());
        self
    }

    pub fn stderr_line(mut self, line: &str) -> Self {
        self.stderr.push(line.to_string());
        self
    }

    pub fn run_for(mut self, d: Duration) -> Self {
        self.run_for = d;
        self
    }

    pub fn hang(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn signaled(mut self) -> Self {
        self.signaled = true;
        self
    }

    pub fn fail_start() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    pub fn fail_pipes() -> Self {
        Self {
            fail_pipes: true,
            ..Self::default()
        }
    }

    pub fn stdout_read_error(mut self) -> Self {
        self.stdout_read_error = true;
        self
    }
}

/// Running interval of one fake process.
#[derive(Debug, Clone)]
pub struct Interval {
    pub node: String,
    pub started: Instant,
    pub ended: Instant,
}

/// Shared observations of everything a [`FakeBackend`] did.
#[derive(Debug, Default)]
pub struct Tracker {
    running: AtomicUsize,
    peak: AtomicUsize,
    open_streams: AtomicUsize,
    spawned: Mutex<Vec<String>>,
    killed: Mutex<Vec<String>>,
    intervals: Mutex<Vec<Interval>>,
}

impl Tracker {
    /// Processes started and not yet exited/killed.
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Output streams handed out and not yet dropped by their reader.
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    /// Nodes in the order their processes were spawned.
    pub fn spawned(&self) -> Vec<String> {
        self.spawned.lock().unwrap().clone()
    }

    pub fn killed(&self) -> Vec<String> {
        self.killed.lock().unwrap().clone()
    }

    pub fn intervals(&self) -> Vec<Interval> {
        self.intervals.lock().unwrap().clone()
    }
}

/// A fake process backend that:
/// - picks a [`FakeScript`] by the first argument (use `["__NODE__"]` as the
///   argument template so that is the node name)
/// - serves the scripted lines from memory
/// - tracks running / peak / open-stream counts in a [`Tracker`]
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    scripts: HashMap<String, FakeScript>,
    default: FakeScript,
    tracker: Arc<Tracker>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, script: FakeScript) -> Self {
        self.default = script;
        self
    }

    pub fn with_script(mut self, node: &str, script: FakeScript) -> Self {
        self.scripts.insert(node.to_string(), script);
        self
    }

    pub fn tracker(&self) -> Arc<Tracker> {
        Arc::clone(&self.tracker)
    }
}

impl ProcessBackend for FakeBackend {
    fn spawn(&self, command: &str, args: &[String]) -> Result<SpawnedProcess, NodeError> {
        let node = args.first().cloned().unwrap_or_default();
        let script = self.scripts.get(&node).unwrap_or(&self.default).clone();

        if script.fail_pipes {
            return Err(NodeError::pipe_setup(format!("fake pipe failure for '{command}'")));
        }
        if script.fail_start {
            return Err(NodeError::process_start(format!("fake start failure for '{command}'")));
        }

        self.tracker.spawned.lock().unwrap().push(node.clone());
        let now = self.tracker.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.tracker.peak.fetch_max(now, Ordering::SeqCst);

        let stdout = TrackedReader::new(&script.stdout, script.stdout_read_error, &self.tracker);
        let stderr = TrackedReader::new(&script.stderr, false, &self.tracker);

        Ok(SpawnedProcess {
            stdout: Box::pin(stdout),
            stderr: Box::pin(stderr),
            handle: Box::new(FakeHandle {
                node,
                script,
                started: Instant::now(),
                exited: false,
                tracker: Arc::clone(&self.tracker),
            }),
        })
    }
}

struct FakeHandle {
    node: String,
    script: FakeScript,
    started: Instant,
    exited: bool,
    tracker: Arc<Tracker>,
}

impl FakeHandle {
    fn mark_exited(&mut self) {
        if self.exited {
            return;
        }
        self.exited = true;
        self.tracker.intervals.lock().unwrap().push(Interval {
            node: self.node.clone(),
            started: self.started,
            ended: Instant::now(),
        });
        self.tracker.running.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ProcessHandle for FakeHandle {
    fn wait(&mut self) -> BoxFuture<'_, io::Result<Option<i32>>> {
        Box::pin(async move {
            if self.script.hang {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(self.script.run_for).await;
            self.mark_exited();
            if self.script.signaled {
                Ok(None)
            } else {
                Ok(Some(self.script.exit_code))
            }
        })
    }

    fn kill(&mut self) -> BoxFuture<'_, io::Result<()>> {
        Box::pin(async move {
            self.tracker.killed.lock().unwrap().push(self.node.clone());
            self.mark_exited();
            Ok(())
        })
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.mark_exited();
    }
}

/// In-memory output stream that counts itself in `Tracker::open_streams`
/// until dropped.
struct TrackedReader {
    data: Vec<u8>,
    pos: usize,
    fail_at_end: bool,
    tracker: Arc<Tracker>,
}

impl TrackedReader {
    fn new(lines: &[String], fail_at_end: bool, tracker: &Arc<Tracker>) -> Self {
        let mut data = Vec::new();
        for line in lines {
            data.extend_from_slice(line.as_bytes());
            data.push(b'\n');
        }
        tracker.open_streams.fetch_add(1, Ordering::SeqCst);
        Self {
            data,
            pos: 0,
            fail_at_end,
            tracker: Arc::clone(tracker),
        }
    }
}

impl AsyncRead for TrackedReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        let remaining = &this.data[this.pos..];

        if remaining.is_empty() {
            if this.fail_at_end {
                return Poll::Ready(Err(io::Error::other("injected read failure")));
            }
            return Poll::Ready(Ok(()));
        }

        let n = remaining.len().min(buf.remaining());
        buf.put_slice(&remaining[..n]);
        this.pos += n;
        Poll::Ready(Ok(()))
    }
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.tracker.open_streams.fetch_sub(1, Ordering::SeqCst);
    }
}
