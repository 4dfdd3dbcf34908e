// src/exec/stream_reader.rs

//! Line-by-line draining of one process output stream.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::engine::Handlers;
use crate::errors::NodeError;
use crate::types::{NodeName, StreamKind};

/// Reader bound to exactly one stream of one invocation.
pub struct StreamReader {
    node: NodeName,
    kind: StreamKind,
    handlers: Arc<dyn Handlers>,
}

impl StreamReader {
    pub fn new(node: NodeName, kind: StreamKind, handlers: Arc<dyn Handlers>) -> Self {
        Self {
            node,
            kind,
            handlers,
        }
    }

    /// Drain `source` on its own Tokio task.
    pub fn spawn<R>(self, source: R) -> JoinHandle<u64>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        tokio::spawn(self.drain(source))
    }

    /// Read `source` until EOF, delivering each line to the handler for
    /// this stream. Returns the number of lines delivered.
    ///
    /// The trailing `\n` (and a `\r` right before it) is stripped; a last
    /// line without a newline is still delivered. Bytes are passed through
    /// as-is, valid UTF-8 or not. A read error is reported through
    /// `on_error` and ends the drain.
    pub async fn drain<R>(self, source: R) -> u64
    where
        R: AsyncRead + Unpin,
    {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        let mut lines = 0u64;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = strip_line_ending(&buf);
                    trace!(node = %self.node, stream = %self.kind, len = line.len(), "line");
                    self.deliver(line);
                    lines += 1;
                }
                Err(e) => {
                    warn!(node = %self.node, stream = %self.kind, error = %e, "stream read failed");
                    let err = NodeError::stream_read(format!("reading {}: {}", self.kind, e));
                    self.handlers.on_error(&self.node, &err);
                    break;
                }
            }
        }

        debug!(node = %self.node, stream = %self.kind, lines, "stream drained");
        lines
    }

    fn deliver(&self, line: &[u8]) {
        match self.kind {
            StreamKind::Stdout => self.handlers.on_stdout_line(&self.node, line),
            StreamKind::Stderr => self.handlers.on_stderr_line(&self.node, line),
        }
    }
}

fn strip_line_ending(buf: &[u8]) -> &[u8] {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    line.strip_suffix(b"\r").unwrap_or(line)
}
