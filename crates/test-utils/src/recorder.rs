use std::sync::{Arc, Mutex};
use std::time::Instant;

use gcmd::engine::Handlers;
use gcmd::errors::NodeError;
use gcmd::types::StreamKind;

/// One handler call, as seen by [`RecordingHandlers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Line {
        node: String,
        stream: StreamKind,
        line: Vec<u8>,
    },
    Exit {
        node: String,
        code: i32,
    },
    Error {
        node: String,
        error: NodeError,
    },
}

impl Call {
    pub fn node(&self) -> &str {
        match self {
            Call::Line { node, .. } | Call::Exit { node, .. } | Call::Error { node, .. } => node,
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Call::Line { .. } => false,
            Call::Exit { .. } => true,
            Call::Error { error, .. } => error.is_terminal(),
        }
    }
}

/// Handlers that record every call with the instant it happened.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandlers {
    calls: Arc<Mutex<Vec<(Instant, Call)>>>,
}

impl RecordingHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same recorder as `Arc<dyn Handlers>`, for `Dispatcher::run`.
    pub fn handlers(&self) -> Arc<dyn Handlers> {
        Arc::new(self.clone())
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push((Instant::now(), call));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, Call)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lines of one stream of one node, lossily decoded, in arrival order.
    pub fn lines(&self, node: &str, stream: StreamKind) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Line {
                    node: n,
                    stream: s,
                    line,
                } if n == node && s == stream => Some(String::from_utf8_lossy(&line).into_owned()),
                _ => None,
            })
            .collect()
    }

    pub fn stdout_lines(&self, node: &str) -> Vec<String> {
        self.lines(node, StreamKind::Stdout)
    }

    pub fn stderr_lines(&self, node: &str) -> Vec<String> {
        self.lines(node, StreamKind::Stderr)
    }

    /// Every line call, any node or stream.
    pub fn line_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Line { .. }))
            .count()
    }

    /// Terminal reports (`on_exit` or terminal `on_error`) for `node`.
    pub fn terminal_reports(&self, node: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.node() == node && c.is_terminal())
            .collect()
    }

    pub fn exit_code(&self, node: &str) -> Option<i32> {
        self.calls().into_iter().find_map(|c| match c {
            Call::Exit { node: n, code } if n == node => Some(code),
            _ => None,
        })
    }

    pub fn errors(&self, node: &str) -> Vec<NodeError> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Error { node: n, error } if n == node => Some(error),
                _ => None,
            })
            .collect()
    }
}

impl Handlers for RecordingHandlers {
    fn on_stdout_line(&self, node: &str, line: &[u8]) {
        self.push(Call::Line {
            node: node.to_string(),
            stream: StreamKind::Stdout,
            line: line.to_vec(),
        });
    }

    fn on_stderr_line(&self, node: &str, line: &[u8]) {
        self.push(Call::Line {
            node: node.to_string(),
            stream: StreamKind::Stderr,
            line: line.to_vec(),
        });
    }

    fn on_exit(&self, node: &str, code: i32) {
        self.push(Call::Exit {
            node: node.to_string(),
            code,
        });
    }

    fn on_error(&self, node: &str, error: &NodeError) {
        self.push(Call::Error {
            node: node.to_string(),
            error: error.clone(),
        });
    }
}
