// src/engine/handlers.rs

use crate::errors::NodeError;

/// Callbacks through which a run reports output and results.
///
/// Methods are called from engine-owned Tokio tasks, possibly many at once
/// for different nodes and streams. Calls for the same stream of the same
/// node never overlap. Implementations that aggregate across nodes must do
/// their own locking, and must not block for long: a slow `on_*_line`
/// stalls that stream's reader.
///
/// Per node, `on_exit` or a terminal `on_error` is called exactly once, after
/// every line of that node has been delivered. `on_error` is also used for
/// non-terminal problems (`NodeErrorKind::StreamRead`); check
/// [`NodeError::is_terminal`].
pub trait Handlers: Send + Sync {
    fn on_stdout_line(&self, _node: &str, _line: &[u8]) {}

    fn on_stderr_line(&self, _node: &str, _line: &[u8]) {}

    fn on_exit(&self, _node: &str, _code: i32) {}

    fn on_error(&self, _node: &str, _error: &NodeError) {}
}
