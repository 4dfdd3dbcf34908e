use std::fmt;

use crate::errors::{NodeError, NodeErrorKind};

/// Canonical node name type used throughout the engine.
pub type NodeName = String;

/// Which output stream of a process a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// Terminal state of one node invocation.
///
/// A nonzero exit code is still `Exited`; it is up to the caller to decide
/// whether it counts as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeStatus {
    Exited(i32),
    Failed(NodeError),
}

impl NodeStatus {
    /// `true` only for a natural exit with code 0.
    pub fn success(&self) -> bool {
        matches!(self, NodeStatus::Exited(0))
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            NodeStatus::Exited(code) => Some(*code),
            NodeStatus::Failed(_) => None,
        }
    }

    pub fn failure_kind(&self) -> Option<NodeErrorKind> {
        match self {
            NodeStatus::Exited(_) => None,
            NodeStatus::Failed(err) => Some(err.kind),
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Exited(code) => write!(f, "exited({code})"),
            NodeStatus::Failed(err) => write!(f, "failed({err})"),
        }
    }
}
