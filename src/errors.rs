// src/errors.rs

//! Crate-wide error types.
//!
//! - [`GcmdError`] is what a whole run (or config load) can fail with.
//! - [`NodeError`] is a per-node failure. It never aborts a run; it is
//!   handed to `Handlers::on_error` and recorded in the run report.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcmdError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, GcmdError>;

/// Classification of a per-node failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeErrorKind {
    /// stdout/stderr pipes could not be set up; no process is left running.
    PipeSetup,
    /// The process could not be started (missing executable, permissions...).
    ProcessStart,
    /// The configured timeout elapsed and the process was killed.
    Timeout,
    /// Waiting for the child failed at the OS level.
    Wait,
    /// Reading one of the output streams failed. Not terminal.
    StreamRead,
    /// The invocation task panicked (usually inside a handler).
    Panicked,
}

impl NodeErrorKind {
    /// Whether this kind ends the invocation. Everything but `StreamRead` does.
    pub fn is_terminal(self) -> bool {
        !matches!(self, NodeErrorKind::StreamRead)
    }
}

impl fmt::Display for NodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeErrorKind::PipeSetup => "pipe setup error",
            NodeErrorKind::ProcessStart => "process start error",
            NodeErrorKind::Timeout => "timeout",
            NodeErrorKind::Wait => "wait error",
            NodeErrorKind::StreamRead => "stream read error",
            NodeErrorKind::Panicked => "invocation panicked",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct NodeError {
    pub kind: NodeErrorKind,
    pub message: String,
}

impl NodeError {
    pub fn new(kind: NodeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn pipe_setup(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::PipeSetup, message)
    }

    pub fn process_start(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::ProcessStart, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::Timeout, message)
    }

    pub fn stream_read(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::StreamRead, message)
    }

    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }
}
