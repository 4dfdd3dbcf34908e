// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs one node's command with `tokio::process::Command` and
//! reports back through the caller's [`crate::engine::Handlers`].
//!
//! - [`backend`] provides the `ProcessBackend` trait and the production
//!   `TokioProcessBackend`; tests can replace it with a fake.
//! - [`gate`] bounds how many invocations run at once.
//! - [`invocation`] owns one node's process from spawn to terminal report.
//! - [`stream_reader`] drains one stdout/stderr pipe line by line.

pub mod backend;
pub mod gate;
pub mod invocation;
pub mod stream_reader;

pub use backend::{
    BoxFuture, OutputStream, ProcessBackend, ProcessHandle, SpawnedProcess, TokioProcessBackend,
};
pub use gate::{ConcurrencyGate, GatePermit};
pub use invocation::{InvocationContext, InvocationState, NodeInvocation};
pub use stream_reader::StreamReader;
