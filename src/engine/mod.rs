// src/engine/mod.rs

//! Fan-out engine.
//!
//! This module ties together:
//! - the [`Dispatcher`], which walks the node list under the concurrency gate
//!   and joins every invocation before returning
//! - the [`Handlers`] callback surface
//! - the [`RunReport`] summary returned by a run
//! - the [`RunEvent`] stream for callers that prefer events to callbacks
//!
//! Process-level work (spawning, draining, timeouts) lives in
//! [`crate::exec`].

pub mod dispatcher;
pub mod events;
pub mod handlers;
pub mod report;

pub use dispatcher::Dispatcher;
pub use events::{EventRun, EventSink, RunEvent};
pub use handlers::Handlers;
pub use report::{NodeResult, RunReport};
