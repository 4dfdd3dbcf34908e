// src/output.rs

//! Terminal rendering for the `gcmd` binary.
//!
//! The engine never writes to the console itself; the binary passes
//! [`ConsolePrinter`] as its handlers and prints a summary from the
//! [`RunReport`] afterwards.

use std::io::{self, Write};

use crate::config::Job;
use crate::engine::{Handlers, RunReport};
use crate::errors::NodeError;
use crate::marker::replace_marker;
use crate::types::NodeStatus;

/// Prints node output as `node: line` on the matching standard stream.
///
/// Each line is written under the stream's lock, so lines from different
/// nodes never interleave mid-line.
#[derive(Debug, Clone, Copy)]
pub struct ConsolePrinter {
    prefix: bool,
}

impl ConsolePrinter {
    pub fn new(prefix: bool) -> Self {
        Self { prefix }
    }

    fn write_line(&self, out: &mut impl Write, node: &str, line: &[u8]) -> io::Result<()> {
        if self.prefix {
            out.write_all(node.as_bytes())?;
            out.write_all(b": ")?;
        }
        out.write_all(line)?;
        out.write_all(b"\n")
    }
}

impl Handlers for ConsolePrinter {
    fn on_stdout_line(&self, node: &str, line: &[u8]) {
        let stdout = io::stdout();
        let _ = self.write_line(&mut stdout.lock(), node, line);
    }

    fn on_stderr_line(&self, node: &str, line: &[u8]) {
        let stderr = io::stderr();
        let _ = self.write_line(&mut stderr.lock(), node, line);
    }

    fn on_error(&self, node: &str, error: &NodeError) {
        let stderr = io::stderr();
        let _ = writeln!(stderr.lock(), "gcmd: {node}: {error}");
    }
}

/// Write a one-line-per-node summary, unsuccessful nodes only, plus totals.
pub fn write_summary(out: &mut impl Write, report: &RunReport) -> io::Result<()> {
    let mut failed = 0usize;
    for result in report.unsuccessful() {
        failed += 1;
        match &result.status {
            NodeStatus::Exited(code) => writeln!(out, "  {}: exit code {}", result.node, code)?,
            NodeStatus::Failed(err) => writeln!(out, "  {}: {}", result.node, err)?,
        }
    }
    writeln!(
        out,
        "gcmd: {} node(s), {} succeeded, {} unsuccessful",
        report.len(),
        report.len() - failed,
        failed
    )
}

/// Dry-run output: the resolved command line of every invocation.
pub fn write_dry_run(out: &mut impl Write, job: &Job) -> io::Result<()> {
    writeln!(out, "gcmd dry-run")?;
    writeln!(out, "  maxflight = {}", job.maxflight)?;
    match job.timeout {
        Some(t) => writeln!(out, "  timeout = {:?}", t)?,
        None => writeln!(out, "  timeout = none")?,
    }
    writeln!(out, "  marker = {}", job.marker)?;
    writeln!(out)?;

    writeln!(out, "invocations ({}):", job.nodes.len())?;
    for node in &job.nodes {
        let args = replace_marker(&job.args, &job.marker, node);
        if args.is_empty() {
            writeln!(out, "  - {node}: {}", job.command)?;
        } else {
            writeln!(out, "  - {node}: {} {}", job.command, args.join(" "))?;
        }
    }
    Ok(())
}
