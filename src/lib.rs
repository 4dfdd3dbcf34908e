// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod marker;
pub mod nodes;
pub mod output;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::cli::CliArgs;
use crate::config::{RawJobFile, config_root_dir, default_config_path, load_from_path, resolve_job};
use crate::marker::template_uses_marker;
use crate::output::{ConsolePrinter, write_dry_run, write_summary};

pub use crate::config::Job;
pub use crate::engine::{Dispatcher, Handlers, RunEvent, RunReport};
pub use crate::errors::{GcmdError, NodeError, NodeErrorKind};
pub use crate::types::{NodeStatus, StreamKind};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - job file loading and CLI overrides
/// - node list collection
/// - the dispatcher with the console printer as handlers
///
/// Returns `true` when every node exited with code 0.
pub async fn run(args: CliArgs) -> Result<bool> {
    let dispatcher = Dispatcher::new(build_job(&args)?);

    if args.dry_run {
        write_dry_run(&mut std::io::stdout().lock(), dispatcher.job())?;
        debug!("dry-run complete (no execution)");
        return Ok(true);
    }

    let printer = Arc::new(ConsolePrinter::new(!args.no_prefix));
    let report = dispatcher.run(printer).await?;

    write_summary(&mut std::io::stderr().lock(), &report)?;
    Ok(report.all_succeeded())
}

/// Resolve the job to run from the optional job file plus CLI flags.
pub fn build_job(args: &CliArgs) -> crate::errors::Result<Job> {
    let (mut raw, base_dir) = match &args.config {
        Some(path) => (load_from_path(path)?, config_root_dir(path)),
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                debug!(path = ?default_path, "using default job file");
                (load_from_path(&default_path)?, config_root_dir(&default_path))
            } else {
                (RawJobFile::default(), current_dir())
            }
        }
    };

    apply_cli_overrides(&mut raw, args, &current_dir());
    let job = resolve_job(raw, &base_dir)?;

    if job.nodes.len() > 1 && !template_uses_marker(&job.args, &job.marker) {
        warn!(
            marker = %job.marker,
            nodes = job.nodes.len(),
            "arguments do not contain the marker; every node runs the same command"
        );
    }

    Ok(job)
}

/// Apply command-line values on top of a loaded job file.
///
/// Any node source given on the command line (`-n` or `--nodes-file`)
/// replaces both node sources of the file. Everything else overrides
/// field by field.
pub fn apply_cli_overrides(raw: &mut RawJobFile, args: &CliArgs, cwd: &Path) {
    if let Some((command, rest)) = args.command.split_first() {
        raw.job.command = Some(command.clone());
        raw.job.args = rest.to_vec();
    }

    if !args.nodes.is_empty() || args.nodes_file.is_some() {
        raw.nodes.list = args.nodes.clone();
        raw.nodes.file = args.nodes_file.as_ref().map(|p| absolutize(p, cwd));
    }
    if args.include.is_some() {
        raw.nodes.include = args.include.clone();
    }
    if args.exclude.is_some() {
        raw.nodes.exclude = args.exclude.clone();
    }

    if args.maxflight.is_some() {
        raw.job.maxflight = args.maxflight;
    }
    if args.timeout.is_some() {
        raw.job.timeout = args.timeout.clone();
    }
    if args.marker.is_some() {
        raw.job.marker = args.marker.clone();
    }
    if args.drain_grace.is_some() {
        raw.job.drain_grace = args.drain_grace.clone();
    }
}

fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
