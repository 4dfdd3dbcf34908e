// src/config/validate.rs

use std::path::Path;

use crate::config::duration::parse_duration;
use crate::config::model::{DEFAULT_DRAIN_GRACE, DEFAULT_MAXFLIGHT, Job, RawJobFile};
use crate::errors::{GcmdError, Result};
use crate::marker::DEFAULT_MARKER;
use crate::nodes::collect_nodes;

/// Turn a raw job file into a validated [`Job`].
///
/// Node sources are read here (the `[nodes].file`, resolved against
/// `base_dir`), durations are parsed, and defaults applied.
pub fn resolve_job(raw: RawJobFile, base_dir: &Path) -> Result<Job> {
    let nodes = collect_nodes(&raw.nodes, base_dir)?;

    let section = raw.job;
    let command = section.command.ok_or_else(|| {
        GcmdError::ConfigError(
            "no command given (set [job].command or pass it after `--`)".to_string(),
        )
    })?;

    let timeout = section.timeout.as_deref().map(parse_duration).transpose()?;
    let drain_grace = match section.drain_grace.as_deref() {
        Some(s) => parse_duration(s)?,
        None => DEFAULT_DRAIN_GRACE,
    };

    let job = Job {
        command,
        args: section.args,
        nodes,
        maxflight: section.maxflight.unwrap_or(DEFAULT_MAXFLIGHT),
        timeout,
        marker: section.marker.unwrap_or_else(|| DEFAULT_MARKER.to_string()),
        drain_grace,
    };

    validate_job(&job)?;
    Ok(job)
}

/// Check a job before anything is launched.
///
/// This checks:
/// - there is at least one node
/// - `maxflight >= 1`
/// - the command and the marker are non-empty
/// - a configured timeout is non-zero
pub fn validate_job(job: &Job) -> Result<()> {
    ensure_has_nodes(job)?;
    validate_maxflight(job)?;
    validate_command(job)?;
    validate_timeout(job)?;
    Ok(())
}

fn ensure_has_nodes(job: &Job) -> Result<()> {
    if job.nodes.is_empty() {
        return Err(GcmdError::ConfigError(
            "job must target at least one node".to_string(),
        ));
    }
    if let Some(pos) = job.nodes.iter().position(|n| n.is_empty()) {
        return Err(GcmdError::ConfigError(format!(
            "node #{} has an empty name",
            pos
        )));
    }
    Ok(())
}

fn validate_maxflight(job: &Job) -> Result<()> {
    if job.maxflight == 0 {
        return Err(GcmdError::ConfigError(
            "maxflight must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_command(job: &Job) -> Result<()> {
    if job.command.trim().is_empty() {
        return Err(GcmdError::ConfigError("command must not be empty".to_string()));
    }
    if job.marker.is_empty() {
        return Err(GcmdError::ConfigError("marker must not be empty".to_string()));
    }
    Ok(())
}

fn validate_timeout(job: &Job) -> Result<()> {
    if job.timeout.is_some_and(|t| t.is_zero()) {
        return Err(GcmdError::ConfigError(
            "timeout must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
