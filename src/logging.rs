// src/logging.rs

//! Diagnostics for `gcmd`, via `tracing` + `tracing-subscriber`.
//!
//! Node output goes to stdout/stderr through the console printer; engine
//! diagnostics go to stderr through the subscriber set up here.
//!
//! The filter is chosen as:
//! 1. `--log-level` on the command line
//! 2. `GCMD_LOG`, either a bare level (`debug`) or `EnvFilter` directives
//!    (`gcmd::exec=trace,warn`)
//! 3. `warn`, so a normal run only shows problems

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::LogLevel;

/// Environment variable read when no `--log-level` is given.
pub const LOG_ENV: &str = "GCMD_LOG";

/// Install the global subscriber. Call once, before the run starts.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env_value.as_deref())?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .try_init()
        .context("installing the tracing subscriber")?;

    Ok(())
}

/// Resolve the filter from the CLI level and the raw `GCMD_LOG` value.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Result<EnvFilter> {
    if let Some(lvl) = cli_level {
        return Ok(level_filter(level_from_log_level(lvl)));
    }

    match env_value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => match parse_level_str(value) {
            Some(level) => Ok(level_filter(level)),
            None => EnvFilter::try_new(value)
                .with_context(|| format!("invalid {LOG_ENV} value '{value}'")),
        },
        None => Ok(level_filter(Level::WARN)),
    }
}

fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

/// Bare level names, case-insensitive. `warning` is accepted for `warn`.
pub fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
