// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `gcmd`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "gcmd",
    version,
    about = "Run one command across many nodes with bounded parallelism.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a job file (TOML).
    ///
    /// If omitted, `Gcmd.toml` in the current directory is used when it
    /// exists. Command-line options override values from the file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Target node; repeat or separate with commas.
    #[arg(short = 'n', long = "node", value_name = "NAME")]
    pub nodes: Vec<String>,

    /// File with one node per line (`#` starts a comment).
    #[arg(long, value_name = "PATH")]
    pub nodes_file: Option<PathBuf>,

    /// Only run nodes matching this regex.
    #[arg(long, value_name = "REGEX")]
    pub include: Option<String>,

    /// Skip nodes matching this regex.
    #[arg(long, value_name = "REGEX")]
    pub exclude: Option<String>,

    /// Maximum number of commands running at once.
    #[arg(short = 'm', long, value_name = "N")]
    pub maxflight: Option<usize>,

    /// Kill a node's command after this long (e.g. `30s`, `500ms`, `2m`).
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Placeholder replaced by the node name in the arguments.
    #[arg(long, value_name = "TOKEN")]
    pub marker: Option<String>,

    /// How long to keep reading output after a timed-out command is killed.
    #[arg(long, value_name = "DURATION")]
    pub drain_grace: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GCMD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the resolved command for every node, run nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Print output lines without the `node: ` prefix.
    #[arg(long)]
    pub no_prefix: bool,

    /// Command and argument template, after `--`.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
