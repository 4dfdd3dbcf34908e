// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::marker::DEFAULT_MARKER;
use crate::types::NodeName;

/// Default number of invocations allowed to run at once.
pub const DEFAULT_MAXFLIGHT: usize = 8;

/// How long readers may keep draining after a timed-out process was killed.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Immutable description of one fan-out run.
///
/// A `Job` can be built with invalid values (e.g. `maxflight = 0`); it is
/// validated by [`crate::config::validate_job`], which the dispatcher calls
/// before launching anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Executable to run for every node.
    pub command: String,
    /// Argument template; occurrences of `marker` are replaced per node.
    pub args: Vec<String>,
    /// Target nodes in dispatch order. Duplicates are separate invocations.
    pub nodes: Vec<NodeName>,
    /// Maximum number of invocations running at the same time.
    pub maxflight: usize,
    /// Per-invocation timeout; the process is killed when it elapses.
    pub timeout: Option<Duration>,
    /// Placeholder token substituted with the node name.
    pub marker: String,
    /// Grace period for draining output after a timeout kill.
    pub drain_grace: Duration,
}

impl Job {
    pub fn new(
        command: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        nodes: impl IntoIterator<Item = impl Into<NodeName>>,
    ) -> Self {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            nodes: nodes.into_iter().map(Into::into).collect(),
            maxflight: DEFAULT_MAXFLIGHT,
            timeout: None,
            marker: DEFAULT_MARKER.to_string(),
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }

    pub fn with_maxflight(mut self, maxflight: usize) -> Self {
        self.maxflight = maxflight;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }
}

/// Top-level job file as read from TOML.
///
/// ```toml
/// [job]
/// command = "ssh"
/// args = ["__NODE__", "uptime"]
/// maxflight = 4
/// timeout = "30s"
///
/// [nodes]
/// list = ["web1", "web2"]
/// file = "nodes.txt"
/// exclude = "^db"
/// ```
///
/// Every field is optional so the command line can fill in the rest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJobFile {
    #[serde(default)]
    pub job: JobSection,

    #[serde(default)]
    pub nodes: NodesSection,
}

/// `[job]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSection {
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    /// If `None`, [`DEFAULT_MAXFLIGHT`] is used.
    #[serde(default)]
    pub maxflight: Option<usize>,

    /// Duration string such as `"30s"`.
    #[serde(default)]
    pub timeout: Option<String>,

    #[serde(default)]
    pub marker: Option<String>,

    /// Duration string; defaults to [`DEFAULT_DRAIN_GRACE`].
    #[serde(default)]
    pub drain_grace: Option<String>,
}

/// `[nodes]` section.
///
/// `list` and the contents of `file` are concatenated (list first), then the
/// `include` / `exclude` regexes are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodesSection {
    #[serde(default)]
    pub list: Vec<String>,

    /// Relative paths are resolved against the config file's directory.
    #[serde(default)]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub include: Option<String>,

    #[serde(default)]
    pub exclude: Option<String>,
}
