#![allow(dead_code)]

use std::time::Duration;

use gcmd::cli::CliArgs;
use gcmd::config::Job;

/// Builder for `Job` to simplify test setup.
///
/// Defaults to `sh -c <script>` with no nodes, which is how most real-process
/// tests drive the engine.
pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    pub fn new(command: &str) -> Self {
        Self {
            job: Job::new(command, Vec::<String>::new(), Vec::<String>::new()),
        }
    }

    /// `sh -c '<script>' __NODE__`: the node name is `$0` inside the script.
    pub fn shell(script: &str) -> Self {
        Self::new("sh").arg("-c").arg(script).arg("__NODE__")
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.job.args.push(arg.to_string());
        self
    }

    pub fn node(mut self, node: &str) -> Self {
        self.job.nodes.push(node.to_string());
        self
    }

    pub fn nodes(mut self, nodes: &[&str]) -> Self {
        self.job.nodes.extend(nodes.iter().map(|n| n.to_string()));
        self
    }

    pub fn maxflight(mut self, n: usize) -> Self {
        self.job.maxflight = n;
        self
    }

    pub fn timeout(mut self, t: Duration) -> Self {
        self.job.timeout = Some(t);
        self
    }

    pub fn marker(mut self, marker: &str) -> Self {
        self.job.marker = marker.to_string();
        self
    }

    pub fn drain_grace(mut self, grace: Duration) -> Self {
        self.job.drain_grace = grace;
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

/// Builder for `CliArgs`, mirroring the command-line flags.
#[derive(Default)]
pub struct CliArgsBuilder {
    args: CliArgs,
}

impl CliArgsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.args.config = Some(path.into());
        self
    }

    pub fn node(mut self, node: &str) -> Self {
        self.args.nodes.push(node.to_string());
        self
    }

    pub fn nodes_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.args.nodes_file = Some(path.into());
        self
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.args.include = Some(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.args.exclude = Some(pattern.to_string());
        self
    }

    pub fn maxflight(mut self, n: usize) -> Self {
        self.args.maxflight = Some(n);
        self
    }

    pub fn timeout(mut self, t: &str) -> Self {
        self.args.timeout = Some(t.to_string());
        self
    }

    pub fn marker(mut self, marker: &str) -> Self {
        self.args.marker = Some(marker.to_string());
        self
    }

    pub fn command(mut self, argv: &[&str]) -> Self {
        self.args.command = argv.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> CliArgs {
        self.args
    }
}
