// src/nodes/mod.rs

//! Building the node list.
//!
//! The engine only ever sees a `Vec<NodeName>`; this module turns the
//! `[nodes]` config section (inline list, a nodes file, include/exclude
//! regexes) and `-n a,b,c` style CLI values into that list.

pub mod filter;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::NodesSection;
use crate::errors::Result;
use crate::types::NodeName;

pub use filter::NodeFilter;

/// Collect nodes from a `[nodes]` section.
///
/// Inline `list` entries come first, then the lines of `file`. Duplicates are
/// kept: each occurrence is its own invocation.
pub fn collect_nodes(section: &NodesSection, base_dir: &Path) -> Result<Vec<NodeName>> {
    let mut nodes = split_node_args(&section.list);

    if let Some(file) = &section.file {
        let path = if file.is_absolute() {
            file.clone()
        } else {
            base_dir.join(file)
        };
        let from_file = read_nodes_file(&path)?;
        debug!(path = ?path, count = from_file.len(), "read nodes file");
        nodes.extend(from_file);
    }

    let filter = NodeFilter::new(section.include.as_deref(), section.exclude.as_deref())?;
    let before = nodes.len();
    let nodes = filter.apply(nodes);
    if nodes.len() != before {
        debug!(before, after = nodes.len(), ?filter, "filtered node list");
    }

    Ok(nodes)
}

/// Read a nodes file: one node per line, blank lines and `#` comments skipped.
pub fn read_nodes_file(path: &Path) -> Result<Vec<NodeName>> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_node_list(&contents))
}

pub fn parse_node_list(contents: &str) -> Vec<NodeName> {
    contents
        .lines()
        .map(|line| match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        })
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expand `["a,b", "c"]` into `["a", "b", "c"]`, dropping empty pieces.
pub fn split_node_args(values: &[String]) -> Vec<NodeName> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
