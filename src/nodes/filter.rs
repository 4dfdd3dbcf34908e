// src/nodes/filter.rs

use std::fmt;

use regex::Regex;

use crate::errors::{GcmdError, Result};
use crate::types::NodeName;

/// Compiled include/exclude patterns for the node list.
///
/// A node is kept when it matches `include` (or no include is set) and does
/// not match `exclude`.
#[derive(Clone, Default)]
pub struct NodeFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl fmt::Debug for NodeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeFilter")
            .field("include", &self.include.as_ref().map(Regex::as_str))
            .field("exclude", &self.exclude.as_ref().map(Regex::as_str))
            .finish()
    }
}

impl NodeFilter {
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(Self {
            include: include.map(|p| compile("include", p)).transpose()?,
            exclude: exclude.map(|p| compile("exclude", p)).transpose()?,
        })
    }

    pub fn is_noop(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }

    pub fn matches(&self, node: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(node) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(node) {
                return false;
            }
        }
        true
    }

    /// Keep matching nodes, preserving order and duplicates.
    pub fn apply(&self, nodes: Vec<NodeName>) -> Vec<NodeName> {
        if self.is_noop() {
            return nodes;
        }
        nodes.into_iter().filter(|n| self.matches(n)).collect()
    }
}

fn compile(which: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        GcmdError::ConfigError(format!("invalid {} pattern '{}': {}", which, pattern, e))
    })
}
