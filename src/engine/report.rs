// src/engine/report.rs

use std::collections::BTreeMap;

use crate::types::{NodeName, NodeStatus};

/// Terminal status of one entry of the node list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeResult {
    /// Position in the job's node list.
    pub index: usize,
    pub node: NodeName,
    pub status: NodeStatus,
}

/// Aggregate result of a run, in node-list order.
///
/// There is one entry per invocation, so a node listed twice appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    results: Vec<NodeResult>,
}

impl RunReport {
    pub fn new(mut results: Vec<NodeResult>) -> Self {
        results.sort_by_key(|r| r.index);
        Self { results }
    }

    pub fn results(&self) -> &[NodeResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Status of the first invocation for `node`.
    pub fn status(&self, node: &str) -> Option<&NodeStatus> {
        self.results
            .iter()
            .find(|r| r.node == node)
            .map(|r| &r.status)
    }

    /// Statuses of every invocation for `node`, in dispatch order.
    pub fn statuses(&self, node: &str) -> Vec<&NodeStatus> {
        self.results
            .iter()
            .filter(|r| r.node == node)
            .map(|r| &r.status)
            .collect()
    }

    /// Node name -> status. For duplicated nodes the first invocation wins;
    /// use [`RunReport::results`] to see all of them.
    pub fn by_node(&self) -> BTreeMap<&str, &NodeStatus> {
        let mut map = BTreeMap::new();
        for r in &self.results {
            map.entry(r.node.as_str()).or_insert(&r.status);
        }
        map
    }

    /// `true` when every invocation exited with code 0.
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.status.success())
    }

    /// Invocations that failed or exited nonzero.
    pub fn unsuccessful(&self) -> impl Iterator<Item = &NodeResult> {
        self.results.iter().filter(|r| !r.status.success())
    }
}
