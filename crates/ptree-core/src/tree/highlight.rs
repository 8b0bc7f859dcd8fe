//! Emphasis on one process and everything above it.

use super::{NodeId, Tree};
use ptree_common::ProcessId;
use tracing::debug;

impl Tree<'_> {
    /// Mark `pid` and each of its ancestors. Returns the marked node, or
    /// `None` when no such process is in the tree.
    pub fn highlight(&mut self, pid: ProcessId) -> Option<NodeId> {
        let target = self.find(pid)?;
        let chain: Vec<NodeId> = self.lineage(target).collect();
        for &id in &chain {
            self.nodes[id.0].highlight = true;
        }
        debug!(%pid, depth = chain.len(), "highlighted ancestor chain");
        Some(target)
    }
}
