//! Per-parent ordering of children.

use super::NodeId;
use std::collections::BTreeMap;

/// Children ordered by a key, ties kept in insertion order.
///
/// Equal keys are allowed: siblings with the same name are the very thing
/// compaction looks for, and a malformed snapshot may repeat a pid.
#[derive(Debug, Clone)]
pub struct SiblingIndex<K> {
    entries: BTreeMap<(K, u64), NodeId>,
    next: u64,
}

impl<K> Default for SiblingIndex<K> {
    fn default() -> Self {
        SiblingIndex {
            entries: BTreeMap::new(),
            next: 0,
        }
    }
}

impl<K: Ord + Clone> SiblingIndex<K> {
    pub fn insert(&mut self, key: K, id: NodeId) {
        self.entries.insert((key, self.next), id);
        self.next += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The child that sorts first.
    pub fn first(&self) -> Option<NodeId> {
        self.entries.values().next().copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.values().copied()
    }

    /// `(key, id)` pairs in order.
    pub fn entries(&self) -> Vec<(K, NodeId)> {
        self.entries
            .iter()
            .map(|((key, _), id)| (key.clone(), *id))
            .collect()
    }
}
