//! The process forest.
//!
//! All nodes live in one arena owned by [`Tree`]; parent and child links are
//! [`NodeId`] indices into it. A run goes through these steps in order:
//!
//! 1. [`Tree::build`]: filter records, link children to parents
//! 2. [`Tree::highlight`]: mark a process and its ancestors
//! 3. [`Tree::scope`]: decide which roots (or which subtree) to print
//! 4. [`Tree::compact`]: fold identical sibling subtrees
//! 5. [`Tree::render`]: draw the result

mod compact;
mod highlight;
mod index;
mod walk;

pub use index::SiblingIndex;

use crate::config::{Config, Selection, SortOrder};
use crate::owners::OwnerDirectory;
use crate::visual;
use ptree_common::{OwnerId, ProcessId, ProcessRecord};
use std::cell::OnceCell;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Index of a node in its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug)]
pub struct Node {
    record: ProcessRecord,
    /// Escaped command name; the name-order key among siblings.
    name: String,
    parent: Option<NodeId>,
    by_pid: SiblingIndex<ProcessId>,
    by_name: SiblingIndex<String>,
    highlight: bool,
    root: bool,
    display: OnceCell<String>,
    compact: Option<bool>,
    /// 0: ordinary, 1: folded into a sibling, n > 1: stands for n subtrees.
    duplicates: usize,
}

impl Node {
    fn new(record: ProcessRecord) -> Self {
        Node {
            name: visual::visual(record.comm.as_bytes()),
            record,
            parent: None,
            by_pid: SiblingIndex::default(),
            by_name: SiblingIndex::default(),
            highlight: false,
            root: false,
            display: OnceCell::new(),
            compact: None,
            duplicates: 0,
        }
    }

    pub fn pid(&self) -> ProcessId {
        self.record.pid
    }

    pub fn uid(&self) -> OwnerId {
        self.record.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Folded into a sibling; never printed.
    pub fn is_absorbed(&self) -> bool {
        self.duplicates == 1
    }

    pub fn has_children(&self) -> bool {
        !self.by_name.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.by_name.len()
    }
}

/// What gets printed.
#[derive(Debug, Clone)]
pub enum Scope {
    /// Several trees; `by_name` holds the same roots keyed by escaped name.
    Forest {
        by_pid: Vec<NodeId>,
        by_name: SiblingIndex<String>,
    },
    /// One subtree.
    Subtree(NodeId),
    /// Ancestors from the topmost down to the target, then the target's
    /// whole subtree.
    Chain(Vec<NodeId>),
    /// The selected process does not exist.
    Empty,
}

pub struct Tree<'a> {
    config: &'a Config,
    owners: &'a dyn OwnerDirectory,
    nodes: Vec<Node>,
    by_pid: BTreeMap<ProcessId, NodeId>,
}

impl<'a> Tree<'a> {
    /// Whether a record takes part in the tree at all.
    pub fn includes(config: &Config, record: &ProcessRecord) -> bool {
        config.show_kernel || !record.is_kernel()
    }

    /// Create one node per eligible record and link each to its parent.
    ///
    /// A record whose parent pid is unknown (or is itself) becomes a root.
    /// When a snapshot repeats a pid, lookups resolve to the first record.
    pub fn build(
        config: &'a Config,
        owners: &'a dyn OwnerDirectory,
        records: Vec<ProcessRecord>,
    ) -> Self {
        let total = records.len();
        let mut records: Vec<ProcessRecord> = records
            .into_iter()
            .filter(|r| Self::includes(config, r))
            .collect();
        records.sort_by_key(|r| r.pid);

        let nodes: Vec<Node> = records.into_iter().map(Node::new).collect();
        let mut by_pid = BTreeMap::new();
        for (index, node) in nodes.iter().enumerate() {
            by_pid.entry(node.pid()).or_insert(NodeId(index));
        }

        let mut tree = Tree {
            config,
            owners,
            nodes,
            by_pid,
        };

        for index in 0..tree.nodes.len() {
            let child = NodeId(index);
            let ppid = tree.nodes[index].record.ppid;
            if let Some(&parent) = tree.by_pid.get(&ppid) {
                tree.attach(parent, child);
            }
        }

        debug!(
            total,
            eligible = tree.nodes.len(),
            "built process tree"
        );
        tree
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if parent == child {
            return;
        }
        // A parent chain leading back to the child would be a cycle.
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            trace!(
                pid = %self.nodes[child.0].pid(),
                ppid = %self.nodes[parent.0].pid(),
                "ignoring parent link that would form a cycle"
            );
            return;
        }

        let (pid, name) = {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            (node.pid(), node.name.clone())
        };
        let parent = &mut self.nodes[parent.0];
        parent.by_pid.insert(pid, child);
        parent.by_name.insert(name, child);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn find(&self, pid: ProcessId) -> Option<NodeId> {
        self.by_pid.get(&pid).copied()
    }

    /// All nodes in pid order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// `id` itself, then its parent, up to the root.
    pub fn lineage(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |&id| self.nodes[id.0].parent)
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.lineage(id).skip(1)
    }

    /// Children in the configured order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let node = &self.nodes[id.0];
        match self.config.sort {
            SortOrder::Name => node.by_name.ids().collect(),
            SortOrder::Pid => node.by_pid.ids().collect(),
        }
    }

    /// The text printed for a node: name or title, plus pid and owner
    /// decorations. Computed once per node.
    pub fn display(&self, id: NodeId) -> &str {
        self.nodes[id.0].display.get_or_init(|| self.describe(id))
    }

    fn describe(&self, id: NodeId) -> String {
        let config = self.config;
        let node = &self.nodes[id.0];

        let mut text = if config.show_titles {
            node.record
                .argv
                .as_ref()
                .and_then(|argv| argv.first())
                .map(|title| visual::visual(title.as_bytes()))
                .unwrap_or_else(|| node.name.clone())
        } else {
            node.name.clone()
        };

        let owner_changes = config.uid_changes
            && if node.root {
                !matches!(config.selection, Selection::User { .. }) && node.uid() != OwnerId::ROOT
            } else {
                node.parent
                    .is_some_and(|parent| self.nodes[parent.0].uid() != node.uid())
            };

        let mut decorations = Vec::new();
        if config.show_pids {
            decorations.push(node.pid().to_string());
        }
        if owner_changes {
            decorations.push(
                self.owners
                    .name_of(node.uid())
                    .unwrap_or_else(|| node.uid().to_string()),
            );
        }

        if decorations.is_empty() {
            return text;
        }
        if config.show_arguments {
            for decoration in decorations {
                text.push(',');
                text.push_str(&decoration);
            }
        } else {
            text.push('(');
            text.push_str(&decorations.join(","));
            text.push(')');
        }
        text
    }

    /// Work out which part of the forest the selection asks for, marking
    /// forest roots along the way.
    pub fn scope(&mut self) -> Scope {
        let config = self.config;
        let scope = match &config.selection {
            Selection::Pid(pid) => match self.find(*pid) {
                None => Scope::Empty,
                Some(target) if config.show_parents => {
                    let mut chain: Vec<NodeId> = self.lineage(target).collect();
                    chain.reverse();
                    Scope::Chain(chain)
                }
                Some(target) => Scope::Subtree(target),
            },
            Selection::All => self.forest(|tree, id| tree.nodes[id.0].parent.is_none()),
            Selection::User { uid, .. } => {
                let uid = *uid;
                self.forest(|tree, id| {
                    tree.nodes[id.0].uid() == uid
                        && tree.ancestors(id).all(|a| tree.nodes[a.0].uid() != uid)
                })
            }
            Selection::Name(pattern) => {
                let pattern = pattern.clone();
                self.forest(|tree, id| {
                    pattern.matches(&tree.nodes[id.0].name)
                        && tree
                            .ancestors(id)
                            .all(|a| !pattern.matches(&tree.nodes[a.0].name))
                })
            }
        };

        if let Scope::Forest { by_pid, .. } = &scope {
            debug!(roots = by_pid.len(), "selected root processes");
        }
        scope
    }

    fn forest<F>(&mut self, is_root: F) -> Scope
    where
        F: Fn(&Tree<'_>, NodeId) -> bool,
    {
        let roots: Vec<NodeId> = {
            let tree: &Tree<'_> = self;
            tree.ids().filter(|&id| is_root(tree, id)).collect()
        };
        let mut by_name = SiblingIndex::default();
        for &id in &roots {
            self.nodes[id.0].root = true;
            by_name.insert(self.nodes[id.0].name.clone(), id);
        }
        Scope::Forest {
            by_pid: roots,
            by_name,
        }
    }
}
