//! Folding identical sibling subtrees into one `N*[...]` line.
//!
//! Two subtrees look the same when their display text matches, both have or
//! both lack children, and (recursively) their first children by name look
//! the same. Only the first child is compared; the remaining children are
//! not, which keeps the check linear in depth.
//!
//! Whether a node's own children can be folded is memoized per node, so the
//! top-down pass evaluates bottom-up at most once per node.

use super::{NodeId, Scope, Tree};
use tracing::debug;

impl Tree<'_> {
    /// Fold duplicate siblings everywhere inside `scope`.
    pub fn compact(&mut self, scope: &Scope) {
        match scope {
            Scope::Forest { by_name, .. } => {
                self.compact_group(&by_name.entries());
            }
            Scope::Subtree(target) => {
                self.compact_node(*target);
            }
            Scope::Chain(chain) => {
                if let Some(&target) = chain.last() {
                    self.compact_node(target);
                }
            }
            Scope::Empty => {}
        }

        let folded = self.nodes.iter().filter(|n| n.is_absorbed()).count();
        debug!(folded, "compacted identical subtrees");
    }

    /// Whether the children of `id` form one uniform, foldable group.
    fn compact_node(&mut self, id: NodeId) -> bool {
        if let Some(done) = self.nodes[id.0].compact {
            return done;
        }
        let children = self.nodes[id.0].by_name.entries();
        let result = self.compact_group(&children);
        self.nodes[id.0].compact = Some(result);
        result
    }

    /// Fold runs inside one sibling group, given in name order.
    ///
    /// Returns true when every member is itself foldable and all members
    /// share one display text.
    fn compact_group(&mut self, group: &[(String, NodeId)]) -> bool {
        let mut previous: Option<NodeId> = None;
        let mut uniform = true;

        for (position, (key, id)) in group.iter().enumerate() {
            let id = *id;
            if self.nodes[id.0].duplicates != 0 {
                continue;
            }

            let foldable = self.compact_node(id);
            if uniform
                && foldable
                && previous.is_none_or(|p| self.display(p) == self.display(id))
            {
                previous = Some(id);
            } else {
                uniform = false;
            }

            if !foldable {
                continue;
            }

            let mut run = 1;
            for (_, other) in group[position + 1..].iter().take_while(|(k, _)| k == key) {
                let other = *other;
                if self.nodes[other.0].duplicates != 0 {
                    continue;
                }
                if self.compact_node(other) && self.equivalent(id, other) {
                    self.nodes[other.0].duplicates = 1;
                    run += 1;
                }
            }

            if run > 1 {
                self.nodes[id.0].duplicates = run;
            }
        }

        uniform
    }

    /// Whether `two` prints the same as `one`. On a match, `one` takes over
    /// the highlight of `two` so folding never hides a highlighted chain.
    fn equivalent(&mut self, one: NodeId, two: NodeId) -> bool {
        if self.display(one) != self.display(two) {
            return false;
        }

        let first = (
            self.nodes[one.0].by_name.first(),
            self.nodes[two.0].by_name.first(),
        );
        match first {
            (None, None) => {}
            (Some(a), Some(b)) => {
                if !self.equivalent(a, b) {
                    return false;
                }
            }
            _ => return false,
        }

        if self.nodes[two.0].highlight {
            self.nodes[one.0].highlight = true;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{Config, Selection};
    use crate::owners::StaticUsers;
    use crate::tree::tests::{rec, users};
    use crate::tree::Tree;
    use ptree_common::{ProcessId, ProcessRecord};

    fn dup(tree: &Tree<'_>, pid: u32) -> usize {
        tree.node(tree.find(ProcessId(pid)).unwrap()).duplicates()
    }

    fn compacted<'a>(
        config: &'a Config,
        owners: &'a StaticUsers,
        records: Vec<ProcessRecord>,
    ) -> Tree<'a> {
        let mut tree = Tree::build(config, owners, records);
        let scope = tree.scope();
        tree.compact(&scope);
        tree
    }

    #[test]
    fn test_identical_leaves_fold() {
        let config = Config::default();
        let owners = users();
        let tree = compacted(
            &config,
            &owners,
            vec![
                rec(1, 0, 0, "init"),
                rec(10, 1, 0, "sshd"),
                rec(20, 10, 0, "bash"),
                rec(21, 10, 0, "bash"),
                rec(22, 10, 0, "bash"),
            ],
        );
        assert_eq!(dup(&tree, 20), 3);
        assert_eq!(dup(&tree, 21), 1);
        assert_eq!(dup(&tree, 22), 1);
        assert_eq!(dup(&tree, 10), 0);
    }

    #[test]
    fn test_leaf_and_parent_do_not_fold() {
        let config = Config::default();
        let owners = users();
        let tree = compacted(
            &config,
            &owners,
            vec![
                rec(1, 0, 0, "init"),
                rec(10, 1, 0, "sh"),
                rec(11, 1, 0, "sh"),
                rec(12, 11, 0, "sleep"),
            ],
        );
        assert_eq!(dup(&tree, 10), 0);
        assert_eq!(dup(&tree, 11), 0);
    }

    #[test]
    fn test_whole_subtrees_fold() {
        let config = Config::default();
        let owners = users();
        let tree = compacted(
            &config,
            &owners,
            vec![
                rec(1, 0, 0, "init"),
                rec(10, 1, 0, "httpd"),
                rec(11, 10, 0, "worker"),
                rec(12, 1, 0, "httpd"),
                rec(13, 12, 0, "worker"),
            ],
        );
        assert_eq!(dup(&tree, 10), 2);
        assert_eq!(dup(&tree, 12), 1);
        // The child of the absorbed subtree is never looked at again.
        assert_eq!(dup(&tree, 13), 0);
    }

    #[test]
    fn test_mixed_children_block_parent_folding() {
        // Each sshd has two different children, so its group is not uniform
        // and the two sshd subtrees stay apart.
        let config = Config::default();
        let owners = users();
        let tree = compacted(
            &config,
            &owners,
            vec![
                rec(1, 0, 0, "init"),
                rec(10, 1, 0, "sshd"),
                rec(11, 10, 0, "bash"),
                rec(12, 10, 0, "vim"),
                rec(20, 1, 0, "sshd"),
                rec(21, 20, 0, "bash"),
                rec(22, 20, 0, "vim"),
            ],
        );
        assert_eq!(dup(&tree, 10), 0);
        assert_eq!(dup(&tree, 20), 0);
    }

    #[test]
    fn test_first_child_only_comparison() {
        // Both parents have a uniform group of children, and their first
        // children match, so they fold even though the counts differ.
        let config = Config::default();
        let owners = users();
        let tree = compacted(
            &config,
            &owners,
            vec![
                rec(1, 0, 0, "init"),
                rec(10, 1, 0, "pool"),
                rec(11, 10, 0, "task"),
                rec(20, 1, 0, "pool"),
                rec(21, 20, 0, "task"),
                rec(22, 20, 0, "task"),
            ],
        );
        assert_eq!(dup(&tree, 10), 2);
        assert_eq!(dup(&tree, 20), 1);
    }

    #[test]
    fn test_highlight_moves_to_representative() {
        let config = Config::default();
        let owners = users();
        let mut tree = Tree::build(
            &config,
            &owners,
            vec![
                rec(1, 0, 0, "init"),
                rec(20, 1, 0, "getty"),
                rec(21, 1, 0, "getty"),
            ],
        );
        tree.highlight(ProcessId(21));
        let scope = tree.scope();
        tree.compact(&scope);

        let rep = tree.find(ProcessId(20)).unwrap();
        assert_eq!(tree.node(rep).duplicates(), 2);
        assert!(tree.node(rep).is_highlighted());
    }

    #[test]
    fn test_roots_fold_too() {
        let config = Config {
            show_kernel: true,
            ..Config::default()
        };
        let owners = users();
        let tree = compacted(
            &config,
            &owners,
            vec![
                rec(1, 0, 0, "init"),
                rec(2, 0, 0, "kthread"),
                rec(3, 0, 0, "kthread"),
            ],
        );
        assert_eq!(dup(&tree, 2), 2);
        assert_eq!(dup(&tree, 3), 1);
    }

    #[test]
    fn test_subtree_scope_compacts_below_target() {
        let config = Config {
            selection: Selection::Pid(ProcessId(10)),
            ..Config::default()
        };
        let owners = users();
        let tree = compacted(
            &config,
            &owners,
            vec![
                rec(1, 0, 0, "init"),
                rec(5, 1, 0, "bash"),
                rec(6, 1, 0, "bash"),
                rec(10, 1, 0, "sshd"),
                rec(20, 10, 0, "bash"),
                rec(21, 10, 0, "bash"),
            ],
        );
        assert_eq!(dup(&tree, 20), 2);
        // Siblings of the target are outside the scope.
        assert_eq!(dup(&tree, 5), 0);
    }
}
