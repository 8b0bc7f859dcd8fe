//! Depth-first walk feeding the renderer.

use super::{NodeId, Scope, Tree};
use crate::config::SortOrder;
use crate::render::Renderer;
use crate::visual;
use std::io::{self, Write};

impl Tree<'_> {
    /// Draw everything in `scope`.
    pub fn render<W: Write>(
        &self,
        scope: &Scope,
        renderer: &mut Renderer<'_, W>,
    ) -> io::Result<()> {
        match scope {
            Scope::Forest { by_pid, by_name } => {
                let roots: Vec<NodeId> = match self.config.sort {
                    SortOrder::Name => by_name.ids().collect(),
                    SortOrder::Pid => by_pid.clone(),
                };
                for root in roots {
                    renderer.position(true, true);
                    self.render_node(renderer, root, &[])?;
                }
            }
            Scope::Subtree(target) => {
                renderer.position(true, true);
                self.render_node(renderer, *target, &[])?;
            }
            Scope::Chain(chain) => {
                if let Some((&top, below)) = chain.split_first() {
                    renderer.position(true, true);
                    self.render_node(renderer, top, below)?;
                }
            }
            Scope::Empty => {}
        }
        Ok(())
    }

    /// Draw `id` and its subtree. While `path` is non-empty only the next
    /// node on it is followed.
    fn render_node<W: Write>(
        &self,
        renderer: &mut Renderer<'_, W>,
        id: NodeId,
        path: &[NodeId],
    ) -> io::Result<()> {
        let node = &self.nodes[id.0];
        if node.is_absorbed() {
            return Ok(());
        }

        let children: Vec<NodeId> = match path.split_first() {
            Some((&next, _)) => vec![next],
            None => self
                .children(id)
                .into_iter()
                .filter(|&child| !self.nodes[child.0].is_absorbed())
                .collect(),
        };
        let below = path.get(1..).unwrap_or(&[]);

        renderer.node(self.display(id), node.highlight, node.duplicates);

        if self.config.show_arguments {
            if let Some(argv) = &node.record.argv {
                let count = argv.len().saturating_sub(1);
                for (index, arg) in argv.iter().skip(1).enumerate() {
                    renderer.argument(&visual::visual(arg.as_bytes()), index + 1 == count);
                }
            }
            renderer.node_done(children.is_empty())?;
        }

        let last = children.len().saturating_sub(1);
        for (index, &child) in children.iter().enumerate() {
            renderer.position(index == 0, index == last);
            self.render_node(renderer, child, below)?;
        }

        renderer.pop(!children.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{Config, Selection, SortOrder};
    use crate::owners::StaticUsers;
    use crate::render::{GlyphStyle, Renderer};
    use crate::tree::tests::{rec, users};
    use crate::tree::Tree;
    use ptree_common::{ProcessId, ProcessRecord};

    fn sample() -> Vec<ProcessRecord> {
        vec![
            rec(1, 0, 0, "init"),
            rec(10, 1, 0, "sshd"),
            rec(20, 10, 0, "bash"),
            rec(21, 10, 0, "bash"),
        ]
    }

    fn draw(config: &Config, records: Vec<ProcessRecord>) -> String {
        draw_with(config, &users(), records)
    }

    fn draw_with(config: &Config, owners: &StaticUsers, records: Vec<ProcessRecord>) -> String {
        let mut tree = Tree::build(config, owners, records);
        if let Some(pid) = config.highlight {
            tree.highlight(pid);
        }
        let scope = tree.scope();
        if config.compact {
            tree.compact(&scope);
        }
        let mut renderer = Renderer::new(config, Vec::new());
        tree.render(&scope, &mut renderer).unwrap();
        String::from_utf8(renderer.finish().unwrap()).unwrap()
    }

    fn uncompacted() -> Config {
        Config {
            compact: false,
            ..Config::default()
        }
    }

    #[test]
    fn test_uncompacted_ascii() {
        assert_eq!(
            draw(&uncompacted(), sample()),
            "init---sshd-+-bash\n            `-bash\n"
        );
    }

    #[test]
    fn test_uncompacted_unicode() {
        let config = Config {
            glyph_style: GlyphStyle::Unicode,
            ..uncompacted()
        };
        assert_eq!(
            draw(&config, sample()),
            "init───sshd─┬─bash\n            └─bash\n"
        );
    }

    #[test]
    fn test_compacted_leaves() {
        assert_eq!(
            draw(&Config::default(), sample()),
            "init---sshd---2*[bash]\n"
        );
    }

    #[test]
    fn test_bracket_closes_after_subtree() {
        let records = vec![
            rec(1, 0, 0, "init"),
            rec(10, 1, 0, "httpd"),
            rec(11, 10, 0, "worker"),
            rec(12, 1, 0, "httpd"),
            rec(13, 12, 0, "worker"),
            rec(30, 1, 0, "sshd"),
        ];
        assert_eq!(
            draw(&Config::default(), records),
            "init-+-2*[httpd---worker]\n     `-sshd\n"
        );
    }

    #[test]
    fn test_every_node_gets_a_line_without_compaction() {
        let records = vec![
            rec(1, 0, 0, "init"),
            rec(2, 1, 0, "a"),
            rec(3, 1, 0, "b"),
            rec(4, 3, 0, "c"),
            rec(5, 3, 0, "d"),
        ];
        let text = draw(&uncompacted(), records);
        assert_eq!(text, "init-+-a\n     `-b-+-c\n         `-d\n");
    }

    #[test]
    fn test_pid_selection_prints_subtree_only() {
        let config = Config {
            selection: Selection::Pid(ProcessId(20)),
            ..Config::default()
        };
        assert_eq!(draw(&config, sample()), "bash\n");

        let config = Config {
            selection: Selection::Pid(ProcessId(10)),
            ..Config::default()
        };
        assert_eq!(draw(&config, sample()), "sshd---2*[bash]\n");
    }

    #[test]
    fn test_show_parents_follows_chain() {
        let mut records = sample();
        records.push(rec(30, 1, 0, "cron"));
        records.push(rec(40, 20, 0, "vim"));
        let config = Config {
            selection: Selection::Pid(ProcessId(20)),
            show_parents: true,
            ..Config::default()
        };
        assert_eq!(draw(&config, records), "init---sshd---bash---vim\n");
    }

    #[test]
    fn test_numeric_sort_with_pids() {
        let records = vec![
            rec(1, 0, 0, "init"),
            rec(30, 1, 0, "alpha"),
            rec(20, 1, 0, "zeta"),
        ];
        let config = Config {
            sort: SortOrder::Pid,
            show_pids: true,
            compact: false,
            ..Config::default()
        };
        assert_eq!(
            draw(&config, records),
            "init(1)-+-zeta(20)\n        `-alpha(30)\n"
        );
    }

    #[test]
    fn test_arguments_mode() {
        let records = vec![
            rec(1, 0, 0, "init").with_argv(["/sbin/init"]),
            rec(10, 1, 0, "sshd").with_argv(["/usr/sbin/sshd", "-D"]),
        ];
        let config = Config {
            show_arguments: true,
            compact: false,
            ..Config::default()
        };
        assert_eq!(draw(&config, records), "init\n  `-sshd -D\n");
    }

    #[test]
    fn test_uid_transitions() {
        let records = vec![
            rec(1, 0, 0, "init"),
            rec(10, 1, 1000, "bash"),
            rec(11, 10, 1000, "vim"),
        ];
        let config = Config {
            uid_changes: true,
            ..Config::default()
        };
        assert_eq!(draw(&config, records), "init---bash(alice)---vim\n");
    }

    #[test]
    fn test_highlight_in_output() {
        let config = Config {
            highlight: Some(ProcessId(10)),
            ..uncompacted()
        };
        let text = draw(&config, sample());
        let first = text.lines().next().unwrap();
        assert_eq!(
            first,
            "\x1b[1minit\x1b[22m---\x1b[1msshd\x1b[22m-+-bash"
        );
    }

    #[test]
    fn test_control_characters_are_escaped() {
        let records = vec![rec(1, 0, 0, "init"), rec(2, 1, 0, "tab\there")];
        assert_eq!(draw(&Config::default(), records), "init---tab^Ihere\n");
    }

    #[test]
    fn test_empty_selection_prints_nothing() {
        let config = Config {
            selection: Selection::Pid(ProcessId(999)),
            ..Config::default()
        };
        assert_eq!(draw(&config, sample()), "");
    }

    #[test]
    fn test_width_limit_cuts_lines() {
        let config = Config {
            max_width: Some(10),
            ..uncompacted()
        };
        let text = draw(&config, sample());
        for line in text.lines() {
            assert!(line.chars().count() <= 10, "{line:?}");
        }
        assert_eq!(text.lines().next(), Some("init---ss+"));
    }
}
