//! One run of ptree, from snapshot to printed tree.

use crate::collect::{attach_arguments, SnapshotSource};
use crate::config::Config;
use crate::owners::OwnerDirectory;
use crate::render::Renderer;
use crate::tree::Tree;
use ptree_common::Result;
use std::io::Write;
use tracing::debug;

/// Take a snapshot from `source` and print its tree to `out`.
///
/// Returns the writer once everything was written and flushed.
pub fn print_tree<W: Write>(
    config: &Config,
    owners: &dyn OwnerDirectory,
    source: &dyn SnapshotSource,
    out: W,
) -> Result<W> {
    let mut records = source.list()?;
    let listed = records.len();
    records.retain(|record| Tree::includes(config, record));

    if config.show_arguments || config.show_titles {
        attach_arguments(source, &mut records);
    }

    let mut tree = Tree::build(config, owners, records);

    if let Some(pid) = config.highlight {
        if tree.highlight(pid).is_none() {
            debug!(%pid, "highlighted process is not in the snapshot");
        }
    }

    let scope = tree.scope();
    if config.compact {
        tree.compact(&scope);
    }

    let mut renderer = Renderer::new(config, out);
    tree.render(&scope, &mut renderer)?;
    let lines = renderer.lines();
    let out = renderer.finish()?;

    debug!(listed, shown = tree.len(), lines, "printed process tree");
    Ok(out)
}
