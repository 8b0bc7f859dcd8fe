//! Resolved run configuration.
//!
//! This module handles:
//! - Option implications (`-a`/`-p`/`-n` turn compaction off)
//! - Glyph set and line width from the probed terminal
//! - Turning the selection options into a [`Selection`]
//!
//! The result is one immutable [`Config`], built once and shared by
//! reference with the tree builder, the compaction pass and the renderer.

pub mod number;
pub mod selection;

pub use selection::{NamePattern, Selection};

use crate::cli::{Cli, SelectionArg};
use crate::owners::OwnerDirectory;
use crate::render::{select_style, GlyphStyle};
use crate::terminal::TerminalCaps;
use number::{classify_pid, PidValue};
use ptree_common::{Error, ProcessId, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sibling order used when walking the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// By escaped command name, then discovery order.
    #[default]
    Name,
    /// By pid.
    Pid,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Print each process's arguments on its own line (`-a`).
    pub show_arguments: bool,
    pub glyph_style: GlyphStyle,
    /// Fold identical sibling subtrees into `N*[...]`.
    pub compact: bool,
    /// Process whose ancestor chain is printed in bold.
    pub highlight: Option<ProcessId>,
    pub show_kernel: bool,
    pub sort: SortOrder,
    pub show_pids: bool,
    /// Use argv[0] instead of the kernel's command name.
    pub show_titles: bool,
    /// Append the user name where the owner changes from the parent.
    pub uid_changes: bool,
    /// With a pid selection, print the chain of ancestors too (`-s`).
    pub show_parents: bool,
    pub selection: Selection,
    /// Column limit; `None` means lines are never cut.
    pub max_width: Option<usize>,
    /// The terminal wraps by itself after writing the last column.
    pub newline_hazard: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            show_arguments: false,
            glyph_style: GlyphStyle::Ascii,
            compact: true,
            highlight: None,
            show_kernel: false,
            sort: SortOrder::Name,
            show_pids: false,
            show_titles: false,
            uid_changes: false,
            show_parents: false,
            selection: Selection::All,
            max_width: None,
            newline_hazard: false,
        }
    }
}

impl Config {
    /// Build the run configuration from the command line and the terminal.
    pub fn resolve(cli: &Cli, caps: &TerminalCaps, owners: &dyn OwnerDirectory) -> Result<Config> {
        let requested = if cli.ascii {
            Some(GlyphStyle::Ascii)
        } else if cli.vt100 {
            Some(GlyphStyle::Vt100)
        } else if cli.unicode {
            Some(GlyphStyle::Unicode)
        } else {
            None
        };
        let glyph_style = select_style(requested, caps.is_terminal, caps.unicode_glyphs);

        let sort = if cli.numeric_sort {
            SortOrder::Pid
        } else {
            SortOrder::Name
        };

        let selection = match &cli.selection {
            Some(arg) => resolve_selection(arg, owners)?,
            None => Selection::All,
        };

        let highlight = cli
            .highlight
            .map(|pid| pid.unwrap_or_else(|| ProcessId(std::process::id())));

        let config = Config {
            show_arguments: cli.arguments,
            glyph_style,
            compact: !(cli.no_compact || cli.arguments || cli.show_pids || cli.numeric_sort),
            highlight,
            show_kernel: cli.show_kernel,
            sort,
            show_pids: cli.show_pids,
            show_titles: cli.show_titles,
            uid_changes: cli.uid_changes,
            show_parents: cli.show_parents,
            selection,
            max_width: caps.line_width(cli.long),
            newline_hazard: caps.newline_hazard,
        };

        debug!(
            glyphs = %config.glyph_style,
            width = ?config.max_width,
            compact = config.compact,
            sort = ?config.sort,
            "resolved configuration"
        );
        Ok(config)
    }
}

fn resolve_selection(arg: &SelectionArg, owners: &dyn OwnerDirectory) -> Result<Selection> {
    match arg {
        SelectionArg::Pid(pid) => Ok(Selection::Pid(*pid)),
        SelectionArg::User(name) => resolve_user(name, owners),
        SelectionArg::Glob(pattern) => NamePattern::glob(pattern).map(Selection::Name),
        SelectionArg::Regex(pattern) => NamePattern::regex(pattern).map(Selection::Name),
        SelectionArg::Target(text) => match classify_pid(text) {
            PidValue::Valid(pid) => Ok(Selection::Pid(pid)),
            PidValue::Invalid => resolve_user(text, owners),
            PidValue::TooSmall => Err(Error::NumberTooSmall(text.clone())),
            PidValue::TooLarge => Err(Error::NumberTooLarge(text.clone())),
        },
    }
}

fn resolve_user(name: &str, owners: &dyn OwnerDirectory) -> Result<Selection> {
    match owners.uid_of(name)? {
        Some(uid) => Ok(Selection::User {
            name: name.to_string(),
            uid,
        }),
        None => Err(Error::UnknownUser(name.to_string())),
    }
}
