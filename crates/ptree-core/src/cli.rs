//! Command-line surface.
//!
//! `Cli` is the raw parse. Policy (which options imply which, what a bare
//! positional means) lives in [`crate::config::Config::resolve`].

use crate::config::number::pid_arg;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use ptree_common::ProcessId;
use std::ffi::{CStr, OsString};
use std::path::PathBuf;

/// Display a tree of processes
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ptree")]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
#[command(override_usage = "ptree [options] [PID|USER]")]
pub struct Cli {
    /// Show command line arguments (implies -c)
    #[arg(short = 'a', long = "arguments")]
    pub arguments: bool,

    /// Use ASCII line drawing characters
    #[arg(short = 'A', long = "ascii", overrides_with_all = ["vt100", "unicode"])]
    pub ascii: bool,

    /// Don't compact identical subtrees
    #[arg(short = 'c', long = "no-compact", alias = "compact")]
    pub no_compact: bool,

    /// Show only trees rooted at processes whose name matches PATTERN
    #[arg(short = 'g', long = "glob", value_name = "PATTERN")]
    pub glob: Option<String>,

    /// Use VT100 line drawing characters
    #[arg(short = 'G', long = "vt100", overrides_with_all = ["ascii", "unicode"])]
    pub vt100: bool,

    /// Highlight the current process (or PID) and its ancestors
    #[arg(
        short = 'H',
        long = "highlight",
        aliases = ["highlight-all", "highlight-pid"],
        value_name = "PID",
        num_args = 0..=1,
        require_equals = true,
        value_parser = pid_arg
    )]
    pub highlight: Option<Option<ProcessId>>,

    /// Show kernel processes
    #[arg(short = 'k', long = "show-kernel")]
    pub show_kernel: bool,

    /// Don't truncate long lines
    #[arg(short = 'l', long = "long")]
    pub long: bool,

    /// Sort output by PID
    #[arg(short = 'n', long = "numeric-sort")]
    pub numeric_sort: bool,

    /// Show PIDs (implies -c)
    #[arg(short = 'p', long = "show-pids")]
    pub show_pids: bool,

    /// Show only trees rooted at processes whose name matches REGEX
    #[arg(short = 'r', long = "regex", value_name = "REGEX")]
    pub regex: Option<String>,

    /// Show parents of the selected process
    #[arg(short = 's', long = "show-parents")]
    pub show_parents: bool,

    /// Show process titles
    #[arg(short = 't', long = "show-titles")]
    pub show_titles: bool,

    /// Show uid transitions
    #[arg(short = 'u', long = "uid-changes")]
    pub uid_changes: bool,

    /// Use Unicode line drawing characters
    #[arg(short = 'U', long = "unicode", overrides_with_all = ["ascii", "vt100"])]
    pub unicode: bool,

    /// Print version information (=short, =license)
    #[arg(
        short = 'V',
        long = "version",
        value_name = "STYLE",
        num_args = 0..=1,
        require_equals = true
    )]
    pub version: Option<Option<String>>,

    /// Show only the tree rooted at PID
    #[arg(long = "pid", value_name = "PID", value_parser = pid_arg)]
    pub pid: Option<ProcessId>,

    /// Show only trees rooted at processes of USER
    #[arg(long = "user", value_name = "USER")]
    pub user: Option<String>,

    /// Process id or user name to show
    #[arg(value_name = "PID|USER")]
    pub target: Option<String>,

    /// Read a recorded snapshot instead of the live process table
    #[arg(long = "snapshot", value_name = "FILE", env = "PTREE_SNAPSHOT", hide = true)]
    pub snapshot: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Silence all diagnostics except fatal errors
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// The selection given last on the command line.
    #[arg(skip)]
    pub selection: Option<SelectionArg>,
}

/// A selection option as typed, before it is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionArg {
    Pid(ProcessId),
    User(String),
    Glob(String),
    Regex(String),
    /// Bare positional: a pid if it reads as a number, otherwise a user.
    Target(String),
}

impl Cli {
    /// Parse `args` (program name first).
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let mut cli = Self::from_arg_matches(&matches)?;
        cli.selection = cli.last_selection(&matches);
        Ok(cli)
    }

    /// Selection options replace each other; the one given last wins.
    fn last_selection(&self, matches: &ArgMatches) -> Option<SelectionArg> {
        let given = [
            ("pid", self.pid.map(SelectionArg::Pid)),
            ("user", self.user.clone().map(SelectionArg::User)),
            ("glob", self.glob.clone().map(SelectionArg::Glob)),
            ("regex", self.regex.clone().map(SelectionArg::Regex)),
            ("target", self.target.clone().map(SelectionArg::Target)),
        ];
        given
            .into_iter()
            .filter_map(|(id, selection)| {
                let selection = selection?;
                let position = matches
                    .indices_of(id)
                    .and_then(|indices| indices.last())
                    .unwrap_or(0);
                Some((position, selection))
            })
            .max_by_key(|(position, _)| *position)
            .map(|(_, selection)| selection)
    }

    /// Usage summary printed after configuration errors.
    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }
}

const LICENSE_NOTICE: &str = "
   Licensed under the MIT License.

   Permission is hereby granted, free of charge, to any person obtaining a
   copy of this software, to deal in the software without restriction,
   subject to the conditions in the LICENSE file distributed with it.

   THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND.
";

/// Text printed for `-V[=STYLE]`.
///
/// `short`/`s` prints only name and version; anything else adds the host's
/// system name, release and machine, and `license`/`l` appends the notice.
pub fn version_text(style: Option<&str>) -> String {
    let name_version = format!("ptree {}", env!("CARGO_PKG_VERSION"));
    let mut text = match style {
        Some("s" | "short") => format!("{name_version}\n"),
        _ => match host_description() {
            Some(host) => format!("{name_version} - {host}\n"),
            None => format!("{name_version}\n"),
        },
    };
    if matches!(style, Some("l" | "license")) {
        text.push_str(LICENSE_NOTICE);
    }
    text
}

fn host_description() -> Option<String> {
    // SAFETY: uname fills the struct we own; each field is NUL-terminated.
    let mut name: libc::utsname = unsafe { std::mem::zeroed() };
    if unsafe { libc::uname(&mut name) } != 0 {
        return None;
    }
    let field = |raw: &[libc::c_char]| unsafe {
        CStr::from_ptr(raw.as_ptr()).to_string_lossy().into_owned()
    };
    Some(format!(
        "{} {} {}",
        field(&name.sysname),
        field(&name.release),
        field(&name.machine)
    ))
}
