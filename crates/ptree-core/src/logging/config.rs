//! Logging configuration.
//!
//! Sources, lowest precedence first:
//! - `RUST_LOG` (only the most verbose level it names is used)
//! - `PTREE_LOG`, `PTREE_LOG_FORMAT`, `PTREE_LOG_TIMESTAMPS`
//! - `-v` / `-q`

use std::fmt;
use std::str::FromStr;

/// Where diagnostics on stderr are meant to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Plain lines for a person at a terminal.
    #[default]
    Human,
    /// One JSON object per event.
    Jsonl,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Minimum severity that reaches stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Off,
}

/// Accepted spellings; the first one per level is canonical.
const LEVEL_NAMES: &[(&str, LogLevel)] = &[
    ("trace", LogLevel::Trace),
    ("debug", LogLevel::Debug),
    ("info", LogLevel::Info),
    ("warn", LogLevel::Warn),
    ("error", LogLevel::Error),
    ("off", LogLevel::Off),
    ("warning", LogLevel::Warn),
    ("none", LogLevel::Off),
];

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LEVEL_NAMES
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, level)| *level)
            .ok_or_else(|| format!("unknown log level: {s}"))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = LEVEL_NAMES
            .iter()
            .find(|(_, level)| level == self)
            .map_or("off", |(name, _)| name);
        f.write_str(name)
    }
}

/// Most verbose level named in a `RUST_LOG` directive list such as
/// `info,ptree_core=debug`.
fn level_in_directives(directives: &str) -> Option<LogLevel> {
    directives
        .split(',')
        .filter_map(|directive| {
            let level = directive.rsplit('=').next().unwrap_or(directive);
            level.parse::<LogLevel>().ok()
        })
        .min()
}

/// Resolved logging setup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Prefix human lines with the time.
    pub timestamps: bool,
}

impl LogConfig {
    /// Resolve from the process environment, with `cli_level` on top.
    pub fn from_env(cli_level: Option<LogLevel>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cli_level)
    }

    /// [`LogConfig::from_env`] over any variable lookup.
    pub fn from_lookup<F>(lookup: F, cli_level: Option<LogLevel>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = LogConfig::default();

        let env_level = match lookup("PTREE_LOG") {
            Some(value) => value.parse().ok(),
            None => lookup("RUST_LOG").as_deref().and_then(level_in_directives),
        };
        if let Some(level) = cli_level.or(env_level) {
            config.level = level;
        }

        if let Some(format) = lookup("PTREE_LOG_FORMAT").and_then(|v| v.parse().ok()) {
            config.format = format;
        }
        config.timestamps = lookup("PTREE_LOG_TIMESTAMPS")
            .is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes"));

        config
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}

/// Level requested by `-v` (repeatable) and `-q`, if either was given.
pub fn level_from_flags(verbose: u8, quiet: bool) -> Option<LogLevel> {
    if quiet {
        return Some(LogLevel::Off);
    }
    match verbose {
        0 => None,
        1 => Some(LogLevel::Info),
        2 => Some(LogLevel::Debug),
        _ => Some(LogLevel::Trace),
    }
}
