//! Which part of the forest gets printed.

use ptree_common::{Error, OwnerId, ProcessId};

/// A pattern on command names.
#[derive(Debug, Clone)]
pub enum NamePattern {
    /// Shell wildcard, matched against the whole name.
    Glob(glob::Pattern),
    /// Regular expression, matched anywhere in the name.
    Regex(regex::Regex),
}

impl NamePattern {
    pub fn glob(pattern: &str) -> Result<Self, Error> {
        glob::Pattern::new(pattern)
            .map(NamePattern::Glob)
            .map_err(|e| Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.msg.to_string(),
            })
    }

    pub fn regex(pattern: &str) -> Result<Self, Error> {
        regex::Regex::new(pattern)
            .map(NamePattern::Regex)
            .map_err(|e| Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Glob(pattern) => pattern.matches(name),
            NamePattern::Regex(regex) => regex.is_match(name),
        }
    }
}

/// Restriction on the printed roots.
#[derive(Debug, Clone, Default)]
pub enum Selection {
    /// Every tree.
    #[default]
    All,
    /// The subtree at one process.
    Pid(ProcessId),
    /// Topmost processes owned by one user.
    User { name: String, uid: OwnerId },
    /// Topmost processes whose command name matches.
    Name(NamePattern),
}

impl Selection {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}
