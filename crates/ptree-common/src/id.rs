//! Process and owner identity types.
//!
//! Within a single snapshot a process is identified by its pid alone; the
//! wrappers here keep pids and uids from being mixed up at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process ID wrapper with display formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub u32);

impl ProcessId {
    /// The pid of the init process, always shown even though its parent is 0.
    pub const INIT: ProcessId = ProcessId(1);

    /// Parent pid reported by processes that have no parent.
    pub const NONE: ProcessId = ProcessId(0);

    /// Whether this pid is the "no parent" marker.
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProcessId {
    fn from(pid: u32) -> Self {
        ProcessId(pid)
    }
}

/// Real user id of a process owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub u32);

impl OwnerId {
    /// The superuser.
    pub const ROOT: OwnerId = OwnerId(0);
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for OwnerId {
    fn from(uid: u32) -> Self {
        OwnerId(uid)
    }
}
