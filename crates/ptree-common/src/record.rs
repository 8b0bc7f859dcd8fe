//! Process records as produced by a snapshot source.
//!
//! Records are read-only to the tree core. Command names and arguments are
//! kept as raw bytes because the kernel does not promise they are valid
//! UTF-8 or free of control characters.

use crate::id::{OwnerId, ProcessId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Raw bytes taken from the kernel (command name or one argv element).
///
/// Serializes as a string; bytes that are not valid UTF-8 are replaced.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct RawText(pub Vec<u8>);

impl RawText {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RawText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for RawText {
    fn from(s: &str) -> Self {
        RawText(s.as_bytes().to_vec())
    }
}

impl From<String> for RawText {
    fn from(s: String) -> Self {
        RawText(s.into_bytes())
    }
}

impl From<Vec<u8>> for RawText {
    fn from(bytes: Vec<u8>) -> Self {
        RawText(bytes)
    }
}

impl From<&[u8]> for RawText {
    fn from(bytes: &[u8]) -> Self {
        RawText(bytes.to_vec())
    }
}

impl Serialize for RawText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(&self.0))
    }
}

impl<'de> Deserialize<'de> for RawText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(RawText::from)
    }
}

/// A single process from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Process ID, unique within a snapshot.
    pub pid: ProcessId,

    /// Parent process ID (0 when the process has no parent).
    pub ppid: ProcessId,

    /// Real user ID.
    pub uid: OwnerId,

    /// Short command name as the kernel reports it.
    pub comm: RawText,

    /// Argument vector, argv[0] first. `None` until fetched or when the
    /// source cannot provide it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argv: Option<Vec<RawText>>,

    /// Set by sources that can tell kernel threads apart from user processes.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub kernel_thread: bool,
}

impl ProcessRecord {
    /// Create a record without arguments.
    pub fn new(pid: u32, ppid: u32, uid: u32, comm: impl Into<RawText>) -> Self {
        ProcessRecord {
            pid: ProcessId(pid),
            ppid: ProcessId(ppid),
            uid: OwnerId(uid),
            comm: comm.into(),
            argv: None,
            kernel_thread: false,
        }
    }

    /// Attach an argument vector (argv[0] included).
    pub fn with_argv<I, T>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawText>,
    {
        self.argv = Some(argv.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the process is kernel-internal.
    ///
    /// Anything other than init whose parent is 0 counts, as does anything
    /// the source flagged as a kernel thread.
    pub fn is_kernel(&self) -> bool {
        self.pid != ProcessId::INIT && (self.ppid.is_none() || self.kernel_thread)
    }
}
