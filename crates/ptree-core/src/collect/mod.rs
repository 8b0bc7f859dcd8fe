//! Process snapshot sources.
//!
//! A source yields every process once, at one point in time:
//! - `ProcFs`: parse `/proc` directly (Linux)
//! - `PsCommand`: run `ps` (other Unix systems)
//! - `RecordedSnapshot`: replay a JSON snapshot (reproducible output)
//!
//! Arguments are fetched separately because most runs never print them.

mod procfs;
mod ps;
mod recorded;

pub use procfs::{parse_stat, ProcFs, StatFields, PF_KTHREAD};
pub use ps::{parse_ps_line, PsCommand};
pub use recorded::RecordedSnapshot;

use ptree_common::{Error, ProcessRecord, RawText};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while taking a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("{path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to execute ps command: {0}")]
    CommandFailed(String),

    #[error("Parse error for PID {pid}: {message}")]
    ParseError { pid: u32, message: String },

    #[error("Invalid recorded snapshot {path}: {source}")]
    Recorded {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<SnapshotError> for Error {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Unavailable { .. } | SnapshotError::CommandFailed(_) => {
                Error::SnapshotUnavailable(err.to_string())
            }
            SnapshotError::ParseError { .. }
            | SnapshotError::Recorded { .. }
            | SnapshotError::IoError(_) => Error::SnapshotRead(err.to_string()),
        }
    }
}

/// Something that can list the processes of one instant.
pub trait SnapshotSource {
    /// Every process, in no particular order.
    fn list(&self) -> Result<Vec<ProcessRecord>, SnapshotError>;

    /// Argument vector of `record`, or `None` when it cannot be read (the
    /// process exited, or it is a kernel thread with no user arguments).
    fn arguments(&self, record: &ProcessRecord) -> Option<Vec<RawText>>;
}

/// Pick the source for this run.
///
/// A recorded snapshot wins when given; otherwise `/proc` when it is
/// mounted, and `ps` as the last resort.
pub fn open_default(recorded: Option<&Path>) -> Result<Box<dyn SnapshotSource>, SnapshotError> {
    if let Some(path) = recorded {
        debug!(path = %path.display(), "using recorded snapshot");
        return Ok(Box::new(RecordedSnapshot::from_path(path)?));
    }

    let procfs = ProcFs::new(ProcFs::DEFAULT_ROOT);
    if procfs.is_available() {
        debug!("using /proc snapshot source");
        return Ok(Box::new(procfs));
    }

    debug!("/proc unavailable, falling back to ps");
    Ok(Box::new(PsCommand::new()))
}

/// Fill in argument vectors for the records that will be displayed.
pub fn attach_arguments(source: &dyn SnapshotSource, records: &mut [ProcessRecord]) {
    for record in records.iter_mut().filter(|r| r.argv.is_none()) {
        record.argv = source.arguments(record);
    }
}
