//! Snapshot from the Linux `/proc` filesystem.
//!
//! Files read per process:
//! - `/proc/[pid]/stat`: command name, parent pid, kernel-thread flag
//! - `/proc/[pid]/status`: real uid
//! - `/proc/[pid]/cmdline`: NUL-separated arguments (on demand)
//!
//! A process can exit between listing `/proc` and reading its files; such
//! processes are skipped rather than failing the whole snapshot.

use super::{SnapshotError, SnapshotSource};
use ptree_common::{OwnerId, ProcessId, ProcessRecord, RawText};
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;
use tracing::{debug, trace};

/// `PF_KTHREAD` in the per-process flags word: the task is a kernel thread.
pub const PF_KTHREAD: u64 = 0x0020_0000;

/// The parts of `/proc/[pid]/stat` the tree needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatFields {
    pub pid: u32,
    pub comm: Vec<u8>,
    pub ppid: u32,
    pub flags: u64,
}

impl StatFields {
    pub fn is_kernel_thread(&self) -> bool {
        self.flags & PF_KTHREAD != 0
    }
}

/// Parse a stat line.
///
/// The command name sits between the first `(` and the last `)`, because it
/// may itself contain spaces and parentheses. Fields after it are, in order:
/// state, ppid, pgrp, session, tty_nr, tpgid, flags, ...
pub fn parse_stat(content: &[u8]) -> Result<StatFields, String> {
    let open = content
        .iter()
        .position(|&b| b == b'(')
        .ok_or_else(|| "Missing comm start".to_string())?;
    let close = content
        .iter()
        .rposition(|&b| b == b')')
        .filter(|&close| close > open)
        .ok_or_else(|| "Missing comm end".to_string())?;

    let pid = std::str::from_utf8(&content[..open])
        .ok()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .ok_or_else(|| "Invalid pid field".to_string())?;
    let comm = content[open + 1..close].to_vec();

    let rest = std::str::from_utf8(&content[close + 1..])
        .map_err(|_| "Non-text fields after comm".to_string())?;
    let fields: Vec<&str> = rest.split_whitespace().collect();
    if fields.len() < 7 {
        return Err(format!("Insufficient stat fields: {}", fields.len()));
    }

    let ppid = fields[1]
        .parse::<u32>()
        .map_err(|_| format!("Invalid ppid field: {}", fields[1]))?;
    let flags = fields[6]
        .parse::<u64>()
        .map_err(|_| format!("Invalid flags field: {}", fields[6]))?;

    Ok(StatFields {
        pid,
        comm,
        ppid,
        flags,
    })
}

/// Real uid from the `Uid:` line of a status file.
fn parse_uid_from_status(content: &str) -> Option<u32> {
    content
        .lines()
        .find(|line| line.starts_with("Uid:"))
        // Format: "Uid:\t1000\t1000\t1000\t1000"; first value is the real uid
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|uid| uid.parse().ok())
}

/// Split a cmdline file into arguments.
fn split_cmdline(content: &[u8]) -> Vec<RawText> {
    let trimmed = content.strip_suffix(b"\0").unwrap_or(content);
    trimmed
        .split(|&b| b == 0)
        .map(RawText::from)
        .collect()
}

fn vanished(err: &std::io::Error) -> bool {
    // ESRCH shows up when the task is torn down mid-read.
    err.kind() == ErrorKind::NotFound || err.raw_os_error() == Some(libc::ESRCH)
}

/// Reads processes from a procfs mount.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    pub const DEFAULT_ROOT: &'static str = "/proc";

    /// Use the procfs mounted (or laid out, in tests) at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ProcFs { root: root.into() }
    }

    /// Whether `root` looks like a mounted procfs.
    pub fn is_available(&self) -> bool {
        self.root.join("self").join("stat").exists() || self.root.join("1").join("stat").exists()
    }

    fn process_dir(&self, pid: ProcessId) -> PathBuf {
        self.root.join(pid.to_string())
    }

    fn list_all_pids(&self) -> Result<Vec<u32>, SnapshotError> {
        let entries = fs::read_dir(&self.root).map_err(|source| SnapshotError::Unavailable {
            path: self.root.clone(),
            source,
        })?;

        let mut pids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) {
                pids.push(pid);
            }
        }
        pids.sort_unstable();
        Ok(pids)
    }

    /// Read one process; `Ok(None)` when it is already gone.
    fn read_process(&self, pid: u32) -> Result<Option<ProcessRecord>, SnapshotError> {
        let dir = self.process_dir(ProcessId(pid));

        let stat = match fs::read(dir.join("stat")) {
            Ok(stat) => stat,
            Err(e) if vanished(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let fields =
            parse_stat(&stat).map_err(|message| SnapshotError::ParseError { pid, message })?;

        let uid = match fs::read_to_string(dir.join("status")) {
            Ok(status) => parse_uid_from_status(&status),
            Err(e) if vanished(&e) => return Ok(None),
            Err(_) => None,
        };
        let uid = match uid {
            Some(uid) => uid,
            None => match fs::metadata(&dir) {
                Ok(meta) => meta.uid(),
                Err(e) if vanished(&e) => return Ok(None),
                Err(e) => return Err(e.into()),
            },
        };

        Ok(Some(ProcessRecord {
            pid: ProcessId(pid),
            ppid: ProcessId(fields.ppid),
            uid: OwnerId(uid),
            kernel_thread: fields.is_kernel_thread(),
            comm: RawText(fields.comm),
            argv: None,
        }))
    }
}

impl SnapshotSource for ProcFs {
    fn list(&self) -> Result<Vec<ProcessRecord>, SnapshotError> {
        let pids = self.list_all_pids()?;
        let mut records = Vec::with_capacity(pids.len());
        let mut skipped = 0usize;

        for pid in pids {
            match self.read_process(pid)? {
                Some(record) => records.push(record),
                None => {
                    trace!(pid, "process vanished during scan");
                    skipped += 1;
                }
            }
        }

        debug!(
            root = %self.root.display(),
            process_count = records.len(),
            skipped,
            "read /proc snapshot"
        );
        Ok(records)
    }

    fn arguments(&self, record: &ProcessRecord) -> Option<Vec<RawText>> {
        let content = fs::read(self.process_dir(record.pid).join("cmdline")).ok()?;
        if content.is_empty() {
            return None;
        }
        Some(split_cmdline(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    const BASH_STAT: &[u8] = b"4242 (bash) S 4000 4242 4242 34816 4242 4194304 1 0 0 0 3 1 0 0 20 0 1 0 900 1000 200";

    fn write_process(root: &Path, pid: u32, stat: &[u8], uid: u32, cmdline: &[u8]) {
        let dir = root.join(pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("stat"), stat).unwrap();
        fs::write(
            dir.join("status"),
            format!("Name:\tx\nState:\tS\nUid:\t{uid}\t{uid}\t{uid}\t{uid}\n"),
        )
        .unwrap();
        fs::write(dir.join("cmdline"), cmdline).unwrap();
    }

    #[test]
    fn test_parse_stat_simple() {
        let fields = parse_stat(BASH_STAT).unwrap();
        assert_eq!(fields.pid, 4242);
        assert_eq!(fields.comm, b"bash");
        assert_eq!(fields.ppid, 4000);
        assert!(!fields.is_kernel_thread());
    }

    #[test]
    fn test_parse_stat_comm_with_parens_and_spaces() {
        let fields = parse_stat(b"77 (my (odd) name) S 1 77 77 0 -1 4194560 0 0").unwrap();
        assert_eq!(fields.comm, b"my (odd) name");
        assert_eq!(fields.ppid, 1);
    }

    #[test]
    fn test_parse_stat_kernel_thread_flag() {
        let fields = parse_stat(b"12 (kworker/0:1) I 2 0 0 0 -1 69238880 0 0").unwrap();
        assert!(fields.is_kernel_thread());
        assert_eq!(fields.ppid, 2);
    }

    #[test]
    fn test_parse_stat_rejects_garbage() {
        assert!(parse_stat(b"").is_err());
        assert!(parse_stat(b"12 (unterminated S 1").is_err());
        assert!(parse_stat(b"12 (x) S").is_err());
        assert!(parse_stat(b"x (y) S 1 2 3 4 5 6").is_err());
        assert!(parse_stat(b") 12 ( S 1 2 3 4 5 6").is_err());
    }

    #[test]
    fn test_parse_uid_from_status() {
        assert_eq!(parse_uid_from_status("Name:\tx\nUid:\t1000\t0\t0\t0\n"), Some(1000));
        assert_eq!(parse_uid_from_status("Name:\tx\n"), None);
    }

    #[test]
    fn test_split_cmdline() {
        let args = split_cmdline(b"/usr/bin/python3\0-m\0http.server\0");
        assert_eq!(args.len(), 3);
        assert_eq!(args[2].as_bytes(), b"http.server");
        // Processes that rewrite their title may drop the trailing NUL.
        assert_eq!(split_cmdline(b"sshd: alice [priv]").len(), 1);
    }

    #[test]
    fn test_list_reads_fake_root() {
        let root = TempDir::new().unwrap();
        write_process(root.path(), 1, b"1 (init) S 0 1 1 0 -1 4194560 0 0", 0, b"/sbin/init\0");
        write_process(root.path(), 4242, BASH_STAT, 1000, b"-bash\0");
        write_process(
            root.path(),
            2,
            b"2 (kthreadd) S 0 0 0 0 -1 2129984 0 0",
            0,
            b"",
        );
        fs::create_dir_all(root.path().join("self")).unwrap();
        fs::write(root.path().join("uptime"), "1.0 1.0").unwrap();

        let procfs = ProcFs::new(root.path());
        let mut records = procfs.list().unwrap();
        records.sort_by_key(|r| r.pid);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].comm.as_bytes(), b"init");
        assert!(records[1].kernel_thread);
        assert!(records[1].is_kernel());
        assert_eq!(records[2].uid, OwnerId(1000));
        assert!(!records[2].is_kernel());

        let argv = procfs.arguments(&records[2]).unwrap();
        assert_eq!(argv, vec![RawText::from("-bash")]);
        assert_eq!(procfs.arguments(&records[1]), None);
    }

    #[test]
    fn test_vanished_process_is_skipped() {
        let root = TempDir::new().unwrap();
        write_process(root.path(), 1, b"1 (init) S 0 1 1 0 -1 4194560 0 0", 0, b"");
        // A directory with no stat file: the process exited mid-scan.
        fs::create_dir_all(root.path().join("999")).unwrap();

        let records = ProcFs::new(root.path()).list().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_missing_root_is_unavailable() {
        let err = ProcFs::new("/nonexistent/ptree-proc").list().unwrap_err();
        assert!(matches!(err, SnapshotError::Unavailable { .. }));
        assert!(!ProcFs::new("/nonexistent/ptree-proc").is_available());
    }
}
