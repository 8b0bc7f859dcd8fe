//! Snapshot via the `ps` command, for systems without `/proc`.

use super::{SnapshotError, SnapshotSource};
use ptree_common::{OwnerId, ProcessId, ProcessRecord, RawText};
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs `ps` once for the process list and once per process for arguments.
#[derive(Debug, Clone)]
pub struct PsCommand {
    program: String,
}

impl Default for PsCommand {
    fn default() -> Self {
        PsCommand {
            program: "ps".to_string(),
        }
    }
}

impl PsCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different `ps` binary.
    pub fn with_program(program: impl Into<String>) -> Self {
        PsCommand {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Vec<u8>, SnapshotError> {
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| SnapshotError::CommandFailed(format!("{}: {e}", self.program)))?;
        if !output.status.success() {
            return Err(SnapshotError::CommandFailed(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        Ok(output.stdout)
    }
}

/// Parse one `pid ppid uid comm` line; the command name may contain spaces.
pub fn parse_ps_line(line: &[u8]) -> Option<ProcessRecord> {
    let mut rest = line;
    let mut numbers = [0u32; 3];
    for number in &mut numbers {
        let start = rest.iter().position(|b| !b.is_ascii_whitespace())?;
        rest = &rest[start..];
        let end = rest
            .iter()
            .position(|b| b.is_ascii_whitespace())
            .unwrap_or(rest.len());
        *number = std::str::from_utf8(&rest[..end]).ok()?.parse().ok()?;
        rest = &rest[end..];
    }

    let start = rest
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(rest.len());
    let comm = rest[start..].trim_ascii_end();

    let [pid, ppid, uid] = numbers;
    Some(ProcessRecord {
        pid: ProcessId(pid),
        ppid: ProcessId(ppid),
        uid: OwnerId(uid),
        comm: RawText::from(comm),
        argv: None,
        kernel_thread: false,
    })
}

impl SnapshotSource for PsCommand {
    fn list(&self) -> Result<Vec<ProcessRecord>, SnapshotError> {
        let stdout = self.run(&["-A", "-o", "pid=,ppid=,uid=,comm="])?;

        let mut records = Vec::new();
        for (line_num, line) in stdout.split(|&b| b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let record = parse_ps_line(line).ok_or_else(|| SnapshotError::ParseError {
                pid: 0,
                message: format!("unreadable ps output at line {}", line_num + 1),
            })?;
            records.push(record);
        }

        debug!(process_count = records.len(), "read ps snapshot");
        Ok(records)
    }

    fn arguments(&self, record: &ProcessRecord) -> Option<Vec<RawText>> {
        let pid = record.pid.to_string();
        let stdout = self.run(&["-o", "args=", "-p", &pid]).ok()?;
        let args: Vec<RawText> = stdout
            .split(|b| b.is_ascii_whitespace())
            .filter(|word| !word.is_empty())
            .map(RawText::from)
            .collect();
        (!args.is_empty()).then_some(args)
    }
}
