//! Replay of a snapshot saved as JSON.
//!
//! The file is a JSON array of process records:
//!
//! ```json
//! [{"pid": 1, "ppid": 0, "uid": 0, "comm": "init", "argv": ["/sbin/init"]}]
//! ```

use super::{SnapshotError, SnapshotSource};
use ptree_common::{ProcessId, ProcessRecord, RawText};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct RecordedSnapshot {
    /// Records with their argument vectors moved into `arguments`.
    records: Vec<ProcessRecord>,
    /// Argument vectors by pid; the first record listed for a pid wins.
    arguments: HashMap<ProcessId, Option<Vec<RawText>>>,
}

impl RecordedSnapshot {
    pub fn new(records: Vec<ProcessRecord>) -> Self {
        let mut arguments = HashMap::with_capacity(records.len());
        let records = records
            .into_iter()
            .map(|mut record| {
                let argv = record.argv.take();
                arguments.entry(record.pid).or_insert(argv);
                record
            })
            .collect();
        RecordedSnapshot { records, arguments }
    }

    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read(path).map_err(|source| SnapshotError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let records =
            serde_json::from_slice(&content).map_err(|source| SnapshotError::Recorded {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(RecordedSnapshot::new(records))
    }
}

impl SnapshotSource for RecordedSnapshot {
    fn list(&self) -> Result<Vec<ProcessRecord>, SnapshotError> {
        // Arguments are handed out through `arguments` like any other source.
        Ok(self.records.clone())
    }

    fn arguments(&self, record: &ProcessRecord) -> Option<Vec<RawText>> {
        self.arguments.get(&record.pid).cloned().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_round_trip_through_file() {
        let records = vec![
            ProcessRecord::new(1, 0, 0, "init").with_argv(["/sbin/init"]),
            ProcessRecord::new(2, 1, 1000, "sh"),
        ];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&records).unwrap().as_bytes())
            .unwrap();

        let loaded = RecordedSnapshot::from_path(file.path()).unwrap();
        let records = loaded.list().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.argv.is_none()));
        assert_eq!(
            loaded.arguments(&records[0]),
            Some(vec![RawText::from("/sbin/init")])
        );
        assert_eq!(loaded.arguments(&records[1]), None);
    }

    #[test]
    fn test_arguments_follow_the_first_record_for_a_pid() {
        let snapshot = RecordedSnapshot::new(vec![
            ProcessRecord::new(7, 1, 0, "worker").with_argv(["worker", "--first"]),
            ProcessRecord::new(7, 1, 0, "worker").with_argv(["worker", "--second"]),
            ProcessRecord::new(8, 1, 0, "idle"),
        ]);
        let listed = snapshot.list().unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(
            snapshot.arguments(&listed[1]),
            Some(vec![RawText::from("worker"), RawText::from("--first")])
        );
        assert_eq!(snapshot.arguments(&listed[2]), None);
        assert_eq!(
            snapshot.arguments(&ProcessRecord::new(9, 1, 0, "gone")),
            None
        );
    }

    #[test]
    fn test_arguments_for_many_processes() {
        let records: Vec<ProcessRecord> = (1..=20_000)
            .map(|pid| ProcessRecord::new(pid, 1, 0, "w").with_argv([format!("w{pid}")]))
            .collect();
        let snapshot = RecordedSnapshot::new(records);
        for record in snapshot.list().unwrap() {
            let argv = snapshot.arguments(&record).unwrap();
            assert_eq!(argv[0], RawText::from(format!("w{}", record.pid.0)));
        }
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = RecordedSnapshot::from_path(file.path()).unwrap_err();
        assert!(matches!(err, SnapshotError::Recorded { .. }));

        let err = RecordedSnapshot::from_path(Path::new("/nonexistent/snap.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Unavailable { .. }));
    }
}
