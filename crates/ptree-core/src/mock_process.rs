//! Mock process generator for testing.
//!
//! This module provides builders and factories for creating mock
//! `ProcessRecord` lists and snapshot sources. It supports:
//!
//! - Builder pattern for ergonomic test setup
//! - Deterministic generation via seed for reproducible tests
//! - Factory functions for common shapes (login sessions, worker pools)
//!
//! # Example
//!
//! ```ignore
//! use ptree_core::mock_process::{MockProcessBuilder, MockSnapshotBuilder};
//!
//! let sshd = MockProcessBuilder::new().pid(500).comm("sshd").build();
//!
//! let snapshot = MockSnapshotBuilder::new()
//!     .with_init()
//!     .with_process(sshd)
//!     .with_workers(500, "sshd-session", 3)
//!     .build();
//! ```

use crate::collect::RecordedSnapshot;
use ptree_common::{OwnerId, ProcessId, ProcessRecord, RawText};

// ============================================================================
// Deterministic RNG
// ============================================================================

/// Linear congruential generator for reproducible test data. Not suitable
/// for anything else.
#[derive(Debug, Clone)]
pub struct MockRng {
    state: u64,
}

impl MockRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        // LCG parameters from Numerical Recipes
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    /// A value in `[min, max]`.
    pub fn range(&mut self, min: u64, max: u64) -> u64 {
        min + ((self.next_u64() >> 16) % (max - min + 1))
    }

    /// A random element of a non-empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let idx = ((self.next_u64() >> 16) as usize) % items.len();
        &items[idx]
    }
}

impl Default for MockRng {
    fn default() -> Self {
        Self::new(42)
    }
}

// ============================================================================
// MockProcessBuilder
// ============================================================================

/// Builder for a single `ProcessRecord`.
///
/// Defaults describe an ordinary user process parented to init.
#[derive(Debug, Clone)]
pub struct MockProcessBuilder {
    pid: u32,
    ppid: u32,
    uid: u32,
    comm: Vec<u8>,
    argv: Option<Vec<Vec<u8>>>,
    kernel_thread: bool,
}

impl Default for MockProcessBuilder {
    fn default() -> Self {
        Self {
            pid: 1000,
            ppid: 1,
            uid: 1000,
            comm: b"test".to_vec(),
            argv: None,
            kernel_thread: false,
        }
    }
}

impl MockProcessBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // === Identity setters ===

    pub fn pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    pub fn ppid(mut self, ppid: u32) -> Self {
        self.ppid = ppid;
        self
    }

    pub fn uid(mut self, uid: u32) -> Self {
        self.uid = uid;
        self
    }

    /// Owned by root.
    pub fn root_owned(mut self) -> Self {
        self.uid = OwnerId::ROOT.0;
        self
    }

    // === Command setters ===

    /// Set the command name; raw bytes are allowed.
    pub fn comm(mut self, comm: impl AsRef<[u8]>) -> Self {
        self.comm = comm.as_ref().to_vec();
        self
    }

    /// Set the argument vector, argv[0] first.
    pub fn args<I, T>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.argv = Some(argv.into_iter().map(|a| a.as_ref().to_vec()).collect());
        self
    }

    // === Shapes ===

    /// A kernel thread under kthreadd.
    pub fn kernel_thread(mut self) -> Self {
        self.ppid = 2;
        self.uid = 0;
        self.kernel_thread = true;
        self
    }

    /// No known parent.
    pub fn orphan(mut self) -> Self {
        self.ppid = 0;
        self
    }

    /// A login shell started by `parent`.
    pub fn login_shell(mut self, parent: u32) -> Self {
        self.ppid = parent;
        self.comm = b"bash".to_vec();
        self.argv = Some(vec![b"-bash".to_vec()]);
        self
    }

    // === Build ===

    pub fn build(self) -> ProcessRecord {
        ProcessRecord {
            pid: ProcessId(self.pid),
            ppid: ProcessId(self.ppid),
            uid: OwnerId(self.uid),
            comm: RawText(self.comm),
            argv: self
                .argv
                .map(|argv| argv.into_iter().map(RawText).collect()),
            kernel_thread: self.kernel_thread,
        }
    }
}

// ============================================================================
// MockSnapshotBuilder
// ============================================================================

/// Builder for a whole process table.
#[derive(Debug, Clone)]
pub struct MockSnapshotBuilder {
    processes: Vec<ProcessRecord>,
    next_pid: u32,
    rng: MockRng,
}

impl Default for MockSnapshotBuilder {
    fn default() -> Self {
        Self {
            processes: Vec::new(),
            next_pid: 100,
            rng: MockRng::default(),
        }
    }
}

impl MockSnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a specific seed for deterministic generation.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: MockRng::new(seed),
            ..Default::default()
        }
    }

    fn allocate_pid(&mut self) -> u32 {
        let used: Vec<u32> = self.processes.iter().map(|p| p.pid.0).collect();
        while used.contains(&self.next_pid) {
            self.next_pid += 1;
        }
        let pid = self.next_pid;
        self.next_pid += 1;
        pid
    }

    // === Process addition ===

    pub fn with_process(mut self, process: ProcessRecord) -> Self {
        self.processes.push(process);
        self
    }

    pub fn with_processes(mut self, processes: impl IntoIterator<Item = ProcessRecord>) -> Self {
        self.processes.extend(processes);
        self
    }

    /// init (pid 1, parent 0, root).
    pub fn with_init(self) -> Self {
        let init = MockProcessBuilder::new()
            .pid(1)
            .orphan()
            .root_owned()
            .comm("init")
            .args(["/sbin/init"])
            .build();
        self.with_process(init)
    }

    /// kthreadd (pid 2) and `count` kernel threads under it.
    pub fn with_kernel_threads(mut self, count: usize) -> Self {
        let kthreadd = MockProcessBuilder::new()
            .pid(2)
            .orphan()
            .root_owned()
            .comm("kthreadd")
            .build();
        self.processes.push(kthreadd);
        for index in 0..count {
            let pid = self.allocate_pid();
            let thread = MockProcessBuilder::new()
                .pid(pid)
                .kernel_thread()
                .comm(format!("kworker/{index}:0"))
                .build();
            self.processes.push(thread);
        }
        self
    }

    /// `count` identical children of `parent` named `comm`.
    pub fn with_workers(mut self, parent: u32, comm: &str, count: usize) -> Self {
        for _ in 0..count {
            let pid = self.allocate_pid();
            let worker = MockProcessBuilder::new()
                .pid(pid)
                .ppid(parent)
                .root_owned()
                .comm(comm)
                .args([format!("/usr/sbin/{comm}")])
                .build();
            self.processes.push(worker);
        }
        self
    }

    /// `count` processes, each parented to one added before it (or to
    /// init when the table is empty so far). Always forms a forest.
    pub fn with_random_processes(mut self, count: usize) -> Self {
        let comms = ["bash", "sshd", "python", "node", "sleep", "cron", "getty"];
        let uids = [0, 1000, 1001];
        for _ in 0..count {
            let pid = self.allocate_pid();
            let ppid = if self.processes.is_empty() {
                1
            } else {
                let index = self.rng.range(0, self.processes.len() as u64 - 1) as usize;
                self.processes[index].pid.0
            };
            let comm = *self.rng.choose(&comms);
            let uid = *self.rng.choose(&uids);
            let process = MockProcessBuilder::new()
                .pid(pid)
                .ppid(ppid)
                .uid(uid)
                .comm(comm)
                .args([comm, "--flag"])
                .build();
            self.processes.push(process);
        }
        self
    }

    // === Build ===

    pub fn build(self) -> Vec<ProcessRecord> {
        self.processes
    }

    /// The table as a snapshot source.
    pub fn into_source(self) -> RecordedSnapshot {
        RecordedSnapshot::new(self.processes)
    }
}

// ============================================================================
// Factory Functions
// ============================================================================

/// A small server: init, kernel threads, a getty pool, sshd with two
/// logins, and a cron job.
pub fn mock_server() -> Vec<ProcessRecord> {
    MockSnapshotBuilder::new()
        .with_init()
        .with_kernel_threads(2)
        .with_workers(1, "getty", 3)
        .with_process(
            MockProcessBuilder::new()
                .pid(400)
                .root_owned()
                .comm("sshd")
                .args(["/usr/sbin/sshd", "-D"])
                .build(),
        )
        .with_process(MockProcessBuilder::new().pid(410).login_shell(400).build())
        .with_process(
            MockProcessBuilder::new()
                .pid(411)
                .login_shell(400)
                .uid(1001)
                .build(),
        )
        .with_process(
            MockProcessBuilder::new()
                .pid(420)
                .ppid(410)
                .comm("vim")
                .args(["vim", "notes.txt"])
                .build(),
        )
        .with_process(
            MockProcessBuilder::new()
                .pid(500)
                .root_owned()
                .comm("cron")
                .args(["/usr/sbin/cron", "-f"])
                .build(),
        )
        .build()
}

/// A random forest of `count` processes under init.
pub fn mock_random_snapshot(count: usize, seed: u64) -> Vec<ProcessRecord> {
    MockSnapshotBuilder::with_seed(seed)
        .with_init()
        .with_random_processes(count)
        .build()
}

// ============================================================================
// Tests
// ============================================================================
