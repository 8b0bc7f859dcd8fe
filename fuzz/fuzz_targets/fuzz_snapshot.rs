//! Fuzz target for recorded snapshots.
//!
//! Arbitrary JSON is parsed as a snapshot and, when it parses, rendered
//! with a narrow width. Cycles, duplicate pids and odd names must all
//! render without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ptree_common::ProcessRecord;
use ptree_core::collect::RecordedSnapshot;
use ptree_core::config::Config;
use ptree_core::owners::StaticUsers;
use ptree_core::pipeline::print_tree;

fuzz_target!(|data: &[u8]| {
    let Ok(records) = serde_json::from_slice::<Vec<ProcessRecord>>(data) else {
        return;
    };
    let source = RecordedSnapshot::new(records);
    let owners = StaticUsers::new().with(0, "root");
    let config = Config {
        show_kernel: true,
        uid_changes: true,
        max_width: Some(40),
        ..Config::default()
    };
    let _ = print_tree(&config, &owners, &source, Vec::new());
});
