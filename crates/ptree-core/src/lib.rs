//! ptree core library
//!
//! This library provides everything behind the `ptree` binary:
//! - Command-line parsing and run configuration
//! - Process snapshots from `/proc`, `ps`, or a recorded file
//! - The process tree: linking, selection, highlighting, compaction
//! - Line rendering with ASCII, VT100, or Unicode connectors
//!
//! The binary entry point is in `main.rs`.

pub mod cli;
pub mod collect;
pub mod config;
pub mod exit_codes;
pub mod logging;
pub mod owners;
pub mod pipeline;
pub mod render;
pub mod terminal;
pub mod tree;
pub mod visual;

// Re-export test utilities for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock_process;
