//! ptree common types, IDs, and errors.
//!
//! This crate provides foundational types shared across ptree modules:
//! - Process and owner identity types
//! - Process records as produced by snapshot sources
//! - Common error types

pub mod error;
pub mod id;
pub mod record;

pub use error::{Error, ErrorCategory, Result};
pub use id::{OwnerId, ProcessId};
pub use record::{ProcessRecord, RawText};
