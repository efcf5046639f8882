//! Synchronization of linked dependencies
//!
//! - [`SyncEngine`]: runs one full pass over the declared links
//! - [`SyncReport`]: what the pass did to each dependency

pub mod engine;
pub mod report;

pub use engine::SyncEngine;
pub use report::{DependencyReport, DependencyStatus, SyncReport};
