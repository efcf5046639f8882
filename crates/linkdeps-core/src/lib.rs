//! Core synchronization layer for link-deps
//!
//! Keeps a consumer project's installed copies of locally developed
//! dependencies in step with their source directories, without symlinks:
//!
//! - **Fingerprints**: deterministic content hashes of a dependency tree and
//!   the record of the last synced one
//! - **Build orchestration**: install the dependency's own dependencies and
//!   run its build script
//! - **Install pipeline**: pack the dependency and replace the installed
//!   copy with the archive contents
//! - **SyncEngine**: one pass over all declared links
//! - **Watch mode**: debounced re-runs of the pass on filesystem changes
//!
//! # Architecture
//!
//! ```text
//!                  link-deps CLI
//!                        |
//!                  linkdeps-core
//!     +-------+-------+--+-----+---------+-------+
//!     |       |       |        |         |       |
//!  manifest config fingerprint build  install  watch
//!                        |
//!                   linkdeps-fs
//! ```

pub mod build;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod install;
pub mod manifest;
pub mod package_manager;
pub mod sync;
pub mod watch;

pub use build::{BuildOrchestrator, BuildOutcome};
pub use config::ToolConfig;
pub use error::{Error, Result};
pub use fingerprint::{CompositeFingerprint, FileChange, FileFingerprint, FingerprintStore};
pub use install::{InstallOutcome, InstallPipeline};
pub use manifest::{ConsumerManifest, DependencyLink, PackageDescriptor};
pub use package_manager::{Client, CommandPackageManager, PackageManager, detect_client};
pub use sync::{DependencyReport, DependencyStatus, SyncEngine, SyncReport};
pub use watch::{Debouncer, WatchScheduler};
