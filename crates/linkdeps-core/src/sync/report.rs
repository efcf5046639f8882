//! Reports produced by a synchronization pass

use std::path::PathBuf;

use crate::build::BuildOutcome;
use crate::fingerprint::FileChange;
use crate::install::InstallOutcome;

/// What happened to one dependency during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyStatus {
    /// The fingerprint matched the record; nothing was touched
    Unchanged,
    /// The dependency was rebuilt and its installed copy replaced
    Reinstalled {
        /// First differing file, absent on the first sync
        change: Option<FileChange>,
        build: BuildOutcome,
        install: InstallOutcome,
    },
    /// The source directory is missing; the registry install was kept
    SkippedMissingSource {
        /// Version range of the regular declaration left in place
        fallback_version: String,
    },
}

/// Outcome for one declared link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyReport {
    pub name: String,
    pub source_path: PathBuf,
    pub status: DependencyStatus,
}

/// Outcome of one full pass over all declared links
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Per-dependency results in declaration order
    pub dependencies: Vec<DependencyReport>,
    /// Advisory warnings raised during the pass
    pub warnings: Vec<String>,
}

impl SyncReport {
    /// Number of dependencies whose installed copy was replaced.
    pub fn reinstalled(&self) -> usize {
        self.dependencies
            .iter()
            .filter(|d| matches!(d.status, DependencyStatus::Reinstalled { .. }))
            .count()
    }

    /// Whether the pass left every installed copy untouched.
    pub fn is_noop(&self) -> bool {
        self.reinstalled() == 0
    }

    /// Status recorded for `name`, if it was processed.
    pub fn status_of(&self, name: &str) -> Option<&DependencyStatus> {
        self.dependencies
            .iter()
            .find(|d| d.name == name)
            .map(|d| &d.status)
    }

    pub(crate) fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }
}
