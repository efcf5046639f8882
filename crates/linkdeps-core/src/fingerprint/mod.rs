//! Content fingerprints of dependency source trees
//!
//! A [`CompositeFingerprint`] is the sorted list of `"<sha256> <path>"` lines
//! for every eligible file of a dependency. Two composites are equal exactly
//! when the file set and every file's content are equal, which is what the
//! synchronization driver compares against the [`FingerprintStore`] record.

pub mod engine;
pub mod store;

use std::fmt;

use linkdeps_fs::NormalizedPath;

pub use engine::{compute_fingerprint, eligible_files};
pub use store::{FingerprintStore, installed_copy_dir};

/// Digest of one eligible file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFingerprint {
    /// Path below the dependency root, `/`-separated
    pub relative_path: NormalizedPath,
    /// Lowercase hex SHA-256 of the full content
    pub content_hash: String,
}

impl fmt::Display for FileFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.content_hash, self.relative_path)
    }
}

/// Ordered fingerprint of a whole dependency tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeFingerprint {
    files: Vec<FileFingerprint>,
}

impl CompositeFingerprint {
    /// Build a composite, imposing relative-path order on `files`.
    pub fn from_files(mut files: Vec<FileFingerprint>) -> Self {
        files.sort_by(|a, b| a.relative_path.as_str().cmp(b.relative_path.as_str()));
        Self { files }
    }

    /// Per-file fingerprints in order.
    pub fn files(&self) -> &[FileFingerprint] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether this composite equals a persisted record.
    pub fn matches(&self, record: &str) -> bool {
        self.to_string() == record
    }

    /// Locate the first line that differs from a persisted record.
    ///
    /// Returns `None` when both are identical.
    pub fn first_change(&self, record: &str) -> Option<FileChange> {
        let previous: Vec<&str> = if record.is_empty() {
            Vec::new()
        } else {
            record.split('\n').collect()
        };

        let len = self.files.len().max(previous.len());
        (0..len).find_map(|i| match (self.files.get(i), previous.get(i)) {
            (Some(current), Some(old)) if current.to_string() == *old => None,
            (Some(current), _) => Some(FileChange::Changed(current.relative_path.to_string())),
            (None, Some(old)) => Some(FileChange::Removed(record_path(old).to_string())),
            (None, None) => None,
        })
    }
}

impl fmt::Display for CompositeFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, file) in self.files.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", file)?;
        }
        Ok(())
    }
}

/// First point of divergence between two fingerprints
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// The file at this index is new or its content differs
    Changed(String),
    /// The record lists a file past the end of the current set
    Removed(String),
}

impl fmt::Display for FileChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileChange::Changed(path) => write!(f, "Changed file: {}", path),
            FileChange::Removed(path) => write!(f, "Removed file: {}", path),
        }
    }
}

fn record_path(line: &str) -> &str {
    line.split_once(' ').map(|(_, path)| path).unwrap_or(line)
}
