//! Error types for linkdeps-fs

use std::path::PathBuf;

/// Result type for linkdeps-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in linkdeps-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract {archive}: {source}")]
    Extract {
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive {archive} contains an unsafe entry: {entry}")]
    UnsafeArchiveEntry { archive: PathBuf, entry: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn extract(archive: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Extract {
            archive: archive.into(),
            source,
        }
    }
}
