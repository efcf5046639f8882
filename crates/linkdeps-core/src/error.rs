//! Error types for linkdeps-core

use std::path::PathBuf;

/// Result type for linkdeps-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in linkdeps-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No package.json at the consumer root
    #[error("No package.json found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// A package.json exists but does not have the expected shape
    #[error("Invalid package.json at {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    /// The consumer manifest declares no link section
    #[error("No 'linkDependencies' specified in package.json")]
    NoLinkSection,

    /// Source directory missing and no registry version to fall back to
    #[error(
        "Failed to resolve dependency {name}: failed to find target directory '{path}', \
         and the library is not present as normal dependency either"
    )]
    UnresolvedDependency { name: String, path: PathBuf },

    /// The dependency's own package.json declares another name
    #[error("Mismatch in package name: found '{found}', expected '{expected}'")]
    NameMismatch { expected: String, found: String },

    /// A path given to `add` has no package.json
    #[error("Failed to resolve dependency {path}")]
    UnresolvablePath { path: PathBuf },

    /// A package-manager subprocess exited unsuccessfully
    #[error("'{command}' failed in {dir} (exit code {code:?})")]
    CommandFailed {
        command: String,
        dir: PathBuf,
        code: Option<i32>,
    },

    /// A package-manager subprocess could not be started
    #[error("Failed to start '{program}': {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// `pack` ran but produced no recognizable archive
    #[error("Could not find the packed archive of {name} in {dir}")]
    ArchiveNotFound { name: String, dir: PathBuf },

    /// Tool configuration is invalid
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Directory walk failed while fingerprinting
    #[error("Failed to enumerate files: {0}")]
    Walk(#[from] ignore::Error),

    /// Filesystem watcher failed
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from linkdeps-fs
    #[error(transparent)]
    Fs(#[from] linkdeps_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error is a configuration problem rather than a runtime
    /// failure of a build, subprocess or filesystem operation.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ManifestNotFound { .. }
                | Self::InvalidManifest { .. }
                | Self::NoLinkSection
                | Self::UnresolvedDependency { .. }
                | Self::NameMismatch { .. }
                | Self::UnresolvablePath { .. }
                | Self::Config { .. }
                | Self::TomlDe(_)
        )
    }
}
