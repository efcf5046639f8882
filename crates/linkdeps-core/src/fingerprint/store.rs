//! Persistence of last-synced fingerprints
//!
//! The record lives inside the installed copy itself
//! (`node_modules/<name>/.link-deps-hash`). Replacing the installed copy
//! therefore discards the old record, and a record can only exist next to
//! the content it describes.

use std::path::{Path, PathBuf};

use linkdeps_fs::constants::{FINGERPRINT_MARKER, NODE_MODULES};
use linkdeps_fs::{NormalizedPath, io};

use super::CompositeFingerprint;
use crate::Result;

/// Directory holding the installed copy of `name` inside the consumer.
///
/// Scoped names (`@scope/pkg`) map to nested directories.
pub fn installed_copy_dir(consumer_root: &Path, name: &str) -> PathBuf {
    NormalizedPath::new(consumer_root.join(NODE_MODULES))
        .join(name)
        .to_native()
}

/// Loads and saves fingerprint records for one consumer project.
#[derive(Debug, Clone)]
pub struct FingerprintStore {
    consumer_root: PathBuf,
}

impl FingerprintStore {
    pub fn new(consumer_root: impl Into<PathBuf>) -> Self {
        Self {
            consumer_root: consumer_root.into(),
        }
    }

    /// Location of the marker file for `name`.
    pub fn marker_path(&self, name: &str) -> NormalizedPath {
        NormalizedPath::new(installed_copy_dir(&self.consumer_root, name)).join(FINGERPRINT_MARKER)
    }

    /// The last-synced record for `name`, or `None` before the first sync.
    pub fn load(&self, name: &str) -> Result<Option<String>> {
        Ok(io::read_optional_text(&self.marker_path(name))?)
    }

    /// Persist `fingerprint` as the record for `name`.
    ///
    /// Only called once build, pack and install have all succeeded.
    pub fn save(&self, name: &str, fingerprint: &CompositeFingerprint) -> Result<()> {
        let path = self.marker_path(name);
        io::write_text(&path, &fingerprint.to_string())?;
        tracing::debug!(dependency = name, path = %path, "Saved fingerprint record");
        Ok(())
    }
}
