//! Gzip tarball extraction
//!
//! Package archives wrap their whole content in one top-level directory
//! (`package/` for npm, `<name>-v<version>/` for some clients). Extraction
//! strips a fixed number of leading components so the content lands directly
//! in the destination.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::path::is_contained;
use crate::{Error, Result};

/// Extract a `.tgz` archive into `dest`, dropping `strip` leading path
/// components from every entry.
///
/// `dest` must already exist. Entries that become empty after stripping are
/// skipped. The extraction aborts on any entry that could place content
/// outside `dest`:
///
/// - paths that are absolute or contain `..`
/// - symlinks whose target is absolute or contains `..`
/// - hard links
/// - entries whose parent directory is a symlink created earlier
///
/// Returns the number of entries written.
pub fn extract_tgz(archive: &Path, dest: &Path, strip: usize) -> Result<usize> {
    let file = File::open(archive).map_err(|e| Error::io(archive, e))?;
    let mut tar = Archive::new(GzDecoder::new(file));
    let mut written = 0;

    let entries = tar.entries().map_err(|e| Error::extract(archive, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| Error::extract(archive, e))?;
        let entry_path = entry
            .path()
            .map_err(|e| Error::extract(archive, e))?
            .into_owned();
        let unsafe_entry = || Error::UnsafeArchiveEntry {
            archive: archive.to_path_buf(),
            entry: entry_path.display().to_string(),
        };

        let stripped: PathBuf = entry_path.components().skip(strip).collect();
        if stripped.as_os_str().is_empty() {
            continue;
        }
        if !is_contained(&stripped) || passes_through_symlink(dest, &stripped) {
            return Err(unsafe_entry());
        }

        let entry_type = entry.header().entry_type();
        if entry_type.is_hard_link() {
            return Err(unsafe_entry());
        }
        if entry_type.is_symlink() {
            let link = entry.link_name().map_err(|e| Error::extract(archive, e))?;
            if !link.as_deref().is_some_and(is_contained) {
                return Err(unsafe_entry());
            }
        }

        let target = dest.join(&stripped);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        entry
            .unpack(&target)
            .map_err(|e| Error::extract(archive, e))?;
        tracing::trace!(entry = %stripped.display(), "Extracted");
        written += 1;
    }

    Ok(written)
}

fn passes_through_symlink(dest: &Path, relative: &Path) -> bool {
    let Some(parent) = relative.parent() else {
        return false;
    };
    let mut current = dest.to_path_buf();
    parent.components().any(|component| {
        current.push(component);
        fs::symlink_metadata(&current).is_ok_and(|meta| meta.file_type().is_symlink())
    })
}
