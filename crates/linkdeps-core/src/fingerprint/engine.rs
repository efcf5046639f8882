//! File enumeration and hashing
//!
//! Enumeration honours the dependency's own `.gitignore` files (whether or
//! not the directory is a git checkout) and always skips `.git`, the
//! top-level `node_modules`, and the top-level directory that leads to the
//! consumer when the consumer lives inside the dependency.

use std::path::Path;

use ignore::{DirEntry, WalkBuilder};
use rayon::prelude::*;

use linkdeps_fs::checksum::file_digest;
use linkdeps_fs::constants::{GIT_DIR, NODE_MODULES};
use linkdeps_fs::{NormalizedPath, canonicalize};

use super::{CompositeFingerprint, FileFingerprint};
use crate::Result;

/// Compute the composite fingerprint of `source_dir`.
///
/// Files are hashed in parallel; the result is ordered by relative path, so
/// it does not depend on enumeration or scheduling order.
///
/// # Errors
///
/// Fails if the tree cannot be walked or any eligible file cannot be read.
pub fn compute_fingerprint(source_dir: &Path, consumer_root: &Path) -> Result<CompositeFingerprint> {
    let source_dir = canonicalize(source_dir)?;
    let paths = eligible_files(&source_dir, consumer_root)?;

    let files = paths
        .into_par_iter()
        .map(|relative_path| -> Result<FileFingerprint> {
            let native = source_dir.join(relative_path.to_native());
            let content_hash =
                file_digest(&native).map_err(|e| linkdeps_fs::Error::io(&native, e))?;
            Ok(FileFingerprint {
                relative_path,
                content_hash,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        source = %source_dir.display(),
        files = files.len(),
        "Computed fingerprint"
    );
    Ok(CompositeFingerprint::from_files(files))
}

/// Enumerate the files of `source_dir` that take part in the fingerprint,
/// sorted by relative path.
pub fn eligible_files(source_dir: &Path, consumer_root: &Path) -> Result<Vec<NormalizedPath>> {
    let source_dir = canonicalize(source_dir)?;
    let consumer_segment = canonicalize(consumer_root)
        .ok()
        .and_then(|consumer| NormalizedPath::relative(&consumer, &source_dir))
        .map(|rel| rel.first_segment().to_string());
    if let Some(segment) = &consumer_segment {
        tracing::debug!(segment = %segment, "Consumer is nested in dependency; excluding");
    }

    let walker = WalkBuilder::new(&source_dir)
        .hidden(false)
        .parents(false)
        .ignore(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .require_git(false)
        .follow_links(false)
        .filter_entry(move |entry| keep_entry(entry, consumer_segment.as_deref()))
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = result?;
        let is_file = entry.file_type().is_some_and(|t| !t.is_dir()) && entry.path().is_file();
        if !is_file {
            continue;
        }
        if let Some(rel) = NormalizedPath::relative(entry.path(), &source_dir) {
            files.push(rel);
        }
    }

    files.sort();
    Ok(files)
}

fn keep_entry(entry: &DirEntry, consumer_segment: Option<&str>) -> bool {
    let name = entry.file_name().to_string_lossy();
    if name == GIT_DIR {
        return false;
    }
    if entry.depth() == 1 && (name == NODE_MODULES || Some(&*name) == consumer_segment) {
        return false;
    }
    true
}
