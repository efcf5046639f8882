//! Pack-and-install pipeline
//!
//! Replaces the consumer's installed copy of a dependency with the contents
//! of a freshly packed archive. The old copy is removed first so no stale
//! file survives, and the archive is deleted whatever the outcome.
//!
//! Archives already lying in the source directory (from a manual `npm pack`
//! or an interrupted pass) are never installed: the archive is picked by
//! the name `pack` writes for the current version, or else by having
//! appeared or changed during `pack`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use regex::Regex;

use linkdeps_fs::archive::extract_tgz;
use linkdeps_fs::io;

use crate::fingerprint::installed_copy_dir;
use crate::manifest::{DependencyLink, PackageDescriptor};
use crate::package_manager::PackageManager;
use crate::{Error, Result};

/// Leading archive components dropped on extraction (`package/`)
const WRAPPER_COMPONENTS: usize = 1;

/// Result of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Installed copy that was written
    pub target: PathBuf,
    /// Whether a previous installed copy was removed
    pub replaced: bool,
    /// Number of archive entries extracted
    pub entries: usize,
}

/// Packs a built dependency and installs it into the consumer.
pub struct InstallPipeline<'a> {
    package_manager: &'a dyn PackageManager,
    consumer_root: &'a Path,
}

impl<'a> InstallPipeline<'a> {
    pub fn new(package_manager: &'a dyn PackageManager, consumer_root: &'a Path) -> Self {
        Self {
            package_manager,
            consumer_root,
        }
    }

    /// Pack `link`'s source directory and replace its installed copy.
    ///
    /// # Errors
    ///
    /// Fails if packing fails, no archive can be found, or the installed
    /// copy cannot be replaced. The archive is removed in every case where
    /// it was found; a failed `pack` also loses any archive it left behind.
    pub fn install(&self, link: &DependencyLink) -> Result<InstallOutcome> {
        let dir = link.source_path.as_path();
        let version = PackageDescriptor::load(dir)?.version;
        let pattern = archive_pattern(&link.name)?;
        let before = snapshot_archives(dir, &pattern)?;

        tracing::info!(dependency = %link.name, "Copying to local node_modules");
        if let Err(e) = self.package_manager.pack(dir) {
            remove_partial_archives(dir, &pattern, &before);
            return Err(e);
        }

        let archive = select_archive(dir, &link.name, version.as_deref(), &before)?;
        let target = installed_copy_dir(self.consumer_root, &link.name);
        tracing::info!(
            archive = %archive.display(),
            target = %target.display(),
            "Extracting"
        );

        let outcome = replace_installed_copy(&archive, &target);
        let cleanup = io::remove_file_if_exists(&archive);
        let (replaced, entries) = outcome?;
        cleanup?;

        Ok(InstallOutcome {
            target,
            replaced,
            entries,
        })
    }
}

/// Archives matching a pattern in one directory, with modification times
pub type ArchiveSnapshot = BTreeMap<String, Option<SystemTime>>;

fn replace_installed_copy(archive: &Path, target: &Path) -> Result<(bool, usize)> {
    let replaced = io::remove_dir_if_exists(target)?;
    fs::create_dir_all(target).map_err(|e| linkdeps_fs::Error::io(target, e))?;
    let entries = extract_tgz(archive, target, WRAPPER_COMPONENTS)?;
    Ok((replaced, entries))
}

fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '@')
        .map(|c| if c.is_whitespace() || c == '/' { '-' } else { c })
        .collect()
}

/// Pattern matching the archive names clients produce for `name`.
///
/// `@scope/pkg` packs as `scope-pkg-1.0.0.tgz` with npm, and yarn writes
/// `pkg-v1.0.0.tgz`; some clients prefix scoped archives with `at-`.
pub fn archive_pattern(name: &str) -> Result<Regex> {
    let pattern = format!(r"^(at-)?{}(.*)\.tgz$", regex::escape(&sanitize(name)));
    Regex::new(&pattern).map_err(|e| Error::Config {
        message: format!("Invalid archive pattern for '{}': {}", name, e),
    })
}

/// File names `pack` writes for `name` at `version`, most common first.
pub fn expected_archive_names(name: &str, version: &str) -> Vec<String> {
    let sanitized = sanitize(name);
    let mut names = Vec::with_capacity(4);
    for prefix in ["", "at-"] {
        for separator in ["-", "-v"] {
            names.push(format!("{prefix}{sanitized}{separator}{version}.tgz"));
        }
    }
    names
}

/// Record the archives in `dir` matching `pattern`.
pub fn snapshot_archives(dir: &Path, pattern: &Regex) -> Result<ArchiveSnapshot> {
    let entries = fs::read_dir(dir).map_err(|e| linkdeps_fs::Error::io(dir, e))?;

    Ok(entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            pattern.is_match(&file_name).then(|| {
                let modified = entry.metadata().and_then(|m| m.modified()).ok();
                (file_name, modified)
            })
        })
        .collect())
}

/// Archives in `after` that are new or were rewritten since `before`.
fn fresh_archives(after: &ArchiveSnapshot, before: &ArchiveSnapshot) -> Vec<String> {
    after
        .iter()
        .filter(|(file_name, modified)| before.get(*file_name) != Some(*modified))
        .map(|(file_name, _)| file_name.clone())
        .collect()
}

/// Find the archive `pack` just produced in `dir` for `name`.
///
/// The name derived from `version` wins. Otherwise the archive must have
/// appeared or changed since `before` was taken; if several did, the first
/// by name is used.
pub fn select_archive(
    dir: &Path,
    name: &str,
    version: Option<&str>,
    before: &ArchiveSnapshot,
) -> Result<PathBuf> {
    let pattern = archive_pattern(name)?;
    let after = snapshot_archives(dir, &pattern)?;

    let expected = version.and_then(|version| {
        expected_archive_names(name, version)
            .into_iter()
            .find(|file_name| after.contains_key(file_name))
    });

    expected
        .or_else(|| fresh_archives(&after, before).into_iter().next())
        .map(|file_name| dir.join(file_name))
        .ok_or_else(|| Error::ArchiveNotFound {
            name: name.to_string(),
            dir: dir.to_path_buf(),
        })
}

fn remove_partial_archives(dir: &Path, pattern: &Regex, before: &ArchiveSnapshot) {
    let Ok(after) = snapshot_archives(dir, pattern) else {
        return;
    };
    for file_name in fresh_archives(&after, before) {
        let path = dir.join(&file_name);
        match io::remove_file_if_exists(&path) {
            Ok(()) => tracing::debug!(archive = %path.display(), "Removed partial archive"),
            Err(e) => tracing::warn!(error = %e, "Could not remove partial archive"),
        }
    }
}
