//! SyncEngine implementation
//!
//! The SyncEngine drives one pass over every link declared in the consumer
//! manifest: resolve the source directory, fingerprint it, compare against
//! the stored record and, on change, build, pack, install and record.

use std::path::{Path, PathBuf};

use linkdeps_fs::canonicalize;

use crate::build::BuildOrchestrator;
use crate::fingerprint::{FingerprintStore, compute_fingerprint};
use crate::install::InstallPipeline;
use crate::manifest::{ConsumerManifest, DependencyLink};
use crate::package_manager::PackageManager;
use crate::{Error, Result};

use super::report::{DependencyReport, DependencyStatus, SyncReport};

/// Engine for synchronizing linked dependencies into a consumer project
///
/// Dependencies are processed one after another in declaration order. The
/// first fatal error ends the pass; dependencies handled before it keep
/// their new installed copies and records.
pub struct SyncEngine {
    /// Absolute root of the consumer project
    root: PathBuf,
    /// Client used for install, build and pack
    package_manager: Box<dyn PackageManager>,
    /// Last-synced fingerprints
    store: FingerprintStore,
}

impl SyncEngine {
    /// Create a new SyncEngine for the consumer at `root`
    ///
    /// # Errors
    ///
    /// Returns an error if `root` cannot be resolved.
    pub fn new(root: &Path, package_manager: Box<dyn PackageManager>) -> Result<Self> {
        let root = canonicalize(root)?;
        let store = FingerprintStore::new(root.clone());
        Ok(Self {
            root,
            package_manager,
            store,
        })
    }

    /// Root of the consumer project.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The injected package manager.
    pub fn package_manager(&self) -> &dyn PackageManager {
        self.package_manager.as_ref()
    }

    /// The fingerprint store of this consumer.
    pub fn store(&self) -> &FingerprintStore {
        &self.store
    }

    /// Run one synchronization pass over all declared links.
    ///
    /// The manifest is read fresh on every call, so a long-running watcher
    /// picks up edits to `linkDependencies`.
    ///
    /// # Errors
    ///
    /// Configuration errors (missing manifest or link section, unresolvable
    /// source, name mismatch) and runtime failures (subprocess, I/O) both
    /// abort the pass.
    pub fn sync(&self) -> Result<SyncReport> {
        let manifest = ConsumerManifest::load(&self.root)?;
        let links = manifest.links()?;
        let mut report = SyncReport::default();

        for link in &links {
            let status = self.sync_link(&manifest, link, &mut report)?;
            report.dependencies.push(DependencyReport {
                name: link.name.clone(),
                source_path: link.source_path.clone(),
                status,
            });
        }

        Ok(report)
    }

    fn sync_link(
        &self,
        manifest: &ConsumerManifest,
        link: &DependencyLink,
        report: &mut SyncReport,
    ) -> Result<DependencyStatus> {
        tracing::info!(
            "Checking '{}' in '{}'",
            link.name,
            link.source_path.display()
        );

        let regular_version = manifest.regular_version(&link.name);
        if regular_version.is_none() {
            report.warn(format!(
                "The relative dependency '{}' should also be added as normal- or dev-dependency",
                link.name
            ));
        }

        if !link.source_path.is_dir() {
            return match regular_version {
                Some(version) => {
                    report.warn(format!(
                        "Could not find target directory '{}', using normally installed version ('{}') instead",
                        link.source_path.display(),
                        version
                    ));
                    Ok(DependencyStatus::SkippedMissingSource {
                        fallback_version: version.to_string(),
                    })
                }
                None => Err(Error::UnresolvedDependency {
                    name: link.name.clone(),
                    path: link.source_path.clone(),
                }),
            };
        }

        let fingerprint = compute_fingerprint(&link.source_path, &self.root)?;
        let record = self.store.load(&link.name)?;

        if let Some(record) = &record
            && fingerprint.matches(record)
        {
            tracing::info!(dependency = %link.name, "No changes");
            return Ok(DependencyStatus::Unchanged);
        }

        let change = record
            .as_deref()
            .and_then(|record| fingerprint.first_change(record));
        if let Some(change) = &change {
            tracing::info!(dependency = %link.name, "{}", change);
        }

        let package_manager = self.package_manager.as_ref();
        let build = BuildOrchestrator::new(package_manager).prepare(link)?;
        let install = InstallPipeline::new(package_manager, &self.root).install(link)?;
        self.store.save(&link.name, &fingerprint)?;

        tracing::info!("Re-installing {}... DONE", link.name);
        Ok(DependencyStatus::Reinstalled {
            change,
            build,
            install,
        })
    }
}
