//! Build orchestration for a linked dependency

use std::path::Path;

use linkdeps_fs::constants::NODE_MODULES;

use crate::manifest::{DependencyLink, PackageDescriptor};
use crate::package_manager::PackageManager;
use crate::{Error, Result};

/// Script run when a dependency declares one
pub const BUILD_SCRIPT: &str = "build";

/// What the orchestrator did to make a dependency buildable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutcome {
    /// `install` ran because the dependency had no `node_modules`
    pub installed_dependencies: bool,
    /// The `build` script ran
    pub built: bool,
}

/// Makes a dependency's source directory ready for packing.
pub struct BuildOrchestrator<'a> {
    package_manager: &'a dyn PackageManager,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(package_manager: &'a dyn PackageManager) -> Self {
        Self { package_manager }
    }

    /// Install the dependency's own dependencies if that never happened,
    /// verify its declared name, and run its build script if it has one.
    ///
    /// # Errors
    ///
    /// Returns `NameMismatch` when the dependency's package.json names a
    /// different package than the link, and propagates any failing
    /// subprocess.
    pub fn prepare(&self, link: &DependencyLink) -> Result<BuildOutcome> {
        let dir = link.source_path.as_path();
        let mut outcome = BuildOutcome::default();

        if !has_local_install(dir) {
            tracing::info!(dir = %dir.display(), "Running 'install'");
            self.package_manager.install(dir)?;
            outcome.installed_dependencies = true;
        }

        let descriptor = PackageDescriptor::load(dir)?;
        let found = descriptor.name.clone().unwrap_or_default();
        if found != link.name {
            return Err(Error::NameMismatch {
                expected: link.name.clone(),
                found,
            });
        }

        if descriptor.has_script(BUILD_SCRIPT) {
            tracing::info!(dependency = %link.name, dir = %dir.display(), "Building");
            self.package_manager.run_script(dir, BUILD_SCRIPT)?;
            outcome.built = true;
        } else {
            tracing::debug!(dependency = %link.name, "No build script declared");
        }

        Ok(outcome)
    }
}

fn has_local_install(dir: &Path) -> bool {
    dir.join(NODE_MODULES).is_dir()
}
