//! Add command implementation

use colored::Colorize;

use linkdeps_core::manifest::resolve_relative;
use linkdeps_core::{ConsumerManifest, Error as CoreError, PackageDescriptor};

use super::init::init_project;
use super::sync::print_report;
use super::{Context, TAG, warn};
use crate::error::{CliError, Result};

/// A local package about to be linked
#[derive(Debug, Clone, PartialEq, Eq)]
struct LocalPackage {
    name: String,
    declared_path: String,
}

/// Link the packages at `paths` into the consumer and run a sync pass.
///
/// Without paths this only initializes the project and runs `script`.
pub fn run_add(context: &Context, paths: &[String], dev: bool, script: &str) -> Result<()> {
    let package_manager = context.package_manager();
    init_project(context, package_manager.as_ref(), script)?;

    if paths.is_empty() {
        warn(format!("No paths provided, running '{}'", script));
        package_manager.run_script(&context.root, script)?;
        return Ok(());
    }

    let packages = paths
        .iter()
        .map(|path| resolve_package(context, path))
        .collect::<Result<Vec<_>>>()?;

    let manifest = ConsumerManifest::load(&context.root)?;
    for package in &packages {
        if manifest.regular_version(&package.name).is_some() {
            continue;
        }
        tracing::info!(package = %package.name, dev, "Adding from registry");
        if let Err(e) = package_manager.add(&context.root, &package.name, dev) {
            tracing::debug!(error = %e, "Registry add failed");
            warn(format!(
                "Unable to fetch {} from registry. Installing as a relative dependency only.",
                package.name
            ));
        }
    }

    // Re-read: `add` rewrites package.json
    let mut manifest = ConsumerManifest::load(&context.root)?;
    for package in &packages {
        manifest.set_link(&package.name, &package.declared_path);
        println!(
            "{} Linked {} -> {}",
            TAG.blue().bold(),
            package.name.cyan(),
            package.declared_path
        );
    }
    manifest.save()?;

    let report = context.engine()?.sync()?;
    print_report(&report);
    Ok(())
}

fn resolve_package(context: &Context, path: &str) -> Result<LocalPackage> {
    let dir = resolve_relative(&context.root, path);
    let descriptor = PackageDescriptor::load(&dir).map_err(|e| match e {
        CoreError::ManifestNotFound { .. } => CoreError::UnresolvablePath { path: dir.clone() },
        other => other,
    })?;

    let name = descriptor.name.ok_or_else(|| {
        CliError::user(format!("package.json in '{}' has no name", dir.display()))
    })?;
    Ok(LocalPackage {
        name,
        declared_path: path.to_string(),
    })
}
