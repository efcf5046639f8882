//! Init command implementation

use colored::Colorize;

use linkdeps_core::{ConsumerManifest, PackageManager};

use super::{Context, TAG, warn};
use crate::error::Result;

/// Name of this tool's own npm package and executable
pub const SELF_PACKAGE: &str = "link-deps";

/// Prepare the consumer's package.json for link-deps.
pub fn run_init(context: &Context, script: &str) -> Result<()> {
    let package_manager = context.package_manager();
    init_project(context, package_manager.as_ref(), script)
}

/// Register link-deps as a dev dependency, add an empty link section and
/// hook `link-deps` into `script`.
///
/// Used by both `init` and `add`.
pub fn init_project(context: &Context, package_manager: &dyn PackageManager, script: &str) -> Result<()> {
    let manifest = ConsumerManifest::load(&context.root)?;
    if manifest.regular_version(SELF_PACKAGE).is_none() {
        println!(
            "{} Adding {} as dev dependency",
            TAG.blue().bold(),
            SELF_PACKAGE.cyan()
        );
        if let Err(e) = package_manager.add(&context.root, SELF_PACKAGE, true) {
            warn(format!(
                "Could not add '{}' as dev dependency: {}",
                SELF_PACKAGE, e
            ));
        }
    }

    // `add` may have rewritten package.json
    let mut manifest = ConsumerManifest::load(&context.root)?;
    let created_section = manifest.ensure_link_section();
    let hooked = manifest.ensure_script(script, SELF_PACKAGE);
    if created_section || hooked {
        manifest.save()?;
    }

    if created_section {
        println!("{} Added empty 'linkDependencies'", TAG.blue().bold());
    }
    if hooked {
        println!(
            "{} Script '{}' now runs {}",
            TAG.blue().bold(),
            script,
            SELF_PACKAGE.cyan()
        );
    }
    println!("{} {}", TAG.blue().bold(), "Initialized".green().bold());
    Ok(())
}
