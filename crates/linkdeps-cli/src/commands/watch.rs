//! Watch command implementation

use colored::Colorize;

use linkdeps_core::{ConsumerManifest, WatchScheduler};

use super::sync::print_report;
use super::{Context, TAG, warn};
use crate::error::{CliError, Result};

/// Watch every linked source directory and run a sync pass after each burst
/// of changes. Returns only on a configuration error or when every watch has
/// ended.
pub fn run_watch(context: &Context) -> Result<()> {
    let manifest = ConsumerManifest::load(&context.root)?;
    let mut paths = Vec::new();
    for link in manifest.links()? {
        if link.source_path.is_dir() {
            paths.push(link.source_path);
        } else {
            warn(format!(
                "Not watching '{}': '{}' does not exist",
                link.name,
                link.source_path.display()
            ));
        }
    }
    if paths.is_empty() {
        return Err(CliError::user("No linked dependency directories to watch"));
    }

    let engine = context.engine()?;
    let scheduler = WatchScheduler::new(&paths, context.config.debounce())?;
    println!(
        "{} Watching {} linked dependencies {}",
        TAG.blue().bold(),
        scheduler.watched().len(),
        "(Ctrl+C to stop)".dimmed()
    );

    scheduler.run(|| {
        let report = engine.sync()?;
        print_report(&report);
        Ok(())
    })?;
    Ok(())
}
