//! Sync command implementation

use colored::Colorize;

use linkdeps_core::{DependencyStatus, SyncReport};

use super::{Context, TAG};
use crate::error::Result;

/// Run one synchronization pass and print a summary.
pub fn run_sync(context: &Context) -> Result<()> {
    let engine = context.engine()?;
    let report = engine.sync()?;
    print_report(&report);
    Ok(())
}

/// Print one line per dependency of a finished pass.
pub fn print_report(report: &SyncReport) {
    for dependency in &report.dependencies {
        let name = dependency.name.cyan();
        match &dependency.status {
            DependencyStatus::Unchanged => {
                println!("{} {} {}", TAG.blue().bold(), name, "up to date".dimmed());
            }
            DependencyStatus::Reinstalled { change, .. } => match change {
                Some(change) => println!(
                    "{} {} {} ({})",
                    TAG.blue().bold(),
                    name,
                    "reinstalled".green().bold(),
                    change
                ),
                None => println!(
                    "{} {} {}",
                    TAG.blue().bold(),
                    name,
                    "installed".green().bold()
                ),
            },
            DependencyStatus::SkippedMissingSource { fallback_version } => println!(
                "{} {} {} (using {})",
                TAG.blue().bold(),
                name,
                "skipped".yellow().bold(),
                fallback_version
            ),
        }
    }

    if report.dependencies.is_empty() {
        println!("{} No linked dependencies declared.", TAG.blue().bold());
    } else if report.is_noop() {
        println!("{} {}", TAG.blue().bold(), "OK".green().bold());
    } else {
        println!(
            "{} {} {} dependencies reinstalled.",
            TAG.blue().bold(),
            "OK".green().bold(),
            report.reinstalled()
        );
    }
}
