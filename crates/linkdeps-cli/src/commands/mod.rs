//! Command implementations for linkdeps-cli

pub mod add;
pub mod context;
pub mod init;
pub mod sync;
pub mod watch;

pub use add::run_add;
pub use context::Context;
pub use init::run_init;
pub use sync::run_sync;
pub use watch::run_watch;

use colored::Colorize;

/// Prefix of every line link-deps prints
pub const TAG: &str = "[link-deps]";

/// Print an advisory warning to stderr.
pub(crate) fn warn(message: impl AsRef<str>) {
    eprintln!(
        "{} {}",
        format!("{}[WARN]", TAG).yellow().bold(),
        message.as_ref()
    );
}
