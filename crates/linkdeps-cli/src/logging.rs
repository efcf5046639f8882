//! Diagnostic output
//!
//! Library events are printed on stderr with the same `[link-deps]` tag the
//! command output uses, followed by the level for anything but `INFO`:
//!
//! ```text
//! [link-deps] Checking mylib
//! [link-deps][WARN] Could not find target directory ../gone
//! ```

use std::fmt;
use std::io::IsTerminal;

use colored::Colorize;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::commands::TAG;

/// Environment variable holding the log filter
const LOG_ENV: &str = "LINK_DEPS_LOG";

/// Install the global subscriber. `--verbose` forces `debug` and shows targets.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .event_format(TaggedFormat {
            with_target: verbose,
        })
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

/// Event formatter producing `[link-deps][LEVEL] message key=value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedFormat {
    pub with_target: bool,
}

fn level_suffix(level: Level) -> &'static str {
    match level {
        Level::ERROR => "[ERROR]",
        Level::WARN => "[WARN]",
        Level::INFO => "",
        Level::DEBUG => "[DEBUG]",
        Level::TRACE => "[TRACE]",
    }
}

impl<S, N> FormatEvent<S, N> for TaggedFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let level = *metadata.level();
        let tag = format!("{}{}", TAG, level_suffix(level));

        if writer.has_ansi_escapes() {
            let styled = match level {
                Level::ERROR => tag.red().bold(),
                Level::WARN => tag.yellow().bold(),
                Level::INFO => tag.blue().bold(),
                Level::DEBUG | Level::TRACE => tag.dimmed(),
            };
            write!(writer, "{} ", styled)?;
        } else {
            write!(writer, "{} ", tag)?;
        }

        if self.with_target {
            write!(writer, "{}: ", metadata.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
