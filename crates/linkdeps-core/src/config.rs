//! Tool configuration from `link-deps.toml`
//!
//! The file is optional; every setting has a default. Command-line flags and
//! environment variables are layered on top by the CLI.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use linkdeps_fs::constants::CONFIG_FILE;
use linkdeps_fs::{NormalizedPath, io};

use crate::package_manager::Client;
use crate::{Error, Result};

/// Quiet window of the watch debouncer when none is configured
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

/// `[package_manager]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManagerSection {
    /// Force a client instead of detecting one
    #[serde(default)]
    pub client: Option<Client>,
}

/// `[watch]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSection {
    /// Quiet window in milliseconds before a burst of events triggers a pass
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Parsed `link-deps.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    #[serde(default)]
    pub package_manager: PackageManagerSection,

    #[serde(default)]
    pub watch: WatchSection,
}

impl ToolConfig {
    /// Parse configuration from TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        let config: ToolConfig = toml::from_str(content)?;
        if config.watch.debounce_ms == 0 {
            return Err(Error::Config {
                message: "watch.debounce_ms must be greater than zero".to_string(),
            });
        }
        Ok(config)
    }

    /// Load `link-deps.toml` from the consumer root, or defaults if absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = NormalizedPath::new(root.join(CONFIG_FILE));
        match io::read_optional_text(&path)? {
            Some(content) => {
                tracing::debug!(path = %path, "Loaded tool configuration");
                Self::parse(&content)
            }
            None => Ok(Self::default()),
        }
    }

    /// The watch debounce window.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.watch.debounce_ms)
    }
}
