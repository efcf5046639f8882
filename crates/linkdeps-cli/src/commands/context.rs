//! Per-invocation setup shared by all commands

use std::path::{Path, PathBuf};

use linkdeps_core::manifest::find_project_root;
use linkdeps_core::{
    Client, CommandPackageManager, PackageManager, SyncEngine, ToolConfig, detect_client,
};
use linkdeps_fs::canonicalize;

use crate::error::Result;

/// Consumer root, tool configuration and the selected client.
#[derive(Debug, Clone)]
pub struct Context {
    pub root: PathBuf,
    pub config: ToolConfig,
    pub client: Client,
}

impl Context {
    /// Resolve everything a command needs for the project at `cwd`.
    ///
    /// With `discover`, the project is the nearest directory at or above
    /// `cwd` holding a package.json; if there is none `cwd` is kept so the
    /// missing manifest is reported there. `client_flag` comes from
    /// `--client` or `LINK_DEPS_CLIENT` and beats the config file, which
    /// beats detection.
    pub fn load(cwd: &Path, discover: bool, client_flag: Option<&str>) -> Result<Self> {
        let cwd = canonicalize(cwd)?;
        let root = if discover {
            find_project_root(&cwd).unwrap_or(cwd)
        } else {
            cwd
        };
        let config = ToolConfig::load(&root)?;

        let preferred = match client_flag {
            Some(flag) => Some(flag.parse::<Client>()?),
            None => config.package_manager.client,
        };
        let client = detect_client(&root, preferred);
        tracing::debug!(%client, root = %root.display(), "Resolved context");

        Ok(Self {
            root,
            config,
            client,
        })
    }

    /// A fresh package manager for the selected client.
    pub fn package_manager(&self) -> Box<dyn PackageManager> {
        Box::new(CommandPackageManager::new(self.client))
    }

    /// A sync engine for the consumer project.
    pub fn engine(&self) -> Result<SyncEngine> {
        Ok(SyncEngine::new(&self.root, self.package_manager())?)
    }
}
