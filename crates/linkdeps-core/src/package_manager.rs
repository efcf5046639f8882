//! Package-manager abstraction
//!
//! The pipeline needs exactly four operations from a package manager:
//! `install`, `run <script>`, `pack` and `add [-D] <name>`. They sit behind the
//! [`PackageManager`] trait so a client is chosen once per process and
//! injected, and so tests can substitute a recording fake.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use linkdeps_fs::constants::{NPM_LOCK, YARN_LOCK};

use crate::{Error, Result};

/// Supported package-manager clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Client {
    Npm,
    Yarn,
}

impl Client {
    /// Executable name of the client.
    pub fn program(self) -> &'static str {
        match self {
            Client::Npm => "npm",
            Client::Yarn => "yarn",
        }
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for Client {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "npm" => Ok(Client::Npm),
            "yarn" => Ok(Client::Yarn),
            other => Err(Error::Config {
                message: format!("Unknown package manager '{}' (expected npm or yarn)", other),
            }),
        }
    }
}

/// The package-manager operations the synchronization pipeline relies on.
///
/// Every operation runs synchronously in `dir` and succeeds only when the
/// underlying command exits with status zero.
pub trait PackageManager: Send + Sync {
    /// Human-readable client name for diagnostics
    fn name(&self) -> &str;

    /// Populate `dir`'s own dependency tree
    fn install(&self, dir: &Path) -> Result<()>;

    /// Execute the named script from `dir`'s package.json
    fn run_script(&self, dir: &Path, script: &str) -> Result<()>;

    /// Produce a distributable `.tgz` archive inside `dir`
    fn pack(&self, dir: &Path) -> Result<()>;

    /// Register and fetch `name` as a regular (or dev) dependency of `dir`
    fn add(&self, dir: &Path, name: &str, dev: bool) -> Result<()>;
}

/// A [`PackageManager`] backed by the `npm` or `yarn` executable.
#[derive(Debug, Clone)]
pub struct CommandPackageManager {
    client: Client,
    program: PathBuf,
}

impl CommandPackageManager {
    /// Create a manager for `client`, resolving its executable on `PATH`.
    ///
    /// Resolution goes through `which` so that Windows shims such as
    /// `npm.cmd` are found; if lookup fails the bare name is used and any
    /// problem surfaces when the first command is spawned.
    pub fn new(client: Client) -> Self {
        let program =
            which::which(client.program()).unwrap_or_else(|_| PathBuf::from(client.program()));
        Self { client, program }
    }

    /// The client this manager drives.
    pub fn client(&self) -> Client {
        self.client
    }

    fn run(&self, dir: &Path, args: &[&str], quiet: bool) -> Result<()> {
        let command_line = format!("{} {}", self.client.program(), args.join(" "));
        tracing::debug!(command = %command_line, dir = %dir.display(), "Running");

        let mut cmd = Command::new(&self.program);
        cmd.current_dir(dir).args(args);
        if quiet {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }

        let status = cmd.status().map_err(|source| Error::CommandSpawn {
            program: self.client.program().to_string(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                command: command_line,
                dir: dir.to_path_buf(),
                code: status.code(),
            })
        }
    }
}

impl PackageManager for CommandPackageManager {
    fn name(&self) -> &str {
        self.client.program()
    }

    fn install(&self, dir: &Path) -> Result<()> {
        self.run(dir, &["install"], false)
    }

    fn run_script(&self, dir: &Path, script: &str) -> Result<()> {
        self.run(dir, &["run", script], false)
    }

    fn pack(&self, dir: &Path) -> Result<()> {
        self.run(dir, &["pack"], false)
    }

    fn add(&self, dir: &Path, name: &str, dev: bool) -> Result<()> {
        if dev {
            self.run(dir, &["add", "-D", name], true)
        } else {
            self.run(dir, &["add", name], true)
        }
    }
}

/// Pick the client for the project at `root`.
///
/// An explicit preference wins. Otherwise a lockfile decides, then whether
/// `yarn` is installed, falling back to npm.
pub fn detect_client(root: &Path, preferred: Option<Client>) -> Client {
    if let Some(client) = preferred {
        return client;
    }
    let yarn_available = || which::which(Client::Yarn.program()).is_ok();

    let client = if root.join(YARN_LOCK).is_file() && yarn_available() {
        Client::Yarn
    } else if root.join(NPM_LOCK).is_file() {
        Client::Npm
    } else if yarn_available() {
        Client::Yarn
    } else {
        Client::Npm
    };
    tracing::debug!(%client, root = %root.display(), "Detected package manager");
    client
}
