#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use linkdeps_core::{Error, PackageDescriptor, PackageManager, Result};
use linkdeps_test_utils::tarball::pack_dir;

/// A package-manager call recorded by [`FakePackageManager`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Install(PathBuf),
    RunScript(PathBuf, String),
    Pack(PathBuf),
    Add(PathBuf, String, bool),
}

/// What `pack` leaves behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackMode {
    /// A real npm-style tarball of the directory
    Tarball,
    /// A `.tgz` file that is not a gzip stream
    Corrupt,
    /// No archive at all
    Nothing,
    /// A truncated archive, then a non-zero exit
    Partial,
}

#[derive(Debug)]
struct FakeState {
    calls: Vec<Call>,
    fail_on: Option<&'static str>,
    pack_mode: PackMode,
}

/// Recording stand-in for npm/yarn.
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another.
#[derive(Debug, Clone)]
pub struct FakePackageManager {
    state: Arc<Mutex<FakeState>>,
}

impl Default for FakePackageManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePackageManager {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                fail_on: None,
                pack_mode: PackMode::Tarball,
            })),
        }
    }

    /// Make the named operation (`install`, `run`, `pack`, `add`) exit non-zero.
    pub fn failing(operation: &'static str) -> Self {
        let manager = Self::new();
        manager.state.lock().unwrap().fail_on = Some(operation);
        manager
    }

    pub fn with_pack_mode(pack_mode: PackMode) -> Self {
        let manager = Self::new();
        manager.state.lock().unwrap().pack_mode = pack_mode;
        manager
    }

    pub fn boxed(&self) -> Box<dyn PackageManager> {
        Box::new(self.clone())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn pack_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Pack(_)))
            .count()
    }

    fn record(&self, call: Call, operation: &str, dir: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.fail_on == Some(operation) {
            return Err(Error::CommandFailed {
                command: format!("fake {}", operation),
                dir: dir.to_path_buf(),
                code: Some(1),
            });
        }
        Ok(())
    }
}

impl PackageManager for FakePackageManager {
    fn name(&self) -> &str {
        "fake"
    }

    fn install(&self, dir: &Path) -> Result<()> {
        self.record(Call::Install(dir.to_path_buf()), "install", dir)?;
        fs::create_dir_all(dir.join("node_modules"))?;
        Ok(())
    }

    fn run_script(&self, dir: &Path, script: &str) -> Result<()> {
        self.record(Call::RunScript(dir.to_path_buf(), script.to_string()), "run", dir)
    }

    fn pack(&self, dir: &Path) -> Result<()> {
        self.record(Call::Pack(dir.to_path_buf()), "pack", dir)?;

        let descriptor = PackageDescriptor::load(dir)?;
        let name = descriptor
            .name
            .unwrap_or_default()
            .replace('@', "")
            .replace('/', "-");
        let version = descriptor.version.unwrap_or_else(|| "0.0.0".to_string());
        let archive = dir.join(format!("{}-{}.tgz", name, version));

        match self.state.lock().unwrap().pack_mode {
            PackMode::Tarball => pack_dir(dir, &archive, "package"),
            PackMode::Corrupt => fs::write(&archive, b"not a tarball")?,
            PackMode::Nothing => {}
            PackMode::Partial => {
                fs::write(&archive, b"\x1f\x8b\x08")?;
                return Err(Error::CommandFailed {
                    command: "fake pack".to_string(),
                    dir: dir.to_path_buf(),
                    code: Some(1),
                });
            }
        }
        Ok(())
    }

    fn add(&self, dir: &Path, name: &str, dev: bool) -> Result<()> {
        self.record(Call::Add(dir.to_path_buf(), name.to_string(), dev), "add", dir)
    }
}

/// Files with a `.tgz` extension directly inside `dir`.
pub fn archives_in(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tgz"))
        .collect()
}
