//! package.json handling
//!
//! Two views of the same file format are used:
//!
//! - [`ConsumerManifest`]: the consumer project's package.json, edited in
//!   place. Every command loads it, mutates it and saves it again; nothing is
//!   cached between commands. Unknown fields and key order are preserved.
//! - [`PackageDescriptor`]: the read-only subset of a dependency's own
//!   package.json that the build and pack steps need.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use linkdeps_fs::constants::PACKAGE_JSON;
use linkdeps_fs::{NormalizedPath, canonicalize, io};

use crate::{Error, Result};

/// Manifest key holding the link declarations
pub const LINK_SECTION: &str = "linkDependencies";

const DEPENDENCIES: &str = "dependencies";
const DEV_DEPENDENCIES: &str = "devDependencies";
const SCRIPTS: &str = "scripts";

/// A named association between a dependency and its local source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyLink {
    /// Package name, also the key in `node_modules`
    pub name: String,
    /// Path as written in the manifest, relative to the consumer root
    pub declared_path: String,
    /// Absolute source directory
    pub source_path: PathBuf,
}

/// The consumer project's package.json.
#[derive(Debug, Clone)]
pub struct ConsumerManifest {
    root: PathBuf,
    doc: Map<String, Value>,
}

impl ConsumerManifest {
    /// Load the manifest of the project rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns `ManifestNotFound` when there is no package.json, and
    /// `InvalidManifest` when it is not a JSON object.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(PACKAGE_JSON);
        if !path.is_file() {
            return Err(Error::ManifestNotFound { path });
        }
        let root = canonicalize(root)?;
        let content = io::read_text(&NormalizedPath::new(&path))?;
        let doc = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(doc)) => doc,
            Ok(_) => {
                return Err(Error::InvalidManifest {
                    path,
                    message: "top-level value is not an object".to_string(),
                });
            }
            Err(e) => {
                return Err(Error::InvalidManifest {
                    path,
                    message: e.to_string(),
                });
            }
        };

        Ok(Self { root, doc })
    }

    /// Absolute root directory of the consumer project.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the package.json file.
    pub fn path(&self) -> PathBuf {
        self.root.join(PACKAGE_JSON)
    }

    /// Whether a `linkDependencies` section exists.
    pub fn has_link_section(&self) -> bool {
        self.doc.contains_key(LINK_SECTION)
    }

    /// Link declarations in manifest order.
    ///
    /// # Errors
    ///
    /// Returns `NoLinkSection` when the section is missing and
    /// `InvalidManifest` when it is not a map of strings.
    pub fn links(&self) -> Result<Vec<DependencyLink>> {
        let section = self.doc.get(LINK_SECTION).ok_or(Error::NoLinkSection)?;
        let entries = section.as_object().ok_or_else(|| Error::InvalidManifest {
            path: self.path(),
            message: format!("'{}' must be an object", LINK_SECTION),
        })?;

        entries
            .iter()
            .map(|(name, value)| {
                let declared_path = value.as_str().ok_or_else(|| Error::InvalidManifest {
                    path: self.path(),
                    message: format!("link path of '{}' must be a string", name),
                })?;
                Ok(DependencyLink {
                    name: name.clone(),
                    declared_path: declared_path.to_string(),
                    source_path: resolve_relative(&self.root, declared_path),
                })
            })
            .collect()
    }

    /// Version range of `name` in `dependencies` or `devDependencies`.
    pub fn regular_version(&self, name: &str) -> Option<&str> {
        [DEPENDENCIES, DEV_DEPENDENCIES]
            .iter()
            .filter_map(|key| self.doc.get(*key))
            .filter_map(|deps| deps.get(name))
            .find_map(Value::as_str)
    }

    /// Create an empty `linkDependencies` section if none exists.
    ///
    /// Returns whether the manifest changed.
    pub fn ensure_link_section(&mut self) -> bool {
        if self.has_link_section() {
            return false;
        }
        self.doc
            .insert(LINK_SECTION.to_string(), Value::Object(Map::new()));
        true
    }

    /// Record `name` as linked to `declared_path`.
    pub fn set_link(&mut self, name: &str, declared_path: &str) {
        let section = self
            .doc
            .entry(LINK_SECTION)
            .or_insert_with(|| Value::Object(Map::new()));
        if !section.is_object() {
            *section = Value::Object(Map::new());
        }
        if let Value::Object(links) = section {
            links.insert(name.to_string(), Value::String(declared_path.to_string()));
        }
    }

    /// Make sure the lifecycle script `script` invokes `command`.
    ///
    /// An absent script is created; an existing one that does not mention
    /// `command` gets ` && <command>` appended. Returns whether the manifest
    /// changed.
    pub fn ensure_script(&mut self, script: &str, command: &str) -> bool {
        let scripts = self
            .doc
            .entry(SCRIPTS)
            .or_insert_with(|| Value::Object(Map::new()));
        if !scripts.is_object() {
            *scripts = Value::Object(Map::new());
        }
        let Value::Object(scripts) = scripts else {
            return false;
        };

        match scripts.get(script).and_then(Value::as_str) {
            Some(existing) if existing.contains(command) => false,
            Some(existing) => {
                let updated = format!("{} && {}", existing, command);
                scripts.insert(script.to_string(), Value::String(updated));
                true
            }
            None => {
                scripts.insert(script.to_string(), Value::String(command.to_string()));
                true
            }
        }
    }

    /// Write the manifest back as 2-space indented JSON.
    pub fn save(&self) -> Result<()> {
        let mut content = serde_json::to_string_pretty(&self.doc)?;
        content.push('\n');
        io::write_text(&NormalizedPath::new(self.path()), &content)?;
        Ok(())
    }
}

/// The parts of a dependency's own package.json the pipeline reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub scripts: BTreeMap<String, Value>,
}

impl PackageDescriptor {
    /// Read the package.json inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns `ManifestNotFound` if the file is missing and
    /// `InvalidManifest` if it cannot be parsed.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(PACKAGE_JSON);
        if !path.is_file() {
            return Err(Error::ManifestNotFound { path });
        }
        let content = io::read_text(&NormalizedPath::new(&path))?;
        serde_json::from_str(&content).map_err(|e| Error::InvalidManifest {
            path,
            message: e.to_string(),
        })
    }

    /// Whether the package declares the script `name`.
    pub fn has_script(&self, name: &str) -> bool {
        self.scripts.get(name).is_some_and(|s| s.is_string())
    }
}

/// Resolve a manifest-relative path against `root` without touching the
/// filesystem, folding `.` and `..` segments.
pub fn resolve_relative(root: &Path, relative: &str) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in root.join(relative).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

/// The nearest directory at or above `start` that holds a package.json.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PACKAGE_JSON).is_file())
        .map(Path::to_path_buf)
}
