//! [`TestWorkspace`] builder for link-deps test scenarios.
//!
//! A workspace is a temporary directory holding one consumer project under
//! `app/` and any number of dependency projects as its siblings, so that
//! link declarations look like the real thing (`"mylib": "../mylib"`).

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Directory name of the consumer project inside the workspace.
pub const CONSUMER_DIR: &str = "app";

/// A temporary consumer project plus sibling dependency directories.
///
/// # Example
///
/// ```rust,no_run
/// use linkdeps_test_utils::project::TestWorkspace;
/// use serde_json::json;
///
/// let ws = TestWorkspace::new();
/// ws.dependency("mylib", "mylib", &[("a.js", "a"), ("b.js", "b")]);
/// ws.consumer(json!({
///     "name": "app",
///     "dependencies": { "mylib": "^1.0.0" },
///     "linkDependencies": { "mylib": "../mylib" }
/// }));
/// ws.assert_file_exists("mylib/a.js");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create an empty workspace with an empty `app/` directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(CONSUMER_DIR)).unwrap();
        Self { temp_dir }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root of the consumer project.
    pub fn consumer_root(&self) -> PathBuf {
        self.root().join(CONSUMER_DIR)
    }

    /// Write the consumer's `package.json`.
    pub fn consumer(&self, manifest: Value) {
        self.write_json(&format!("{CONSUMER_DIR}/package.json"), &manifest);
    }

    /// Create a dependency project at `dir` with a `package.json` declaring
    /// `name` and the given source files.
    ///
    /// Returns the absolute path of the dependency directory.
    pub fn dependency(&self, dir: &str, name: &str, files: &[(&str, &str)]) -> PathBuf {
        self.write_json(
            &format!("{dir}/package.json"),
            &json!({ "name": name, "version": "1.0.0" }),
        );
        for (rel, content) in files {
            self.write(&format!("{dir}/{rel}"), content);
        }
        self.root().join(dir)
    }

    /// Write `content` to `path` (relative to root), creating parents.
    pub fn write(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", full_path.display()));
    }

    /// Write pretty JSON to `path` (relative to root).
    pub fn write_json(&self, path: &str, value: &Value) {
        self.write(path, &serde_json::to_string_pretty(value).unwrap());
    }

    /// Read `path` (relative to root) as text.
    pub fn read(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Read `path` (relative to root) as JSON.
    pub fn read_json(&self, path: &str) -> Value {
        serde_json::from_str(&self.read(path)).unwrap()
    }

    /// Assert that `path` (relative to root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}
