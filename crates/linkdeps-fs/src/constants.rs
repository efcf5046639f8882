//! Well-known file and directory names
//!
//! Centralizes the names of the Node.js project layout that link-deps reads
//! and writes, so that no module hardcodes them.

/// The package descriptor of a consumer or dependency project
pub const PACKAGE_JSON: &str = "package.json";

/// The installed-package area of a project
pub const NODE_MODULES: &str = "node_modules";

/// Version-control metadata directory, never fingerprinted
pub const GIT_DIR: &str = ".git";

/// Hidden marker holding the last-synced fingerprint of an installed copy
pub const FINGERPRINT_MARKER: &str = ".link-deps-hash";

/// Optional tool configuration at the consumer root
pub const CONFIG_FILE: &str = "link-deps.toml";

/// Lockfiles used to detect the package-manager client
pub const YARN_LOCK: &str = "yarn.lock";
pub const NPM_LOCK: &str = "package-lock.json";
