//! Shared test utilities for the link-deps workspace.
//!
//! This crate provides standardised fixtures so that crate test suites do not
//! each reinvent project scaffolding. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`project`]: [`TestWorkspace`](project::TestWorkspace) holding a
//!   consumer project and its linked dependency directories
//! - [`tarball`]: builders for npm-style `.tgz` package archives

pub mod project;
pub mod tarball;
