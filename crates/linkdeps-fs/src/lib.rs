//! Filesystem primitives for link-deps
//!
//! Provides normalized relative paths, content digests, atomic writes and
//! tarball extraction. Everything above this layer talks to the disk through
//! these helpers.

pub mod archive;
pub mod checksum;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use error::{Error, Result};
pub use path::{NormalizedPath, canonicalize};
