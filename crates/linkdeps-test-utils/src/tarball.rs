//! Builders for npm-style package archives.
//!
//! Archives produced here wrap every entry in a single top-level directory,
//! the same shape `npm pack` and `yarn pack` produce.

use std::fs::{self, File};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

/// Write a gzip tarball at `archive` containing `files`, each placed below
/// the `wrapper` directory.
///
/// # Panics
/// Panics if the archive cannot be written.
pub fn write_tgz(archive: &Path, wrapper: &str, files: &[(&str, &[u8])]) {
    let file = File::create(archive)
        .unwrap_or_else(|e| panic!("write_tgz: failed to create {}: {e}", archive.display()));
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    for (rel, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{wrapper}/{rel}"), *content)
            .unwrap_or_else(|e| panic!("write_tgz: failed to append {rel}: {e}"));
    }

    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .unwrap_or_else(|e| panic!("write_tgz: failed to finish {}: {e}", archive.display()));
}

/// Pack every regular file under `src` into a tarball below `wrapper`.
///
/// `node_modules`, `.git` and existing `.tgz` files are left out, mirroring
/// what a package manager ships.
///
/// # Panics
/// Panics if `src` cannot be walked or the archive cannot be written.
pub fn pack_dir(src: &Path, archive: &Path, wrapper: &str) {
    let mut files = Vec::new();
    collect_files(src, src, &mut files);
    files.sort();

    let contents: Vec<(String, Vec<u8>)> = files
        .into_iter()
        .map(|rel| {
            let content = fs::read(src.join(&rel))
                .unwrap_or_else(|e| panic!("pack_dir: failed to read {rel}: {e}"));
            (rel, content)
        })
        .collect();
    let borrowed: Vec<(&str, &[u8])> = contents
        .iter()
        .map(|(rel, content)| (rel.as_str(), content.as_slice()))
        .collect();

    write_tgz(archive, wrapper, &borrowed);
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let entries = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("pack_dir: failed to read {}: {e}", dir.display()));
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if path.is_dir() {
            if name != "node_modules" && name != ".git" {
                collect_files(root, &path, out);
            }
        } else if !name.ends_with(".tgz") {
            let rel = path
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            out.push(rel);
        }
    }
}

/// One entry of a hand-assembled archive
#[derive(Debug, Clone, Copy)]
pub enum RawEntry<'a> {
    /// Regular file with content
    File(&'a str, &'a [u8]),
    /// Symbolic link pointing at the given target
    Symlink(&'a str, &'a str),
    /// Hard link to the given archive path
    HardLink(&'a str, &'a str),
}

/// Write a gzip tarball whose entry names are stored verbatim.
///
/// `tar::Builder` refuses `..` components, so hostile archives for
/// extraction-safety tests have to be assembled from raw headers.
///
/// # Panics
/// Panics if a name exceeds 100 bytes or the archive cannot be written.
pub fn write_raw_tgz(archive: &Path, files: &[(&str, &[u8])]) {
    let entries: Vec<RawEntry<'_>> = files
        .iter()
        .map(|&(name, content)| RawEntry::File(name, content))
        .collect();
    write_raw_entries_tgz(archive, &entries);
}

/// Like [`write_raw_tgz`], but with links as well as files.
///
/// # Panics
/// Panics if a name exceeds 100 bytes or the archive cannot be written.
pub fn write_raw_entries_tgz(archive: &Path, entries: &[RawEntry<'_>]) {
    let file = File::create(archive)
        .unwrap_or_else(|e| panic!("write_raw_tgz: failed to create {}: {e}", archive.display()));
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    for entry in entries {
        let (name, content, link) = match *entry {
            RawEntry::File(name, content) => (name, content, None),
            RawEntry::Symlink(name, target) => (name, b"".as_slice(), Some((tar::EntryType::Symlink, target))),
            RawEntry::HardLink(name, target) => (name, b"".as_slice(), Some((tar::EntryType::Link, target))),
        };

        let mut header = tar::Header::new_old();
        let raw = name.as_bytes();
        assert!(raw.len() < 100, "write_raw_tgz: entry name too long: {name}");
        header.as_old_mut().name[..raw.len()].copy_from_slice(raw);
        if let Some((entry_type, target)) = link {
            header.set_entry_type(entry_type);
            header
                .set_link_name(target)
                .unwrap_or_else(|e| panic!("write_raw_tgz: bad link target {target}: {e}"));
        }
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append(&header, content)
            .unwrap_or_else(|e| panic!("write_raw_tgz: failed to append {name}: {e}"));
    }

    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .unwrap_or_else(|e| panic!("write_raw_tgz: failed to finish {}: {e}", archive.display()));
}
