//! UTF-8 file access through `cap-std` directory capabilities.
//!
//! Each helper opens the parent directory of the target with ambient
//! authority and performs the operation relative to it.
#![forbid(unsafe_code)]

use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};

/// Read the whole of a UTF-8 text file.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = parent_dir(path)?;
    dir.read_to_string(name)
}

/// Write `contents` to `path`, replacing any existing file and
/// creating missing parent directories.
pub fn write_file(path: &Utf8Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
    create_parent_dirs(path)?;
    let (dir, name) = parent_dir(path)?;
    dir.write(name, contents)
}

/// Whether `path` is a regular file.
///
/// A missing path is an [`io::ErrorKind::NotFound`] error rather than
/// `false`, so callers can tell "absent" from "not a file".
pub fn is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = parent_dir(path)?;
    dir.metadata(name).map(|meta| meta.is_file())
}

fn parent_dir(path: &Utf8Path) -> io::Result<(Dir, &str)> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{path} does not name a file"),
        )
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

fn create_parent_dirs(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) else {
        return Ok(());
    };
    let (base, relative) = split_anchor(parent);
    if relative.as_str().is_empty() {
        return Ok(());
    }
    Dir::open_ambient_dir(&base, ambient_authority())?.create_dir_all(&relative)
}

/// Split `path` into the directory it is anchored at (a root, prefix or
/// leading `..` run) and the remainder below it.
fn split_anchor(path: &Utf8Path) -> (Utf8PathBuf, Utf8PathBuf) {
    let mut base = Utf8PathBuf::new();
    let mut relative = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::Normal(_) => relative.push(component),
            _ if relative.as_str().is_empty() => base.push(component),
            _ => relative.push(component),
        }
    }
    if base.as_str().is_empty() {
        base.push(".");
    }
    (base, relative)
}
