//! Existence and classification checks.
//!
//! Every check comes in two forms: `*_ok` returns the I/O error, the plain
//! form panics on it. "Not found" is never an error for the existence check.

use std::fs;
use std::io;
use std::path::Path;

use crate::spec::{EnumEntryKind, SpecPathStat};

/// Stat `path`, mapping "not found" to `if_exists = false`.
pub fn stat<P: AsRef<Path>>(path: P) -> Result<SpecPathStat, io::Error> {
    match fs::metadata(path.as_ref()) {
        Ok(meta) => Ok(SpecPathStat {
            if_exists: true,
            metadata: Some(meta),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(SpecPathStat {
            if_exists: false,
            metadata: None,
        }),
        Err(e) => Err(e),
    }
}

pub fn exists_ok<P: AsRef<Path>>(path: P) -> Result<bool, io::Error> {
    stat(path).map(|spec_stat| spec_stat.if_exists)
}

/// Whether `path` exists.
///
/// # Panics
/// On any stat failure other than "not found". Use [`exists_ok`] to handle it.
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    exists_ok(path).unwrap_or_else(|e| panic!("Failed to stat {}: {e}", path.display()))
}

/// Open `path` and report whether it is anything other than a directory.
///
/// A missing path is an error (`ErrorKind::NotFound`), not `false`.
pub fn is_regular_file_ok<P: AsRef<Path>>(path: P) -> Result<bool, io::Error> {
    let file = fs::File::open(path.as_ref())?;
    let meta = file.metadata()?;
    Ok(!meta.is_dir())
}

/// Whether `path` is not a directory.
///
/// # Panics
/// When `path` cannot be opened or stat'ed, including when it does not exist.
pub fn is_regular_file<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    is_regular_file_ok(path).unwrap_or_else(|e| panic!("Failed to inspect {}: {e}", path.display()))
}

/// Classify `path` with a single stat call.
pub fn entry_kind<P: AsRef<Path>>(path: P) -> Result<EnumEntryKind, io::Error> {
    let spec_stat = stat(path)?;
    Ok(match spec_stat.metadata {
        None => EnumEntryKind::NotExist,
        Some(meta) if meta.is_dir() => EnumEntryKind::Directory,
        Some(_) => EnumEntryKind::RegularFile,
    })
}
