//! Copy specification models and top-level error types.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Kind of a filesystem entry as seen by a single stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumEntryKind {
    /// Path is absent.
    NotExist,
    /// Anything that is not a directory.
    RegularFile,
    /// Directory.
    Directory,
}

impl EnumEntryKind {
    pub fn is_dir(self) -> bool {
        self == Self::Directory
    }

    pub fn is_file(self) -> bool {
        self == Self::RegularFile
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NotExist => "missing",
            Self::RegularFile => "file",
            Self::Directory => "dir",
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `copy_tree_with_options`.
#[derive(Debug, Clone)]
pub struct SpecCopyOptions {
    /// Do not mutate filesystem; record what would happen.
    pub if_dry_run: bool,
    /// Permission bits for directories created at the destination (Unix only).
    pub mode_dir_create: u32,
    /// Keep every visited entry in [`crate::ReportCopy::steps`].
    pub if_record_steps: bool,
}

impl Default for SpecCopyOptions {
    fn default() -> Self {
        Self {
            if_dry_run: false,
            mode_dir_create: 0o755,
            if_record_steps: false,
        }
    }
}

/// Result of [`crate::inspect::stat`].
#[derive(Debug, Clone)]
pub struct SpecPathStat {
    pub if_exists: bool,
    /// Present iff `if_exists`.
    pub metadata: Option<fs::Metadata>,
}

/// One visited entry of a tree walk and its rewritten destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecWalkStep {
    pub path_src: PathBuf,
    pub path_dst: PathBuf,
    pub kind: EnumEntryKind,
    /// 0-based position in walk order; the source root is 0.
    pub ordinal: usize,
}

/// One copy failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// "Top-level call failed" errors (precondition stage, nothing copied yet).
#[derive(Debug, Error)]
pub enum CopyTreeError {
    #[error("{} and {} are identical (not copied)", .path_src.display(), .path_dst.display())]
    IdenticalPaths { path_src: PathBuf, path_dst: PathBuf },

    #[error("{}: no such file or directory", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Destination is an existing file: {}", .0.display())]
    DestinationIsFile(PathBuf),

    #[error(
        "Destination {} is inside source {} (not copied)",
        .path_dst.display(),
        .path_src.display()
    )]
    DestinationInsideSource { path_src: PathBuf, path_dst: PathBuf },

    #[error("Failed to inspect {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Single-file copy errors.
#[derive(Debug, Error)]
pub enum CopyFileError {
    #[error("Source is a directory, expected a file: {}", .0.display())]
    SourceIsDirectory(PathBuf),

    #[error(
        "{} and {} are the same file (not copied)",
        .path_src.display(),
        .path_dst.display()
    )]
    SameFile { path_src: PathBuf, path_dst: PathBuf },

    #[error("Failed to copy {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CopyFileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
