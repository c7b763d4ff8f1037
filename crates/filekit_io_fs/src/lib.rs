//! `filekit_io_fs` v1:
//! Small filesystem toolkit with a `cp -r`-like copy.
//!
//! Modules:
//! - `copy`   : tree walk and copy orchestration
//! - `inspect`: existence / classification checks
//! - `spec`   : enums/options/errors
//! - `report` : run-time report model
//! - `util`   : path rewriting and single-file copy

pub mod copy;
pub mod inspect;
pub mod report;
pub mod spec;
mod util;

pub use copy::{copy_tree, copy_tree_with_options};
pub use inspect::{entry_kind, exists, exists_ok, is_regular_file, is_regular_file_ok, stat};
pub use report::{ReportCopy, ReportCopyBuilder};
pub use spec::{
    CopyFileError, CopyTreeError, EnumEntryKind, SpecCopyError, SpecCopyOptions, SpecPathStat,
    SpecWalkStep,
};
pub use util::{copy_file, derive_base_name, derive_destination_path, resolve_destination};
