//! Filesystem tree traversal and copy orchestration.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::inspect::{entry_kind, exists_ok};
use crate::report::{ReportCopy, ReportCopyBuilder};
use crate::spec::{CopyTreeError, EnumEntryKind, SpecCopyOptions};
use crate::util::{
    copy_file, create_dir_with_mode, derive_destination_path, is_inside_source,
    resolve_destination,
};

#[derive(Debug)]
struct SpecCopyContext {
    path_src: PathBuf,
    path_dst: PathBuf,
    enum_kind_dst: EnumEntryKind,
    spec_cp_options: SpecCopyOptions,
    builder_cp_report: ReportCopyBuilder,
}

/// Copy a file or directory tree from `source` to `destination` with default options.
///
/// See [`copy_tree_with_options`].
pub fn copy_tree<P, Q>(source: P, destination: Q) -> Result<ReportCopy, CopyTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    copy_tree_with_options(source, destination, SpecCopyOptions::default())
}

/// Copy a file or directory tree from `source` to `destination`.
///
/// Destination naming follows `cp -r`:
/// - `destination == "."` copies into the current directory under the source's name,
/// - an existing directory receives the source inside it, named after itself,
/// - any other destination becomes the copy of the source root.
///
/// Preconditions are checked before anything is written and reported as
/// [`CopyTreeError`], including a destination that resolves to the source
/// itself or to a path below it. After that the walk is best-effort: a
/// failing entry is logged and recorded in [`ReportCopy::errors`] and the
/// walk moves on, so `Ok` does not mean every file was copied. Check
/// [`ReportCopy::is_complete`].
pub fn copy_tree_with_options<P, Q>(
    source: P,
    destination: Q,
    spec_cp_options: SpecCopyOptions,
) -> Result<ReportCopy, CopyTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_src = source.as_ref().to_path_buf();
    let path_dst = resolve_destination(&path_src, destination.as_ref());

    if path_src == path_dst {
        debug!(src = %path_src.display(), "source and destination are identical");
        return Err(CopyTreeError::IdenticalPaths { path_src, path_dst });
    }

    let b_src_exists = exists_ok(&path_src).map_err(|e| CopyTreeError::Io {
        path: path_src.clone(),
        source: e,
    })?;
    if !b_src_exists {
        debug!(src = %path_src.display(), "source does not exist");
        return Err(CopyTreeError::SourceNotFound(path_src));
    }

    let enum_kind_dst = entry_kind(&path_dst).map_err(|e| CopyTreeError::Io {
        path: path_dst.clone(),
        source: e,
    })?;
    if enum_kind_dst.is_file() {
        debug!(dst = %path_dst.display(), "destination is an existing file");
        return Err(CopyTreeError::DestinationIsFile(path_dst));
    }

    // The walk would pick up its own output.
    let path_dst_root = derive_destination_path(&path_src, 0, &path_src, &path_dst, enum_kind_dst);
    if is_inside_source(&path_src, &path_dst_root) {
        debug!(
            src = %path_src.display(),
            dst = %path_dst_root.display(),
            "destination is inside source"
        );
        return Err(CopyTreeError::DestinationInsideSource {
            path_src,
            path_dst: path_dst_root,
        });
    }

    let mut spec_cp_ctx = SpecCopyContext {
        path_src,
        path_dst,
        enum_kind_dst,
        spec_cp_options,
        builder_cp_report: ReportCopyBuilder::default(),
    };

    walk_tree(&mut spec_cp_ctx);

    let report_copy = spec_cp_ctx.builder_cp_report.build();
    info!(
        src = %spec_cp_ctx.path_src.display(),
        dst = %spec_cp_ctx.path_dst.display(),
        "{report_copy}"
    );
    Ok(report_copy)
}

fn walk_tree(spec_cp_ctx: &mut SpecCopyContext) {
    let iter_walk = WalkDir::new(&spec_cp_ctx.path_src).sort_by_file_name();
    let mut n_ordinal = 0usize;

    for res_entry in iter_walk {
        let entry = match res_entry {
            Ok(v) => v,
            Err(e) => {
                let path_err = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| spec_cp_ctx.path_src.clone());
                warn!(path = %path_err.display(), "failed to walk entry: {e}");
                spec_cp_ctx.builder_cp_report.add_error(path_err, e.to_string());
                continue;
            }
        };

        let path_entry = entry.path();
        let path_entry_dst = derive_destination_path(
            path_entry,
            n_ordinal,
            &spec_cp_ctx.path_src,
            &spec_cp_ctx.path_dst,
            spec_cp_ctx.enum_kind_dst,
        );
        if entry.file_type().is_dir() {
            handle_dir_entry(path_entry, path_entry_dst, n_ordinal, spec_cp_ctx);
        } else {
            handle_file_entry(path_entry, path_entry_dst, n_ordinal, spec_cp_ctx);
        }
        n_ordinal += 1;
    }
}

fn record_step(
    path_entry_src: &Path,
    path_entry_dst: &Path,
    enum_kind: EnumEntryKind,
    n_ordinal: usize,
    spec_cp_ctx: &mut SpecCopyContext,
) {
    info!(
        ordinal = n_ordinal,
        dry_run = spec_cp_ctx.spec_cp_options.if_dry_run,
        "copy {} from '{}' to '{}'",
        enum_kind.label(),
        path_entry_src.display(),
        path_entry_dst.display()
    );
    spec_cp_ctx.builder_cp_report.add_scanned();
    if spec_cp_ctx.spec_cp_options.if_record_steps {
        spec_cp_ctx.builder_cp_report.add_step(
            path_entry_src.to_path_buf(),
            path_entry_dst.to_path_buf(),
            enum_kind,
            n_ordinal,
        );
    }
}

fn handle_dir_entry(
    path_dir_src: &Path,
    path_dir_dst: PathBuf,
    n_ordinal: usize,
    spec_cp_ctx: &mut SpecCopyContext,
) {
    record_step(
        path_dir_src,
        &path_dir_dst,
        EnumEntryKind::Directory,
        n_ordinal,
        spec_cp_ctx,
    );

    if spec_cp_ctx.spec_cp_options.if_dry_run {
        spec_cp_ctx.builder_cp_report.add_skipped();
        return;
    }
    match create_dir_with_mode(&path_dir_dst, spec_cp_ctx.spec_cp_options.mode_dir_create) {
        Ok(()) => spec_cp_ctx.builder_cp_report.add_copied(),
        Err(e) => {
            warn!(path = %path_dir_dst.display(), "failed to create directory: {e}");
            spec_cp_ctx
                .builder_cp_report
                .add_error(path_dir_dst, format!("Failed to create directory: {e}"));
        }
    }
}

fn handle_file_entry(
    path_file_src: &Path,
    path_file_dst: PathBuf,
    n_ordinal: usize,
    spec_cp_ctx: &mut SpecCopyContext,
) {
    record_step(
        path_file_src,
        &path_file_dst,
        EnumEntryKind::RegularFile,
        n_ordinal,
        spec_cp_ctx,
    );

    if spec_cp_ctx.spec_cp_options.if_dry_run {
        spec_cp_ctx.builder_cp_report.add_skipped();
        return;
    }
    match copy_file(path_file_src, &path_file_dst) {
        Ok(()) => spec_cp_ctx.builder_cp_report.add_copied(),
        Err(e) => {
            warn!(path = %path_file_dst.display(), "{e}");
            spec_cp_ctx
                .builder_cp_report
                .add_error(path_file_dst, e.to_string());
        }
    }
}
