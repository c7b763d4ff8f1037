use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::spec::{CopyFileError, EnumEntryKind};

////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

/// Substitute `"."` as destination with the base name of `path_src`.
///
/// `cp x .` copies into the current directory under the source's own name.
pub fn resolve_destination(path_src: &Path, path_dst: &Path) -> PathBuf {
    if path_dst.as_os_str() == "." {
        if let Some(name) = derive_base_name(path_src) {
            return PathBuf::from(name);
        }
    }
    path_dst.to_path_buf()
}

/// Last component of `path`, keeping `".."` as a name.
///
/// `None` for an empty path, `"."` or a bare root.
pub fn derive_base_name(path: &Path) -> Option<&OsStr> {
    match path.components().next_back()? {
        Component::Normal(name) => Some(name),
        Component::ParentDir => Some(OsStr::new("..")),
        Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
    }
}

/// Derive the destination path of one visited entry.
///
/// # Arguments
/// - `path_visited`: Entry produced by the walk.
/// - `n_ordinal`: Position of the entry in walk order (root = 0).
/// - `path_src_root`: Original source, the root of the walk.
/// - `path_dst`: Original (resolved) destination.
/// - `enum_kind_dst`: Kind of `path_dst` before the walk created anything.
///
/// # Rules
/// - The root goes *into* `path_dst` (named after itself) when `path_dst` is an
///   existing directory, otherwise it is copied *as* `path_dst`.
/// - Every other entry keeps its path relative to the root, below the root's
///   destination.
///
/// # Examples
/// ```ignore
/// // "out" is an existing directory
/// derive_destination_path(Path::new("a"), 0, Path::new("a"), Path::new("out"), EnumEntryKind::Directory);
/// // => "out/a"
/// derive_destination_path(Path::new("a/b.txt"), 1, Path::new("a"), Path::new("out"), EnumEntryKind::Directory);
/// // => "out/a/b.txt"
/// // "out" does not exist
/// derive_destination_path(Path::new("a/b.txt"), 1, Path::new("a"), Path::new("out"), EnumEntryKind::NotExist);
/// // => "out/b.txt"
/// ```
pub fn derive_destination_path(
    path_visited: &Path,
    n_ordinal: usize,
    path_src_root: &Path,
    path_dst: &Path,
    enum_kind_dst: EnumEntryKind,
) -> PathBuf {
    let path_dst_root = if enum_kind_dst.is_dir() {
        match derive_base_name(path_src_root) {
            Some(name) => path_dst.join(name),
            None => path_dst.to_path_buf(),
        }
    } else {
        path_dst.to_path_buf()
    };

    if n_ordinal == 0 {
        return path_dst_root;
    }
    match path_visited.strip_prefix(path_src_root) {
        Ok(path_rel) => path_dst_root.join(path_rel),
        Err(_) => path_dst_root.join(derive_base_name(path_visited).unwrap_or_default()),
    }
}

fn _absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// Canonical form of `path`; a missing tail is appended to its canonical ancestor.
fn _normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    let path_abs = _absolutize_path(path);
    match (path_abs.parent(), path_abs.file_name()) {
        (Some(parent), Some(name)) => _normalize_path(parent).join(name),
        _ => path_abs,
    }
}

/// Whether `path_dst_root` is `path_src` itself or lies below it.
pub(crate) fn is_inside_source(path_src: &Path, path_dst_root: &Path) -> bool {
    _normalize_path(path_dst_root).starts_with(_normalize_path(path_src))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileOps

/// `mkdir -p` with `mode_dir` applied to newly created directories.
pub(crate) fn create_dir_with_mode(path_dir: &Path, mode_dir: u32) -> Result<(), io::Error> {
    let mut builder_dir = fs::DirBuilder::new();
    builder_dir.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder_dir.mode(mode_dir);
    }
    #[cfg(not(unix))]
    {
        let _ = mode_dir;
    }
    builder_dir.create(path_dir)
}

/// Copy one regular file's bytes to `path_file_dst`.
///
/// The destination is created (with the source's permission bits) or
/// truncated. A directory source, or a destination that is the source file
/// itself (same device and inode), is rejected before the destination is
/// touched. Nothing is rolled back on failure, so the destination may be
/// left partially written.
pub fn copy_file<P, Q>(path_file_src: P, path_file_dst: Q) -> Result<(), CopyFileError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_file_src = path_file_src.as_ref();
    let path_file_dst = path_file_dst.as_ref();

    let mut file_src =
        fs::File::open(path_file_src).map_err(|e| CopyFileError::io(path_file_src, e))?;
    let meta_src = file_src
        .metadata()
        .map_err(|e| CopyFileError::io(path_file_src, e))?;
    if meta_src.is_dir() {
        return Err(CopyFileError::SourceIsDirectory(path_file_src.to_path_buf()));
    }

    if is_same_file(&meta_src, path_file_dst) {
        return Err(CopyFileError::SameFile {
            path_src: path_file_src.to_path_buf(),
            path_dst: path_file_dst.to_path_buf(),
        });
    }

    let mut cfg_open = fs::OpenOptions::new();
    cfg_open.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        cfg_open.mode(meta_src.permissions().mode());
    }

    let mut file_dst = cfg_open
        .open(path_file_dst)
        .map_err(|e| CopyFileError::io(path_file_dst, e))?;
    io::copy(&mut file_src, &mut file_dst).map_err(|e| CopyFileError::io(path_file_dst, e))?;
    Ok(())
}

#[cfg(unix)]
fn is_same_file(meta_src: &fs::Metadata, path_file_dst: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match fs::metadata(path_file_dst) {
        Ok(meta_dst) => meta_src.dev() == meta_dst.dev() && meta_src.ino() == meta_dst.ino(),
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(_meta_src: &fs::Metadata, _path_file_dst: &Path) -> bool {
    false
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;
    use std::fs;
    use std::path::{Path, PathBuf};

    use tempfile::tempdir;

    use super::{
        copy_file, create_dir_with_mode, derive_base_name, derive_destination_path,
        is_inside_source, resolve_destination,
    };
    use crate::spec::{CopyFileError, EnumEntryKind};

    #[test]
    fn rewrite_root_into_existing_directory() {
        let path_dst = derive_destination_path(
            Path::new("/data/src/report.txt"),
            0,
            Path::new("/data/src/report.txt"),
            Path::new("/backup"),
            EnumEntryKind::Directory,
        );
        assert_eq!(path_dst, PathBuf::from("/backup/report.txt"));
    }

    #[test]
    fn rewrite_root_as_destination_when_missing_or_file() {
        for enum_kind_dst in [EnumEntryKind::NotExist, EnumEntryKind::RegularFile] {
            let path_dst = derive_destination_path(
                Path::new("src/hello.txt"),
                0,
                Path::new("src/hello.txt"),
                Path::new("test.txt"),
                enum_kind_dst,
            );
            assert_eq!(path_dst, PathBuf::from("test.txt"));
        }
    }

    #[test]
    fn rewrite_descendants_into_existing_directory() {
        let path_dst = derive_destination_path(
            Path::new("some/long/example/sub/hello.txt"),
            3,
            Path::new("some/long/example"),
            Path::new("out"),
            EnumEntryKind::Directory,
        );
        assert_eq!(path_dst, PathBuf::from("out/example/sub/hello.txt"));
    }

    #[test]
    fn rewrite_descendants_below_renamed_root() {
        let path_root = derive_destination_path(
            Path::new("A"),
            0,
            Path::new("A"),
            Path::new("B"),
            EnumEntryKind::NotExist,
        );
        assert_eq!(path_root, PathBuf::from("B"));

        let path_child = derive_destination_path(
            Path::new("A/sub/y.txt"),
            2,
            Path::new("A"),
            Path::new("B"),
            EnumEntryKind::NotExist,
        );
        assert_eq!(path_child, PathBuf::from("B/sub/y.txt"));
    }

    #[test]
    fn rewrite_root_without_base_name_stays_at_destination() {
        let path_dst = derive_destination_path(
            Path::new("."),
            0,
            Path::new("."),
            Path::new("out"),
            EnumEntryKind::Directory,
        );
        assert_eq!(path_dst, PathBuf::from("out"));

        let path_child = derive_destination_path(
            Path::new("./x.txt"),
            1,
            Path::new("."),
            Path::new("out"),
            EnumEntryKind::Directory,
        );
        assert_eq!(path_child, PathBuf::from("out/x.txt"));
    }

    #[test]
    fn resolve_dot_destination_uses_source_name() {
        assert_eq!(
            resolve_destination(Path::new("/tmp/data/report.csv"), Path::new(".")),
            PathBuf::from("report.csv")
        );
        assert_eq!(
            resolve_destination(Path::new("a/b"), Path::new("c")),
            PathBuf::from("c")
        );
    }

    #[test]
    fn copy_file_creates_and_truncates() {
        let tmp = tempdir().expect("tempdir");
        let path_src = tmp.path().join("src.txt");
        let path_dst = tmp.path().join("dst.txt");
        fs::write(&path_src, "short").expect("write src");
        fs::write(&path_dst, "a much longer previous content").expect("write dst");

        copy_file(&path_src, &path_dst).expect("copy");
        assert_eq!(fs::read(&path_dst).expect("read"), b"short");
    }

    #[cfg(unix)]
    #[test]
    fn copy_file_preserves_mode_on_creation() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().expect("tempdir");
        let path_src = tmp.path().join("run.sh");
        let path_dst = tmp.path().join("run_copy.sh");
        fs::write(&path_src, "#!/bin/sh\n").expect("write");
        fs::set_permissions(&path_src, fs::Permissions::from_mode(0o700)).expect("chmod");

        copy_file(&path_src, &path_dst).expect("copy");
        let n_mode = fs::metadata(&path_dst).expect("meta").permissions().mode() & 0o777;
        assert_eq!(n_mode, 0o700);
    }

    #[test]
    fn copy_file_rejects_directory_source() {
        let tmp = tempdir().expect("tempdir");
        let path_dir = tmp.path().join("dir");
        fs::create_dir(&path_dir).expect("mkdir");
        let path_dst = tmp.path().join("out");

        let err = copy_file(&path_dir, &path_dst).expect_err("must fail");
        assert!(matches!(err, CopyFileError::SourceIsDirectory(_)));
        assert!(!path_dst.exists());
    }

    #[test]
    fn copy_file_missing_source_is_io_error() {
        let tmp = tempdir().expect("tempdir");
        let err = copy_file(tmp.path().join("missing"), tmp.path().join("out"))
            .expect_err("must fail");
        assert!(matches!(err, CopyFileError::Io { .. }));
    }

    #[test]
    fn create_dir_with_mode_is_idempotent() {
        let tmp = tempdir().expect("tempdir");
        let path_dir = tmp.path().join("a/b/c");
        create_dir_with_mode(&path_dir, 0o755).expect("first");
        create_dir_with_mode(&path_dir, 0o755).expect("second");
        assert!(path_dir.is_dir());
    }

    #[test]
    fn base_name_keeps_parent_dir_component() {
        assert_eq!(derive_base_name(Path::new("a/b.txt")), Some(OsStr::new("b.txt")));
        assert_eq!(derive_base_name(Path::new("..")), Some(OsStr::new("..")));
        assert_eq!(derive_base_name(Path::new("A/sub/..")), Some(OsStr::new("..")));
        assert_eq!(derive_base_name(Path::new(".")), None);
        assert_eq!(derive_base_name(Path::new("")), None);
        assert_eq!(derive_base_name(Path::new("/")), None);
    }

    #[test]
    fn resolve_dot_destination_keeps_parent_dir_name() {
        assert_eq!(
            resolve_destination(Path::new(".."), Path::new(".")),
            PathBuf::from("..")
        );
    }

    #[test]
    fn rewrite_root_ending_in_parent_dir_is_not_destination() {
        let path_root = derive_destination_path(
            Path::new("A/sub/.."),
            0,
            Path::new("A/sub/.."),
            Path::new("A"),
            EnumEntryKind::Directory,
        );
        assert_eq!(path_root, PathBuf::from("A/.."));

        let path_child = derive_destination_path(
            Path::new("A/sub/../x.txt"),
            2,
            Path::new("A/sub/.."),
            Path::new("A"),
            EnumEntryKind::Directory,
        );
        assert_eq!(path_child, PathBuf::from("A/../x.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn copy_file_onto_itself_keeps_content() {
        let tmp = tempdir().expect("tempdir");
        let path_file = tmp.path().join("x.txt");
        fs::write(&path_file, "hello").expect("write");
        fs::create_dir(tmp.path().join("sub")).expect("mkdir");

        let err = copy_file(&path_file, tmp.path().join("sub/../x.txt")).expect_err("must fail");
        assert!(matches!(err, CopyFileError::SameFile { .. }));
        assert_eq!(fs::read_to_string(&path_file).expect("read"), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn copy_file_onto_hard_link_keeps_content() {
        let tmp = tempdir().expect("tempdir");
        let path_file = tmp.path().join("x.txt");
        let path_link = tmp.path().join("x_link.txt");
        fs::write(&path_file, "hello").expect("write");
        fs::hard_link(&path_file, &path_link).expect("hard link");

        let err = copy_file(&path_file, &path_link).expect_err("must fail");
        assert!(matches!(err, CopyFileError::SameFile { .. }));
        assert_eq!(fs::read_to_string(&path_link).expect("read"), "hello");
    }

    #[test]
    fn inside_source_detects_nested_and_equal_destinations() {
        let tmp = tempdir().expect("tempdir");
        let path_src = tmp.path().join("A");
        fs::create_dir_all(path_src.join("sub")).expect("mkdir");

        assert!(is_inside_source(&path_src, &path_src.join("sub/A")));
        assert!(is_inside_source(&path_src, &path_src.join("new/deeper")));
        assert!(is_inside_source(&path_src, &tmp.path().join("A/sub/..")));
        assert!(!is_inside_source(&path_src, &tmp.path().join("B/A")));
        assert!(!is_inside_source(&path_src, &tmp.path().join("A/sub/../..")));
    }
}
