//! Filesystem access used by the patch engine.
//!
//! Every operation returns an explicit [`FsError`] carrying the path and the
//! kind of operation, so callers can classify failures into a
//! [`PatchResult`](crate::PatchResult) without losing context for logs.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The filesystem operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Read,
    Rename,
    Copy,
    CreateDir,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsOp::Read => write!(f, "read"),
            FsOp::Rename => write!(f, "rename"),
            FsOp::Copy => write!(f, "copy"),
            FsOp::CreateDir => write!(f, "create directory"),
        }
    }
}

#[derive(Error, Debug)]
#[error("failed to {op} {}: {source}", .path.display())]
pub struct FsError {
    pub op: FsOp,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FsError {
    pub fn new(op: FsOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

/// Minimal set of filesystem primitives the engine relies on.
///
/// Single-file rename and copy are the only units of atomicity assumed.
pub trait FileSystem {
    /// Whether `path` exists as a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Read the whole file into memory.
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError>;

    /// Move `from` to `to`, replacing `to` if it exists.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    /// Copy `from` over `to`. `from` is left in place.
    fn copy(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    /// Create `path` and any missing parents.
    fn create_dir_all(&self, path: &Path) -> Result<(), FsError>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        fs::read(path).map_err(|e| FsError::new(FsOp::Read, path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        fs::rename(from, to).map_err(|e| FsError::new(FsOp::Rename, from, e))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        atomic_copy(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir_all(path).map_err(|e| FsError::new(FsOp::CreateDir, path, e))
    }
}

/// Copy via a tempfile in the destination directory, fsync, then rename.
///
/// Readers of `to` see either the old file or the complete new one.
fn atomic_copy(from: &Path, to: &Path) -> Result<(), FsError> {
    let copy_err = |e: io::Error| FsError::new(FsOp::Copy, to, e);

    let parent = to.parent().ok_or_else(|| {
        copy_err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        ))
    })?;

    let mut source = fs::File::open(from).map_err(|e| FsError::new(FsOp::Read, from, e))?;
    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(copy_err)?;

    io::copy(&mut source, temp.as_file_mut()).map_err(copy_err)?;
    temp.as_file().sync_all().map_err(copy_err)?;
    temp.persist(to).map_err(|e| copy_err(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_copy_replaces_destination() {
        let temp_dir = tempfile::tempdir().unwrap();
        let from = temp_dir.path().join("source.dat");
        let to = temp_dir.path().join("live.dat");
        fs::write(&from, b"patched").unwrap();
        fs::write(&to, b"original").unwrap();

        OsFileSystem.copy(&from, &to).unwrap();

        assert_eq!(fs::read(&to).unwrap(), b"patched");
        assert_eq!(fs::read(&from).unwrap(), b"patched");
    }

    #[test]
    fn test_atomic_copy_creates_missing_destination() {
        let temp_dir = tempfile::tempdir().unwrap();
        let from = temp_dir.path().join("source.dat");
        let to = temp_dir.path().join("live.dat");
        fs::write(&from, b"patched").unwrap();

        OsFileSystem.copy(&from, &to).unwrap();
        assert_eq!(fs::read(&to).unwrap(), b"patched");
    }

    #[test]
    fn test_copy_missing_source_reports_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = OsFileSystem
            .copy(
                &temp_dir.path().join("absent.dat"),
                &temp_dir.path().join("live.dat"),
            )
            .unwrap_err();

        assert_eq!(err.op, FsOp::Read);
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!temp_dir.path().join("live.dat").exists());
    }

    #[test]
    fn test_rename_error_carries_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let from = temp_dir.path().join("absent.dat");
        let err = OsFileSystem
            .rename(&from, &temp_dir.path().join("other.dat"))
            .unwrap_err();

        assert_eq!(err.op, FsOp::Rename);
        assert_eq!(err.path, from);
        assert!(err.to_string().starts_with("failed to rename"));
    }
}
