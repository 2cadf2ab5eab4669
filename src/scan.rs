//! Whole-tree scanning and comparison.
//!
//! A patch set may ship more than the two swapped files. [`TreeScan`] lists
//! every regular file under a root so the whole set can be compared against
//! an install by content digest, or copied into another directory.

use crate::fs::{FileSystem, FsError};
use crate::hash::digest_file;
use crate::result::PatchResult;
use log::debug;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("directory does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("failed to scan {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Fs(#[from] FsError),
}

impl From<&ScanError> for PatchResult {
    fn from(err: &ScanError) -> Self {
        match err {
            ScanError::MissingRoot(_) => PatchResult::PatchFileNotFound,
            ScanError::Walk { source, .. } => source
                .io_error()
                .map(|e| PatchResult::from_io_kind(e.kind()))
                .unwrap_or(PatchResult::UnknownError),
            ScanError::Fs(err) => PatchResult::from(err),
        }
    }
}

/// Regular files under a root, as sorted relative paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeScan {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl TreeScan {
    /// Recursively list the files under `root`. Symlinks are not followed.
    pub fn scan(root: impl AsRef<Path>) -> Result<Self, ScanError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ScanError::MissingRoot(root.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|source| ScanError::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(root) {
                files.push(relative.to_path_buf());
            }
        }
        files.sort();
        debug!("scanned {} files under {}", files.len(), root.display());

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Compare every scanned file with the file at the same relative path
    /// under `target`.
    pub fn compare_with<F: FileSystem + ?Sized>(
        &self,
        fs: &F,
        target: &Path,
    ) -> Result<TreeComparison, FsError> {
        let mut comparison = TreeComparison::default();

        for relative in &self.files {
            let other = target.join(relative);
            if !fs.is_file(&other) {
                comparison.missing.push(relative.clone());
                continue;
            }

            let ours = digest_file(fs, &self.root.join(relative))?;
            let theirs = digest_file(fs, &other)?;
            if ours == theirs {
                comparison.matched.push(relative.clone());
            } else {
                comparison.differing.push(relative.clone());
            }
        }

        Ok(comparison)
    }

    /// Copy every scanned file to the same relative path under `target`,
    /// creating directories as needed. Existing files are replaced.
    pub fn copy_to<F: FileSystem + ?Sized>(&self, fs: &F, target: &Path) -> Result<usize, FsError> {
        for relative in &self.files {
            let to = target.join(relative);
            if let Some(parent) = to.parent() {
                fs.create_dir_all(parent)?;
            }
            fs.copy(&self.root.join(relative), &to)?;
        }
        Ok(self.files.len())
    }
}

/// Outcome of [`TreeScan::compare_with`], as relative paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeComparison {
    pub matched: Vec<PathBuf>,
    pub differing: Vec<PathBuf>,
    /// Scanned files with no counterpart in the target
    pub missing: Vec<PathBuf>,
}

impl TreeComparison {
    /// True only if at least one file was compared and all of them matched.
    pub fn is_identical(&self) -> bool {
        !self.matched.is_empty() && self.differing.is_empty() && self.missing.is_empty()
    }

    /// `HasPatched` if identical, else `NotPatched`.
    pub fn result(&self) -> PatchResult {
        if self.is_identical() {
            PatchResult::HasPatched
        } else {
            PatchResult::NotPatched
        }
    }
}
