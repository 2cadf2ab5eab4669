//! Sidecar backups of live files.
//!
//! The only persisted state is the presence of `<file>.unpatched` (the
//! original, written before any overwrite) and `<file>.patched` (the patched
//! file moved aside by a restore). There is no journal; a partially completed
//! backup is visible on disk and is picked up by the next run.
//!
//! Stale sidecars from interrupted runs are never cleaned up.

use crate::fs::{FileSystem, FsError};
use crate::layout::{FilePair, Role};
use crate::result::PatchResult;
use log::{debug, info, warn};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const UNPATCHED_SUFFIX: &str = ".unpatched";
pub const PATCHED_SUFFIX: &str = ".patched";

/// `path` with `suffix` appended to the file name.
pub fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Move each selected live file aside to `<file>.unpatched`.
///
/// Live files that do not exist are skipped. An existing `<file>.unpatched`
/// is never replaced: it already holds the pre-patch original, and the live
/// file is left for the caller to overwrite. The first failing rename aborts
/// with its classified result; earlier renames are not undone.
pub fn backup<F: FileSystem + ?Sized>(fs: &F, live: &FilePair, roles: &[Role]) -> PatchResult {
    if !live.is_set() {
        return PatchResult::GameFileNotFound;
    }

    match move_aside(fs, live, roles) {
        Ok(()) => PatchResult::Ok,
        Err(err) => {
            warn!("backup aborted: {err}");
            PatchResult::from(&err)
        }
    }
}

fn move_aside<F: FileSystem + ?Sized>(
    fs: &F,
    live: &FilePair,
    roles: &[Role],
) -> Result<(), FsError> {
    for &role in roles {
        let path = live.get(role);
        if !fs.is_file(path) {
            debug!("{role}: nothing to back up at {}", path.display());
            continue;
        }
        let target = sidecar(path, UNPATCHED_SUFFIX);
        if fs.is_file(&target) {
            info!("keeping existing backup {}", target.display());
            continue;
        }
        fs.rename(path, &target)?;
        info!("backed up {} -> {}", path.display(), target.display());
    }
    Ok(())
}

/// Roles whose `.unpatched` backup exists.
pub fn backed_up_roles<F: FileSystem + ?Sized>(fs: &F, live: &FilePair) -> Vec<Role> {
    Role::ALL
        .into_iter()
        .filter(|role| fs.is_file(&sidecar(live.get(*role), UNPATCHED_SUFFIX)))
        .collect()
}

/// Swap each selected live file with its backup.
///
/// The current live file becomes `<file>.patched` and `<file>.unpatched`
/// takes its place.
pub fn restore<F: FileSystem + ?Sized>(
    fs: &F,
    live: &FilePair,
    roles: &[Role],
) -> Result<(), FsError> {
    for &role in roles {
        let path = live.get(role);
        let backup = sidecar(path, UNPATCHED_SUFFIX);

        if fs.is_file(path) {
            let patched = sidecar(path, PATCHED_SUFFIX);
            fs.rename(path, &patched)?;
            debug!("moved {} -> {}", path.display(), patched.display());
        }

        fs.rename(&backup, path)?;
        info!("restored {} from {}", path.display(), backup.display());
    }
    Ok(())
}
