//! Patch state inspection.
//!
//! State is always re-derived from disk by hashing live files against their
//! patch sources. Nothing is cached between calls, so inspection can be
//! repeated freely and survives interrupted runs.

use crate::backup::{sidecar, UNPATCHED_SUFFIX};
use crate::fs::{FileSystem, FsError};
use crate::hash::{digest_file, Digest};
use crate::layout::{FilePair, Role};
use crate::result::PatchResult;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How a role without a patch source file is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// A missing source file counts as matched. Patch sets may ship only
    /// one of the two files.
    #[default]
    Lenient,
    /// A missing source file counts as not matched.
    Strict,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::Lenient => f.write_str("lenient"),
            MatchPolicy::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(MatchPolicy::Lenient),
            "strict" => Ok(MatchPolicy::Strict),
            other => Err(format!(
                "unknown match policy '{other}' (expected 'lenient' or 'strict')"
            )),
        }
    }
}

/// Comparison of one live file against its patch source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleState {
    pub role: Role,
    pub live_exists: bool,
    pub source_exists: bool,
    pub backup_exists: bool,
    pub live_digest: Option<Digest>,
    pub source_digest: Option<Digest>,
    pub matched: bool,
}

/// Classify `live` against `source`.
///
/// Returns `HasPatched` or `NotPatched`, `GameFileNotFound` if a live path is
/// unset, or the classified I/O failure.
pub fn inspect_state<F: FileSystem + ?Sized>(
    fs: &F,
    live: &FilePair,
    source: &FilePair,
    policy: MatchPolicy,
) -> PatchResult {
    match inspect_roles(fs, live, source, policy) {
        Ok(None) => PatchResult::GameFileNotFound,
        Ok(Some(roles)) => classify(&roles),
        Err(err) => {
            debug!("inspection failed: {err}");
            PatchResult::from(&err)
        }
    }
}

/// `HasPatched` iff every role matched.
pub fn classify(roles: &[RoleState]) -> PatchResult {
    if roles.iter().all(|r| r.matched) {
        PatchResult::HasPatched
    } else {
        PatchResult::NotPatched
    }
}

/// Per-role comparison. `Ok(None)` means a live path is unset.
pub fn inspect_roles<F: FileSystem + ?Sized>(
    fs: &F,
    live: &FilePair,
    source: &FilePair,
    policy: MatchPolicy,
) -> Result<Option<Vec<RoleState>>, FsError> {
    if !live.is_set() {
        return Ok(None);
    }

    let mut roles = Vec::with_capacity(Role::ALL.len());
    for role in Role::ALL {
        let state = inspect_role(fs, role, live.get(role), source.get(role), policy)?;
        debug!(
            "{role}: live={} source={} matched={}",
            state.live_exists, state.source_exists, state.matched
        );
        roles.push(state);
    }
    Ok(Some(roles))
}

fn inspect_role<F: FileSystem + ?Sized>(
    fs: &F,
    role: Role,
    live: &Path,
    source: &Path,
    policy: MatchPolicy,
) -> Result<RoleState, FsError> {
    let live_exists = fs.is_file(live);
    let source_exists = !source.as_os_str().is_empty() && fs.is_file(source);
    let backup_exists = fs.is_file(&sidecar(live, UNPATCHED_SUFFIX));

    let mut state = RoleState {
        role,
        live_exists,
        source_exists,
        backup_exists,
        live_digest: None,
        source_digest: None,
        matched: false,
    };

    if !source_exists {
        state.matched = policy == MatchPolicy::Lenient;
        return Ok(state);
    }

    let source_digest = digest_file(fs, source)?;
    state.source_digest = Some(source_digest);

    // A live file that does not exist yet cannot be patched.
    if live_exists {
        let live_digest = digest_file(fs, live)?;
        state.live_digest = Some(live_digest);
        state.matched = live_digest == source_digest;
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::OsFileSystem;
    use std::fs;
    use tempfile::TempDir;

    fn pairs(dir: &TempDir) -> (FilePair, FilePair) {
        let live = FilePair::new(
            dir.path().join("live-metadata.dat"),
            dir.path().join("live-UserAssembly.dll"),
        );
        let source = FilePair::new(
            dir.path().join("src-metadata.dat"),
            dir.path().join("src-UserAssembly.dll"),
        );
        (live, source)
    }

    #[test]
    fn test_unset_live_path() {
        let dir = tempfile::tempdir().unwrap();
        let (_, source) = pairs(&dir);
        let live = FilePair::new("", dir.path().join("ua.dll"));

        let result = inspect_state(&OsFileSystem, &live, &source, MatchPolicy::Lenient);
        assert_eq!(result, PatchResult::GameFileNotFound);
    }

    #[test]
    fn test_matching_files_are_patched() {
        let dir = tempfile::tempdir().unwrap();
        let (live, source) = pairs(&dir);
        for role in Role::ALL {
            fs::write(live.get(role), b"patched").unwrap();
            fs::write(source.get(role), b"patched").unwrap();
        }

        let result = inspect_state(&OsFileSystem, &live, &source, MatchPolicy::Lenient);
        assert_eq!(result, PatchResult::HasPatched);
    }

    #[test]
    fn test_one_differing_file_is_not_patched() {
        let dir = tempfile::tempdir().unwrap();
        let (live, source) = pairs(&dir);
        fs::write(&live.metadata, b"patched").unwrap();
        fs::write(&source.metadata, b"patched").unwrap();
        fs::write(&live.user_assembly, b"original").unwrap();
        fs::write(&source.user_assembly, b"patched").unwrap();

        let result = inspect_state(&OsFileSystem, &live, &source, MatchPolicy::Lenient);
        assert_eq!(result, PatchResult::NotPatched);
    }

    #[test]
    fn test_missing_source_is_vacuous_match() {
        let dir = tempfile::tempdir().unwrap();
        let (live, source) = pairs(&dir);
        fs::write(&live.metadata, b"patched").unwrap();
        fs::write(&source.metadata, b"patched").unwrap();
        fs::write(&live.user_assembly, b"anything").unwrap();

        assert_eq!(
            inspect_state(&OsFileSystem, &live, &source, MatchPolicy::Lenient),
            PatchResult::HasPatched
        );
        assert_eq!(
            inspect_state(&OsFileSystem, &live, &source, MatchPolicy::Strict),
            PatchResult::NotPatched
        );
    }

    #[test]
    fn test_missing_live_file_is_not_patched() {
        let dir = tempfile::tempdir().unwrap();
        let (live, source) = pairs(&dir);
        fs::write(&source.metadata, b"patched").unwrap();
        fs::write(&live.user_assembly, b"original").unwrap();

        let roles = inspect_roles(&OsFileSystem, &live, &source, MatchPolicy::Lenient)
            .unwrap()
            .unwrap();
        assert!(!roles[0].live_exists);
        assert!(!roles[0].matched);
        assert_eq!(classify(&roles), PatchResult::NotPatched);
    }

    #[test]
    fn test_inspection_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let (live, source) = pairs(&dir);
        for role in Role::ALL {
            fs::write(live.get(role), b"original").unwrap();
            fs::write(source.get(role), b"patched").unwrap();
        }

        let first = inspect_state(&OsFileSystem, &live, &source, MatchPolicy::Lenient);
        let second = inspect_state(&OsFileSystem, &live, &source, MatchPolicy::Lenient);
        assert_eq!(first, second);
        assert_eq!(fs::read(&live.metadata).unwrap(), b"original");
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("Strict".parse::<MatchPolicy>().unwrap(), MatchPolicy::Strict);
        assert!("loose".parse::<MatchPolicy>().is_err());
    }
}
