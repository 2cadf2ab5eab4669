//! Patch engine: inspect, back up, overwrite, and the inverse restore.
//!
//! Every public operation returns a [`PatchResult`]. Filesystem failures are
//! classified at the call site that hit them and never escape as panics.
//! Backup always runs before any live file is overwritten; there is no
//! rollback beyond that ordering.

use crate::backup::{self, backed_up_roles};
use crate::client::ClientType;
use crate::fs::{FileSystem, FsError, OsFileSystem};
use crate::game::GameInstall;
use crate::inspect::{classify, inspect_roles, inspect_state, MatchPolicy, RoleState};
use crate::layout::{FilePair, Role};
use crate::result::PatchResult;
use log::{debug, info, warn};
use std::path::Path;

/// Patches one install from one patch source tree.
#[derive(Debug, Clone)]
pub struct Patcher<F: FileSystem = OsFileSystem> {
    fs: F,
    client: ClientType,
    live: FilePair,
    source: FilePair,
    policy: MatchPolicy,
}

impl Patcher<OsFileSystem> {
    pub fn new(client: ClientType, live: FilePair, source: FilePair) -> Self {
        Self::with_fs(OsFileSystem, client, live, source)
    }

    /// Patcher for a detected install, with sources resolved under `patch_dir`.
    pub fn for_install(install: &GameInstall, patch_dir: &Path) -> Self {
        Self::new(
            install.client,
            install.files.clone(),
            FilePair::source(patch_dir, install.client),
        )
    }
}

impl<F: FileSystem> Patcher<F> {
    pub fn with_fs(fs: F, client: ClientType, live: FilePair, source: FilePair) -> Self {
        Self {
            fs,
            client,
            live,
            source,
            policy: MatchPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn client(&self) -> ClientType {
        self.client
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn live_files(&self) -> &FilePair {
        &self.live
    }

    /// Resolved patch source paths.
    pub fn patch_paths(&self) -> &FilePair {
        &self.source
    }

    fn source_exists(&self, role: Role) -> bool {
        let path = self.source.get(role);
        !path.as_os_str().is_empty() && self.fs.is_file(path)
    }

    fn source_roles(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.source_exists(*role))
            .collect()
    }

    /// Validate the client type and the presence of patch source files.
    ///
    /// Read-only. At least one source file must exist, or both under
    /// [`MatchPolicy::Strict`].
    pub fn check_patch_files(&self) -> PatchResult {
        if !self.client.is_valid() {
            return PatchResult::UnknownClientType;
        }

        let present = self.source_roles().len();
        let enough = match self.policy {
            MatchPolicy::Lenient => present > 0,
            MatchPolicy::Strict => present == Role::ALL.len(),
        };

        if enough {
            PatchResult::Ok
        } else {
            debug!(
                "patch files missing: {} / {}",
                self.source.metadata.display(),
                self.source.user_assembly.display()
            );
            PatchResult::PatchFileNotFound
        }
    }

    /// Current state: `HasPatched`, `NotPatched`, or a failure.
    pub fn patch_state(&self) -> PatchResult {
        inspect_state(&self.fs, &self.live, &self.source, self.policy)
    }

    /// Per-file detail behind [`patch_state`](Self::patch_state).
    pub fn state_report(&self) -> Result<Option<Vec<RoleState>>, FsError> {
        inspect_roles(&self.fs, &self.live, &self.source, self.policy)
    }

    /// State and per-file detail from a single inspection pass.
    ///
    /// Failures come back as the classified result with no detail.
    pub fn status(&self) -> (PatchResult, Vec<RoleState>) {
        match self.state_report() {
            Ok(Some(states)) => (classify(&states), states),
            Ok(None) => (PatchResult::GameFileNotFound, Vec::new()),
            Err(err) => {
                warn!("inspection failed: {err}");
                (PatchResult::from(&err), Vec::new())
            }
        }
    }

    /// Replace the live files with the patch sources.
    ///
    /// Already patched installs return `HasPatched` without touching disk.
    /// Only roles whose live file differs from an existing source are backed
    /// up and overwritten, so a retry after a partial failure never backs up
    /// patched content.
    pub fn patch(&self) -> PatchResult {
        let states = match self.state_report() {
            Ok(Some(states)) => states,
            Ok(None) => return PatchResult::GameFileNotFound,
            Err(err) => {
                debug!("inspection failed: {err}");
                return PatchResult::from(&err);
            }
        };
        if classify(&states) == PatchResult::HasPatched {
            info!("already patched, nothing to do");
            return PatchResult::HasPatched;
        }

        let check = self.check_patch_files();
        if check.is_failed() {
            return check;
        }

        let roles: Vec<Role> = states
            .iter()
            .filter(|state| state.source_exists && !state.matched)
            .map(|state| state.role)
            .collect();
        let backed_up = backup::backup(&self.fs, &self.live, &roles);
        if backed_up != PatchResult::Ok {
            warn!("refusing to overwrite game files: backup returned {backed_up:?}");
            return PatchResult::CanNotBackup;
        }

        for role in roles {
            let (from, to) = (self.source.get(role), self.live.get(role));
            if let Err(err) = self.fs.copy(from, to) {
                warn!("patch aborted: {err}");
                return PatchResult::from(&err);
            }
            info!("patched {} from {}", to.display(), from.display());
        }

        PatchResult::Ok
    }

    /// Restore the live files from their `.unpatched` backups.
    ///
    /// The patched files are kept as `.patched` sidecars. Returns
    /// `NotRestored` if the restored files still match the patch sources.
    pub fn unpatch(&self) -> PatchResult {
        if !self.live.is_set() {
            return PatchResult::GameFileNotFound;
        }

        let backups = backed_up_roles(&self.fs, &self.live);
        let missing = Role::ALL.into_iter().find(|role| {
            self.source_exists(*role)
                && self.fs.is_file(self.live.get(*role))
                && !backups.contains(role)
        });
        if let Some(role) = missing {
            debug!("no backup for {}", self.live.get(role).display());
            return PatchResult::BackupFileNotFound;
        }
        if backups.is_empty() {
            return PatchResult::BackupFileNotFound;
        }

        match self.patch_state() {
            PatchResult::HasPatched => {}
            other => return other,
        }

        if let Err(err) = backup::restore(&self.fs, &self.live, &backups) {
            warn!("restore aborted: {err}");
            return PatchResult::from(&err);
        }

        match self.patch_state() {
            PatchResult::NotPatched => PatchResult::Ok,
            PatchResult::HasPatched => {
                warn!("restored files still match the patch sources");
                PatchResult::NotRestored
            }
            failure => failure,
        }
    }
}
