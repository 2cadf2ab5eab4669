//! File locations of the two patchable files.
//!
//! The same relative layout is used on both sides: inside the game directory
//! for the live files, and inside `<patch_dir>/Genshin Impact Game` for the
//! patch sources.

use crate::client::ClientType;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "global-metadata.dat";
pub const USER_ASSEMBLY_FILE: &str = "UserAssembly.dll";

/// Directory under the patch root that mirrors the game directory.
pub const PATCH_GAME_DIR: &str = "Genshin Impact Game";

/// One of the two patchable files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Metadata,
    UserAssembly,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Metadata, Role::UserAssembly];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Metadata => f.write_str(METADATA_FILE),
            Role::UserAssembly => f.write_str(USER_ASSEMBLY_FILE),
        }
    }
}

/// Paths of the metadata blob and the user assembly on one side.
///
/// An empty path means the location is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePair {
    pub metadata: PathBuf,
    pub user_assembly: PathBuf,
}

impl FilePair {
    pub fn new(metadata: impl Into<PathBuf>, user_assembly: impl Into<PathBuf>) -> Self {
        Self {
            metadata: metadata.into(),
            user_assembly: user_assembly.into(),
        }
    }

    /// Resolve the pair under `root` for `client`.
    ///
    /// Returns an unset pair for clients without a stem.
    pub fn resolve(root: &Path, client: ClientType) -> Self {
        let Some(data_dir) = client.data_dir() else {
            return Self::default();
        };
        let data = root.join(data_dir);
        Self {
            metadata: data.join("Managed").join("Metadata").join(METADATA_FILE),
            user_assembly: data.join("Native").join(USER_ASSEMBLY_FILE),
        }
    }

    /// Live files inside an install directory.
    pub fn live(game_dir: &Path, client: ClientType) -> Self {
        Self::resolve(game_dir, client)
    }

    /// Patch source files inside a patch directory.
    pub fn source(patch_dir: &Path, client: ClientType) -> Self {
        Self::resolve(&patch_dir.join(PATCH_GAME_DIR), client)
    }

    pub fn get(&self, role: Role) -> &Path {
        match role {
            Role::Metadata => &self.metadata,
            Role::UserAssembly => &self.user_assembly,
        }
    }

    /// Both paths are set.
    pub fn is_set(&self) -> bool {
        Role::ALL
            .iter()
            .all(|role| !self.get(*role).as_os_str().is_empty())
    }
}
