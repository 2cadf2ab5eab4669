//! Detection of an installed game client from its directory.

use crate::client::ClientType;
use crate::layout::FilePair;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Game directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Executable path has no parent directory: {}", .0.display())]
    NoParent(PathBuf),
}

/// An install directory and what was found in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInstall {
    pub root: PathBuf,
    pub client: ClientType,
    /// `<root>/<stem>.exe`, if a client was detected
    pub executable: Option<PathBuf>,
    /// Live metadata and user assembly paths (unset if no client)
    pub files: FilePair,
}

impl GameInstall {
    /// Inspect `dir` for a supported client.
    ///
    /// The Chinese data directory takes precedence when both are present.
    /// A directory with neither yields [`ClientType::None`].
    pub fn detect(dir: impl AsRef<Path>) -> Result<Self, DetectError> {
        let root = dir.as_ref();
        if !root.is_dir() {
            return Err(DetectError::MissingDirectory(root.to_path_buf()));
        }

        let client = ClientType::SUPPORTED
            .into_iter()
            .find(|client| {
                client
                    .data_dir()
                    .is_some_and(|data_dir| root.join(data_dir).is_dir())
            })
            .unwrap_or(ClientType::None);

        Ok(Self::with_client(root, client))
    }

    /// Build an install for a known client without probing the disk.
    pub fn with_client(root: impl Into<PathBuf>, client: ClientType) -> Self {
        let root = root.into();
        Self {
            executable: client.executable().map(|exe| root.join(exe)),
            files: FilePair::live(&root, client),
            client,
            root,
        }
    }

    /// Detect from the path of the game executable.
    pub fn from_executable(exe: impl AsRef<Path>) -> Result<Self, DetectError> {
        let exe = exe.as_ref();
        let parent = exe
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| DetectError::NoParent(exe.to_path_buf()))?;
        Self::detect(parent)
    }

    /// Walk up from `start` and return the first directory holding a client.
    pub fn discover(start: &Path) -> Option<Self> {
        start
            .ancestors()
            .filter_map(|dir| Self::detect(dir).ok())
            .find(|install| install.client.is_valid())
    }

    pub fn is_valid(&self) -> bool {
        self.client.is_valid()
    }
}
