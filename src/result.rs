//! Outcome taxonomy returned by every engine operation.
//!
//! A closed enum rather than composable flags: the engine returns exactly one
//! outcome per call. Each variant keeps a stable flag value through
//! [`PatchResult::bits`] so consumers can still test membership against
//! [`FAILED_MASK`].

use crate::fs::FsError;
use serde::Serialize;
use std::fmt;
use std::io;

/// Union of every failure bit. `Ok` and the status bits `HasPatched` and
/// `NotPatched` are excluded.
pub const FAILED_MASK: u16 = 0b111_1111_1100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[must_use = "PatchResult should be checked for success/failure"]
pub enum PatchResult {
    /// Operation completed
    Ok,
    /// Live files already match the patch sources
    HasPatched,
    /// Live files differ from the patch sources
    NotPatched,
    /// Restore ran but the live files still do not look unpatched
    NotRestored,
    /// Failure that is neither permission nor plain I/O
    UnknownError,
    IoError,
    PermissionDenied,
    /// Live file paths are unset
    GameFileNotFound,
    /// No `.unpatched` backup to restore from
    BackupFileNotFound,
    /// No patch source file present
    PatchFileNotFound,
    /// Live files could not be moved aside before overwriting
    CanNotBackup,
    /// Client type is not one of the supported distributions
    UnknownClientType,
}

impl PatchResult {
    pub const ALL: [PatchResult; 12] = [
        PatchResult::Ok,
        PatchResult::HasPatched,
        PatchResult::NotPatched,
        PatchResult::NotRestored,
        PatchResult::UnknownError,
        PatchResult::IoError,
        PatchResult::PermissionDenied,
        PatchResult::GameFileNotFound,
        PatchResult::BackupFileNotFound,
        PatchResult::PatchFileNotFound,
        PatchResult::CanNotBackup,
        PatchResult::UnknownClientType,
    ];

    /// Stable flag value of this outcome.
    pub fn bits(self) -> u16 {
        match self {
            PatchResult::Ok => 0,
            PatchResult::HasPatched => 1,
            PatchResult::NotPatched => 1 << 1,
            PatchResult::NotRestored => 1 << 2,
            PatchResult::UnknownError => 1 << 3,
            PatchResult::IoError => 1 << 4,
            PatchResult::PermissionDenied => 1 << 5,
            PatchResult::GameFileNotFound => 1 << 6,
            PatchResult::BackupFileNotFound => 1 << 7,
            PatchResult::PatchFileNotFound => 1 << 8,
            PatchResult::CanNotBackup => 1 << 9,
            PatchResult::UnknownClientType => 1 << 10,
        }
    }

    /// Inverse of [`bits`](Self::bits). Composite values return `None`.
    pub fn from_bits(bits: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.bits() == bits)
    }

    /// `bits() & FAILED_MASK != 0`.
    pub fn is_failed(self) -> bool {
        self.bits() & FAILED_MASK != 0
    }

    /// Informative classification rather than a real failure.
    pub fn is_status(self) -> bool {
        matches!(self, PatchResult::HasPatched | PatchResult::NotPatched)
    }

    /// Process exit code for the CLI.
    ///
    /// `Ok` and status outcomes exit 0; errors exit `10 + bit index`.
    pub fn exit_code(self) -> i32 {
        if self.is_failed() {
            10 + self.bits().trailing_zeros() as i32
        } else {
            0
        }
    }

    /// Classify an I/O error kind.
    pub fn from_io_kind(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::PermissionDenied => PatchResult::PermissionDenied,
            io::ErrorKind::InvalidInput
            | io::ErrorKind::InvalidData
            | io::ErrorKind::Unsupported
            | io::ErrorKind::OutOfMemory => PatchResult::UnknownError,
            _ => PatchResult::IoError,
        }
    }
}

impl From<&FsError> for PatchResult {
    fn from(err: &FsError) -> Self {
        PatchResult::from_io_kind(err.kind())
    }
}

impl From<FsError> for PatchResult {
    fn from(err: FsError) -> Self {
        PatchResult::from(&err)
    }
}

impl fmt::Display for PatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            PatchResult::Ok => "operation completed",
            PatchResult::HasPatched => "game files are already patched",
            PatchResult::NotPatched => "game files are not patched",
            PatchResult::NotRestored => "restored files do not match the original game files",
            PatchResult::UnknownError => "unknown error",
            PatchResult::IoError => "I/O error while accessing game files",
            PatchResult::PermissionDenied => "permission denied while accessing game files",
            PatchResult::GameFileNotFound => "game files not found",
            PatchResult::BackupFileNotFound => "backup files not found",
            PatchResult::PatchFileNotFound => "patch files not found",
            PatchResult::CanNotBackup => "could not back up game files",
            PatchResult::UnknownClientType => "unknown client type",
        };
        f.write_str(message)
    }
}
