//! Game Patcher: swap a game client's metadata and user assembly with
//! patched versions, and restore the originals.
//!
//! # Architecture
//!
//! Two files are patched: `global-metadata.dat` and `UserAssembly.dll`. Their
//! live locations inside an install and their replacements inside a patch
//! directory are both described by a [`FilePair`]. The [`Patcher`] compares
//! them by content hash, moves the live files aside to `.unpatched` sidecars,
//! and copies the replacements in. Unpatching swaps the sidecars back and
//! keeps the patched files as `.patched`. A [`TreeScan`] compares a whole
//! patch tree against an install when a patch set ships more than the two
//! swapped files.
//!
//! # Safety
//!
//! - Backup always precedes overwrite
//! - Replacement files are written through tempfile + fsync + rename
//! - Patch state is re-derived from disk on every call; there is no journal
//! - Every operation returns a [`PatchResult`] instead of panicking
//! - Patching an already patched install is a no-op
//!
//! # Example
//!
//! ```no_run
//! use game_patcher::{GameInstall, Patcher, PatchResult};
//! use std::path::Path;
//!
//! let install = GameInstall::detect("D:/Genshin Impact/Genshin Impact Game")?;
//! let patcher = Patcher::for_install(&install, Path::new("./patches"));
//!
//! match patcher.patch() {
//!     PatchResult::Ok => println!("patched"),
//!     PatchResult::HasPatched => println!("already patched"),
//!     failure => eprintln!("patch failed: {failure}"),
//! }
//! # Ok::<(), game_patcher::DetectError>(())
//! ```

pub mod backup;
pub mod client;
pub mod config;
pub mod engine;
pub mod fs;
pub mod game;
pub mod hash;
pub mod inspect;
pub mod layout;
pub mod result;
pub mod scan;

// Re-exports
pub use backup::{sidecar, PATCHED_SUFFIX, UNPATCHED_SUFFIX};
pub use client::ClientType;
pub use config::{load_from_path, load_from_str, load_settings, ConfigError, Settings};
pub use engine::Patcher;
pub use fs::{FileSystem, FsError, FsOp, OsFileSystem};
pub use game::{DetectError, GameInstall};
pub use hash::{digest, Digest};
pub use inspect::{inspect_state, MatchPolicy, RoleState};
pub use layout::{FilePair, Role};
pub use result::{PatchResult, FAILED_MASK};
pub use scan::{ScanError, TreeComparison, TreeScan};
