//! Content hashing for patch state comparison.
//!
//! Digests are only ever compared for equality between a live file and its
//! patch source. xxh3-128 is fast on multi-hundred-MB inputs and is not meant
//! to resist tampering.

use crate::fs::{FileSystem, FsError};
use std::fmt;
use std::path::Path;
use xxhash_rust::xxh3::xxh3_128;

/// Fixed-size digest of a file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 16]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Digest a byte slice.
pub fn digest(bytes: &[u8]) -> Digest {
    Digest(xxh3_128(bytes).to_be_bytes())
}

/// Read a whole file through `fs` and digest it.
pub fn digest_file<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<Digest, FsError> {
    let bytes = fs.read(path)?;
    Ok(digest(&bytes))
}
