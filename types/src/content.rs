//! Content-address references to externally stored content.

use crate::TypesError;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

type Blake2b256 = Blake2b<U32>;

/// Opaque key into the external content store.
///
/// The ledger keeps only this reference, never the content itself. Callers may
/// supply any non-empty reference (e.g. an IPFS CID); [`ContentHash::of`] derives
/// the Blake2b-256 hex digest used by the built-in content stores.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(TypesError::EmptyContentHash);
        }
        Ok(Self(s))
    }

    /// Content address of `bytes`: lowercase hex Blake2b-256.
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Blake2b256::digest(bytes);
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
