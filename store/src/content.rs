//! Content store capability.

use crate::StoreError;
use whisper_types::ContentHash;

/// Content-addressed blob storage. The ledger itself only ever holds the hash.
pub trait ContentStore: Send + Sync {
    /// Store `bytes` and return their address. Storing the same bytes twice is a no-op.
    fn put_content(&self, bytes: &[u8]) -> Result<ContentHash, StoreError>;

    fn get_content(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>, StoreError>;
}
