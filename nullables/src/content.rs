//! Nullable content store: in-memory blobs keyed by content hash.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use whisper_store::{ContentStore, StoreError};
use whisper_types::ContentHash;

#[derive(Default)]
pub struct NullContentStore {
    blobs: Mutex<HashMap<ContentHash, Vec<u8>>>,
}

impl NullContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentStore for NullContentStore {
    fn put_content(&self, bytes: &[u8]) -> Result<ContentHash, StoreError> {
        let hash = ContentHash::of(bytes);
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(hash.clone())
            .or_insert_with(|| bytes.to_vec());
        Ok(hash)
    }

    fn get_content(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(hash)
            .cloned())
    }
}
