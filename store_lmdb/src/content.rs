//! LMDB implementation of ContentStore.

use whisper_store::{ContentStore, StoreError, Table};
use whisper_types::ContentHash;

use crate::{LmdbEnvironment, LmdbError};

impl ContentStore for LmdbEnvironment {
    fn put_content(&self, bytes: &[u8]) -> Result<ContentHash, StoreError> {
        let hash = ContentHash::of(bytes);
        let db = self.db(Table::Content)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        db.put(&mut wtxn, hash.as_str().as_bytes(), bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(hash)
    }

    fn get_content(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>, StoreError> {
        let db = self.db(Table::Content)?;
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = db
            .get(&rtxn, hash.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        Ok(val.map(|v| v.to_vec()))
    }
}
