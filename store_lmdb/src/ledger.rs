//! LMDB implementation of LedgerStore.

use whisper_store::{BatchOp, LedgerStore, StoreError, Table, WriteBatch};

use crate::{LmdbEnvironment, LmdbError};

impl LedgerStore for LmdbEnvironment {
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let db = self.db(table)?;
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = db.get(&rtxn, key).map_err(LmdbError::from)?;
        Ok(val.map(|v| v.to_vec()))
    }

    fn scan(&self, table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let db = self.db(table)?;
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut out = Vec::new();
        for entry in db.iter(&rtxn).map_err(LmdbError::from)? {
            let (k, v) = entry.map_err(LmdbError::from)?;
            out.push((k.to_vec(), v.to_vec()));
        }
        Ok(out)
    }

    fn scan_prefix(
        &self,
        table: Table,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let db = self.db(table)?;
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut out = Vec::new();
        for entry in db.prefix_iter(&rtxn, prefix).map_err(LmdbError::from)? {
            let (k, v) = entry.map_err(LmdbError::from)?;
            out.push((k.to_vec(), v.to_vec()));
        }
        Ok(out)
    }

    fn count(&self, table: Table) -> Result<u64, StoreError> {
        let db = self.db(table)?;
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(db.len(&rtxn).map_err(LmdbError::from)?)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let op_count = batch.len();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { table, key, value } => {
                    self.db(table)?
                        .put(&mut wtxn, &key, &value)
                        .map_err(LmdbError::from)?;
                }
                BatchOp::Delete { table, key } => {
                    self.db(table)?
                        .delete(&mut wtxn, &key)
                        .map_err(LmdbError::from)?;
                }
            }
        }
        // An early return above drops `wtxn`, which aborts the transaction.
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(ops = op_count, "committed write batch");
        Ok(())
    }
}
