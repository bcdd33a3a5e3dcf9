//! Abstract storage traits for the Whisper governance ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements
//! [`LedgerStore`]. The ledger depends only on the trait: it reads individual
//! records and commits every mutation as one [`WriteBatch`], which backends must
//! apply all-or-nothing.

pub mod batch;
pub mod content;
pub mod error;
pub mod keys;
pub mod table;

pub use batch::{BatchOp, WriteBatch};
pub use content::ContentStore;
pub use error::StoreError;
pub use table::Table;

/// Key/value access to the ledger tables.
pub trait LedgerStore: Send + Sync {
    /// Fetch one record.
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// All records of a table, in key order.
    fn scan(&self, table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;

    /// Apply every operation of `batch` atomically.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    fn contains(&self, table: Table, key: &[u8]) -> Result<bool, StoreError> {
        self.get(table, key).map(|v| v.is_some())
    }

    /// Records whose key starts with `prefix`, in key order.
    fn scan_prefix(
        &self,
        table: Table,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        Ok(self
            .scan(table)?
            .into_iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect())
    }

    /// Count records without returning them.
    fn count(&self, table: Table) -> Result<u64, StoreError> {
        self.scan(table).map(|v| v.len() as u64)
    }
}
