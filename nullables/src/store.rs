//! Nullable store: thread-safe in-memory storage for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use whisper_store::{BatchOp, LedgerStore, StoreError, Table, WriteBatch};

type Tables = HashMap<Table, BTreeMap<Vec<u8>, Vec<u8>>>;

/// An in-memory ledger store for testing.
///
/// A batch is applied under a single lock, so readers never observe half of it.
/// [`NullStore::fail_next_commit`] makes the next commit fail without applying
/// anything, for exercising all-or-nothing paths.
pub struct NullStore {
    tables: Mutex<Tables>,
    fail_next_commit: AtomicBool,
    commits: AtomicU64,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            fail_next_commit: AtomicBool::new(false),
            commits: AtomicU64::new(0),
        }
    }

    /// Make the next `commit` return a backend error.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for NullStore {
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .tables()
            .get(&table)
            .and_then(|t| t.get(key))
            .cloned())
    }

    fn scan(&self, table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        Ok(self
            .tables()
            .get(&table)
            .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn count(&self, table: Table) -> Result<u64, StoreError> {
        Ok(self.tables().get(&table).map(|t| t.len() as u64).unwrap_or(0))
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected commit failure".into()));
        }
        let mut tables = self.tables();
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { table, key, value } => {
                    tables.entry(table).or_default().insert(key, value);
                }
                BatchOp::Delete { table, key } => {
                    if let Some(t) = tables.get_mut(&table) {
                        t.remove(&key);
                    }
                }
            }
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
