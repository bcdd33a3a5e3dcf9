//! LMDB environment setup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use whisper_store::Table;

use crate::LmdbError;

/// Default map size: 1 GiB.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Wraps the LMDB environment and one database handle per ledger table.
pub struct LmdbEnvironment {
    pub(crate) env: Env,
    dbs: HashMap<Table, Database<Bytes, Bytes>>,
    path: PathBuf,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per directory by this process
        // and the memory map is never modified outside of LMDB transactions.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(Table::ALL.len() as u32)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let mut dbs = HashMap::with_capacity(Table::ALL.len());
        for table in Table::ALL {
            let db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(table.name()))?;
            dbs.insert(table, db);
        }
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(Self {
            env,
            dbs,
            path: path.to_path_buf(),
        })
    }

    pub(crate) fn db(&self, table: Table) -> Result<Database<Bytes, Bytes>, LmdbError> {
        self.dbs
            .get(&table)
            .copied()
            .ok_or_else(|| LmdbError::NotFound(format!("database '{}'", table.name())))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
