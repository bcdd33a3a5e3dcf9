//! LMDB storage backend for the Whisper governance ledger.
//!
//! Implements [`whisper_store::LedgerStore`] and [`whisper_store::ContentStore`]
//! using the `heed` LMDB bindings. Each logical table maps to one named LMDB
//! database within a single environment, and every [`whisper_store::WriteBatch`]
//! is applied inside one write transaction.

pub mod content;
pub mod environment;
pub mod error;
pub mod ledger;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
