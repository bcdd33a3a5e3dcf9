//! Shared state of every ledger component.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use whisper_proof::ProofVerifier;
use whisper_store::{keys, LedgerStore, Table, WriteBatch};
use whisper_types::{Clock, EntityKind, Timestamp};
use whisper_utils::StatsCounter;

use crate::codec;
use crate::locks::LockTable;
use crate::{ForumError, LedgerParams};

pub(crate) const STAT_POSTS: &str = "posts_created";
pub(crate) const STAT_COMMENTS: &str = "comments_added";
pub(crate) const STAT_PROPOSALS: &str = "proposals_created";
pub(crate) const STAT_VOTES_ACCEPTED: &str = "votes_accepted";
pub(crate) const STAT_VOTES_REJECTED: &str = "votes_rejected";
pub(crate) const STAT_PROOFS_REJECTED: &str = "proofs_rejected";
pub(crate) const STAT_FINALIZED: &str = "proposals_finalized";

pub(crate) const STAT_NAMES: &[&str] = &[
    STAT_POSTS,
    STAT_COMMENTS,
    STAT_PROPOSALS,
    STAT_VOTES_ACCEPTED,
    STAT_VOTES_REJECTED,
    STAT_PROOFS_REJECTED,
    STAT_FINALIZED,
];

pub(crate) struct LedgerContext {
    pub(crate) store: Arc<dyn LedgerStore>,
    pub(crate) verifier: Arc<dyn ProofVerifier>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) locks: LockTable,
    pub(crate) params: LedgerParams,
    pub(crate) stats: StatsCounter,
}

impl LedgerContext {
    pub(crate) fn new(
        store: Arc<dyn LedgerStore>,
        verifier: Arc<dyn ProofVerifier>,
        clock: Arc<dyn Clock>,
        params: LedgerParams,
    ) -> Self {
        Self {
            store,
            verifier,
            clock,
            locks: LockTable::new(params.lock_stripes),
            params,
            stats: StatsCounter::new(STAT_NAMES),
        }
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Forward an opaque payload and its proof to the verifier. Fail-closed:
    /// anything but a valid verdict aborts the calling operation.
    pub(crate) fn check_proof(&self, payload: &[u8], proof: &[u8]) -> Result<(), ForumError> {
        match self.verifier.verify(payload, proof) {
            Ok(verdict) if verdict.is_valid() => Ok(()),
            Ok(_) => {
                self.stats.increment(STAT_PROOFS_REJECTED);
                tracing::warn!(verifier = self.verifier.name(), "input proof rejected");
                Err(ForumError::InvalidProof)
            }
            Err(e) => {
                self.stats.increment(STAT_PROOFS_REJECTED);
                tracing::warn!(verifier = self.verifier.name(), error = %e, "proof verifier failed");
                Err(e.into())
            }
        }
    }

    pub(crate) fn load<T: DeserializeOwned>(
        &self,
        table: Table,
        key: &[u8],
    ) -> Result<Option<T>, ForumError> {
        match self.store.get(table, key)? {
            Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn load_all<T: DeserializeOwned>(&self, table: Table) -> Result<Vec<T>, ForumError> {
        self.store
            .scan(table)?
            .iter()
            .map(|(_, bytes)| codec::decode(bytes))
            .collect()
    }

    /// Reserve the next id of `kind` and stage the sequence bump into `batch`.
    ///
    /// The caller must hold the `Sequence(kind)` lock until the batch commits.
    pub(crate) fn next_id(&self, kind: EntityKind, batch: &mut WriteBatch) -> Result<u64, ForumError> {
        let key = keys::sequence(kind);
        let current = match self.store.get(Table::Meta, &key)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    ForumError::Codec(format!("{} sequence has {} bytes", kind.name(), bytes.len()))
                })?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| ForumError::Validation(format!("{} id space exhausted", kind.name())))?;
        batch.put(Table::Meta, key, next.to_be_bytes().to_vec());
        Ok(next)
    }
}

/// Reject blank or oversized text fields.
pub(crate) fn require_text(field: &str, value: &str, max_len: usize) -> Result<(), ForumError> {
    if value.trim().is_empty() {
        return Err(ForumError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(ForumError::Validation(format!(
            "{field} exceeds {max_len} characters"
        )));
    }
    Ok(())
}

/// Reject empty opaque byte fields.
pub(crate) fn require_bytes(field: &str, value: &[u8]) -> Result<(), ForumError> {
    if value.is_empty() {
        return Err(ForumError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
