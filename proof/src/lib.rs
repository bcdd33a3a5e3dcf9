//! Cryptographic capabilities consumed by the ledger.
//!
//! The ledger never inspects encrypted payloads. It forwards them, together with
//! their validity proofs, to a [`ProofVerifier`], and folds encrypted vote weights
//! into running aggregates through an [`EncryptedTally`]. Concrete schemes plug in
//! behind these traits:
//! - [`DigestVerifier`]: binds a proof to its payload with a keyed Blake2b digest
//! - [`HashChainTally`]: commits to the ordered sequence of folded weights

pub mod digest;
pub mod error;
pub mod hash_chain;

pub use digest::DigestVerifier;
pub use error::ProofError;
pub use hash_chain::HashChainTally;

/// Outcome of checking a proof against its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Trait for checking that an encrypted payload is well-formed.
///
/// Implementations must answer within a bounded time and must not retry
/// internally: an unreachable or slow backend reports [`ProofError::Unavailable`].
pub trait ProofVerifier: Send + Sync {
    /// Check `proof` against `payload`.
    fn verify(&self, payload: &[u8], proof: &[u8]) -> Result<Verdict, ProofError>;

    /// Human-readable name of this verifier.
    fn name(&self) -> &str;
}

/// Trait for combining encrypted vote weights without decrypting them.
pub trait EncryptedTally: Send + Sync {
    /// Fold `weight` into `running` (absent for the first vote) and return the new aggregate.
    fn combine(&self, running: Option<&[u8]>, weight: &[u8]) -> Result<Vec<u8>, ProofError>;

    /// Human-readable name of this tally scheme.
    fn name(&self) -> &str;
}
