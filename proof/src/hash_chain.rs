//! Hash-chain tally: a commitment to every folded weight, in order.
//!
//! `aggregate_n = Blake2b-256(aggregate_{n-1} || weight_n)`, with an all-zero
//! seed. Individual weights cannot be recovered from the aggregate; an external
//! opener holding the weights can recompute and check it at tally time.

use crate::{EncryptedTally, ProofError};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

const SEED: [u8; 32] = [0u8; 32];

#[derive(Clone, Copy, Debug, Default)]
pub struct HashChainTally;

impl EncryptedTally for HashChainTally {
    fn combine(&self, running: Option<&[u8]>, weight: &[u8]) -> Result<Vec<u8>, ProofError> {
        if weight.is_empty() {
            return Err(ProofError::Malformed("empty vote weight".into()));
        }
        let mut hasher = Blake2b256::new();
        hasher.update(running.unwrap_or(&SEED));
        hasher.update(weight);
        Ok(hasher.finalize().to_vec())
    }

    fn name(&self) -> &str {
        "hash-chain"
    }
}
