//! Digest-binding proof verifier.
//!
//! A proof is valid when it equals `Blake2b-256(domain || payload)`. This binds
//! each proof to exactly one payload, which is what the ledger relies on; it does
//! not attest anything about the plaintext.

use crate::{ProofError, ProofVerifier, Verdict};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Default domain separator for input proofs.
pub const DEFAULT_DOMAIN: &[u8] = b"whisper/input-proof/v1";

pub struct DigestVerifier {
    domain: Vec<u8>,
}

impl DigestVerifier {
    pub fn new(domain: impl Into<Vec<u8>>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    /// Produce the proof this verifier accepts for `payload`.
    pub fn prove(&self, payload: &[u8]) -> Vec<u8> {
        let mut hasher = Blake2b256::new();
        hasher.update(&self.domain);
        hasher.update(payload);
        hasher.finalize().to_vec()
    }
}

impl Default for DigestVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN)
    }
}

impl ProofVerifier for DigestVerifier {
    fn verify(&self, payload: &[u8], proof: &[u8]) -> Result<Verdict, ProofError> {
        if proof.len() != 32 {
            return Ok(Verdict::Invalid);
        }
        let expected = self.prove(payload);
        // Fold all bytes so the comparison time does not depend on the mismatch position.
        let diff = expected
            .iter()
            .zip(proof)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        if diff == 0 {
            Ok(Verdict::Valid)
        } else {
            tracing::debug!(verifier = self.name(), "proof digest mismatch");
            Ok(Verdict::Invalid)
        }
    }

    fn name(&self) -> &str {
        "digest-binding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_its_own_proofs() {
        let verifier = DigestVerifier::default();
        let proof = verifier.prove(b"ciphertext");
        assert_eq!(verifier.verify(b"ciphertext", &proof).unwrap(), Verdict::Valid);
    }

    #[test]
    fn rejects_proof_for_other_payload() {
        let verifier = DigestVerifier::default();
        let proof = verifier.prove(b"ciphertext");
        assert_eq!(verifier.verify(b"other", &proof).unwrap(), Verdict::Invalid);
        assert_eq!(verifier.verify(b"ciphertext", b"short").unwrap(), Verdict::Invalid);
    }

    #[test]
    fn domains_are_separated() {
        let a = DigestVerifier::new(b"a".to_vec());
        let b = DigestVerifier::new(b"b".to_vec());
        let proof = a.prove(b"x");
        assert!(!b.verify(b"x", &proof).unwrap().is_valid());
    }
}
