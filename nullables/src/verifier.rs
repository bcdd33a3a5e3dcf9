//! Nullable proof verifier: scripted verdicts for testing.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use whisper_proof::{ProofError, ProofVerifier, Verdict};

/// How a [`NullVerifier`] answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifierMode {
    /// Every non-empty proof is valid.
    AcceptAll,
    /// Every proof is invalid.
    RejectAll,
    /// The backend is down.
    Unavailable,
}

/// A deterministic proof verifier for testing.
///
/// Proofs registered with [`NullVerifier::reject_proof`] are always invalid,
/// whatever the mode.
pub struct NullVerifier {
    mode: Mutex<VerifierMode>,
    rejected: Mutex<HashSet<Vec<u8>>>,
    calls: AtomicU64,
}

impl NullVerifier {
    pub fn new(mode: VerifierMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            rejected: Mutex::new(HashSet::new()),
            calls: AtomicU64::new(0),
        }
    }

    pub fn accept_all() -> Self {
        Self::new(VerifierMode::AcceptAll)
    }

    pub fn set_mode(&self, mode: VerifierMode) {
        *self.mode.lock().unwrap_or_else(PoisonError::into_inner) = mode;
    }

    pub fn reject_proof(&self, proof: &[u8]) {
        self.rejected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(proof.to_vec());
    }

    /// Number of times `verify` has been called.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for NullVerifier {
    fn default() -> Self {
        Self::accept_all()
    }
}

impl ProofVerifier for NullVerifier {
    fn verify(&self, _payload: &[u8], proof: &[u8]) -> Result<Verdict, ProofError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mode = *self.mode.lock().unwrap_or_else(PoisonError::into_inner);
        match mode {
            VerifierMode::Unavailable => Err(ProofError::Unavailable("null verifier offline".into())),
            VerifierMode::RejectAll => Ok(Verdict::Invalid),
            VerifierMode::AcceptAll => {
                let rejected = self
                    .rejected
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .contains(proof);
                if proof.is_empty() || rejected {
                    Ok(Verdict::Invalid)
                } else {
                    Ok(Verdict::Valid)
                }
            }
        }
    }

    fn name(&self) -> &str {
        "null-verifier"
    }
}
