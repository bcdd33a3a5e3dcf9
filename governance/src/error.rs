use thiserror::Error;
use whisper_proof::ProofError;
use whisper_store::StoreError;
use whisper_types::{ProposalId, TypesError};

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("proof rejected by verifier")]
    InvalidProof,

    #[error("proof verifier unavailable: {0}")]
    VerifierUnavailable(String),

    #[error("{voter} has already voted on {target}")]
    DuplicateVote { voter: String, target: String },

    #[error("{0} is closed for voting")]
    ProposalClosed(ProposalId),

    #[error("{actor} is not allowed to {action}")]
    PermissionDenied { actor: String, action: &'static str },

    #[error("{counter} counter is saturated at {ceiling}")]
    CounterSaturated { counter: &'static str, ceiling: u32 },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("codec error: {0}")]
    Codec(String),
}

impl ForumError {
    /// Stable machine-readable code for callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::InvalidProof => "invalid_proof",
            Self::VerifierUnavailable(_) => "verifier_unavailable",
            Self::DuplicateVote { .. } => "duplicate_vote",
            Self::ProposalClosed(_) => "proposal_closed",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::CounterSaturated { .. } => "counter_saturated",
            Self::Store(_) => "store_error",
            Self::Codec(_) => "codec_error",
        }
    }
}

impl From<TypesError> for ForumError {
    fn from(e: TypesError) -> Self {
        ForumError::Validation(e.to_string())
    }
}

impl From<ProofError> for ForumError {
    fn from(e: ProofError) -> Self {
        match e {
            ProofError::Unavailable(reason) => ForumError::VerifierUnavailable(reason),
            ProofError::Malformed(reason) => ForumError::Validation(reason),
        }
    }
}
