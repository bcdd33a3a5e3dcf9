use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProofError {
    #[error("proof backend unavailable: {0}")]
    Unavailable(String),

    #[error("malformed ciphertext: {0}")]
    Malformed(String),
}
