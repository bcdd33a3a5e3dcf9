//! Errors raised while constructing fundamental types from external input.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("unknown category code {0} (expected 1..=4)")]
    InvalidCategory(u64),

    #[error("actor reference must not be empty")]
    EmptyActor,

    #[error("content hash must not be empty")]
    EmptyContentHash,
}
