//! Record encoding for the ledger tables.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ForumError;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ForumError> {
    bincode::serialize(value).map_err(|e| ForumError::Codec(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ForumError> {
    bincode::deserialize(bytes).map_err(|e| ForumError::Codec(e.to_string()))
}
