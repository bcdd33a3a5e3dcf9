//! Actor references: the external account identifiers that author content and vote.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An external account identifier (for example an `0x…` wallet address).
///
/// The ledger never interprets the string beyond requiring it to be non-blank;
/// authentication happens before a request reaches the core.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(String);

impl ActorId {
    /// Parse an actor reference, trimming surrounding whitespace.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, TypesError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyActor);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Return the raw actor string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActorId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
