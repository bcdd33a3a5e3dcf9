//! Monotonic entity identifiers.
//!
//! Each entity kind has its own id sequence starting at 1. Ids are never reused.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            pub fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub fn get(&self) -> u64 {
                self.0
            }

            /// Big-endian bytes, so store keys sort in id order.
            pub fn to_be_bytes(&self) -> [u8; 8] {
                self.0.to_be_bytes()
            }

            pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
                Self(u64::from_be_bytes(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $prefix, self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// Identifier of a discussion post.
    PostId,
    "post"
);
entity_id!(
    /// Identifier of a comment under a post.
    CommentId,
    "comment"
);
entity_id!(
    /// Identifier of a governance proposal.
    ProposalId,
    "proposal"
);
entity_id!(
    /// Identifier of a proposal draft (never a ledger proposal).
    DraftId,
    "draft"
);

/// The entity kinds that own an id sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Post,
    Comment,
    Proposal,
    Draft,
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
            Self::Proposal => "proposal",
            Self::Draft => "draft",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_bytes_sort_like_ids() {
        let a = PostId::new(9);
        let b = PostId::new(256);
        assert!(a.to_be_bytes() < b.to_be_bytes());
        assert_eq!(PostId::from_be_bytes(b.to_be_bytes()), b);
    }

    #[test]
    fn display_carries_kind() {
        assert_eq!(ProposalId::new(3).to_string(), "proposal#3");
    }
}
