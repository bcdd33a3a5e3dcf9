//! Confidential governance ledger.
//!
//! Records discussion posts and formal proposals, accepts encrypted votes bound
//! to validity proofs, and resolves each proposal once its voting window closes:
//! it passes when total votes reach the quorum threshold and more than two
//! thirds of them are yes votes, and is rejected otherwise.
//!
//! Encrypted payloads and proofs are opaque here. They are checked by a
//! [`whisper_proof::ProofVerifier`] and aggregated by a
//! [`whisper_proof::EncryptedTally`]; this crate owns the entity model, the
//! proposal state machine, vote uniqueness and the bounded counters.

pub mod api;
mod codec;
mod context;
pub mod draft;
pub mod error;
pub mod forum;
pub mod identity;
mod locks;
pub mod params;
pub mod post;
pub mod proposal;
pub mod query;
pub mod tally;

pub use api::ForumApi;
pub use draft::{DraftBook, DraftFields, ProposalDraft};
pub use error::ForumError;
pub use forum::Forum;
pub use identity::{Contribution, IdentityResolver, Reputation};
pub use params::{LedgerParams, ReputationWeights, DEFAULT_COUNTER_CEILING};
pub use post::{Comment, NewComment, NewPost, Post, PostLedger};
pub use proposal::{NewProposal, Proposal, ProposalLedger, ProposalStatus};
pub use query::{CommentInfo, ForumStats, PostInfo, ProposalInfo, QueryFacade, UserReputation};
pub use tally::{Ballot, Direction, TallyAccumulator, TallySheet, VoteRecord, VoteTarget};
