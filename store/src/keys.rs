//! Key layouts shared by all backends.
//!
//! Numeric ids are encoded big-endian so byte order equals numeric order.

use whisper_types::{ActorId, CommentId, DraftId, EntityKind, PostId, ProposalId};

const TARGET_POST: u8 = b'p';
const TARGET_PROPOSAL: u8 = b'g';

pub fn post(id: PostId) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

pub fn proposal(id: ProposalId) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

pub fn draft(id: DraftId) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

pub fn comment(post_id: PostId, comment_id: CommentId) -> Vec<u8> {
    let mut key = post_id.to_be_bytes().to_vec();
    key.extend_from_slice(&comment_id.to_be_bytes());
    key
}

/// Prefix covering every comment of `post_id`.
pub fn comments_of(post_id: PostId) -> Vec<u8> {
    post_id.to_be_bytes().to_vec()
}

pub fn reputation(actor: &ActorId) -> Vec<u8> {
    actor.as_bytes().to_vec()
}

pub fn post_target(id: PostId) -> Vec<u8> {
    let mut key = vec![TARGET_POST];
    key.extend_from_slice(&id.to_be_bytes());
    key
}

pub fn proposal_target(id: ProposalId) -> Vec<u8> {
    let mut key = vec![TARGET_PROPOSAL];
    key.extend_from_slice(&id.to_be_bytes());
    key
}

/// Participation-record key: `target || voter`.
pub fn vote(target: &[u8], voter: &ActorId) -> Vec<u8> {
    let mut key = target.to_vec();
    key.extend_from_slice(voter.as_bytes());
    key
}

/// Meta key of the id sequence for `kind`.
pub fn sequence(kind: EntityKind) -> Vec<u8> {
    format!("seq/{}", kind.name()).into_bytes()
}
