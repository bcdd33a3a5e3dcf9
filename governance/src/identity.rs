//! Identity resolution and reputation.
//!
//! There is no registration step: an actor's reputation record is created
//! zeroed on first contact. Contribution counters only ever grow, and only as
//! part of the same write batch that creates the post, comment or proposal.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use whisper_store::{keys, Table, WriteBatch};
use whisper_types::{ActorId, Timestamp};

use crate::codec;
use crate::context::LedgerContext;
use crate::locks::LockKey;
use crate::params::ReputationWeights;
use crate::ForumError;

/// Per-actor reputation record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reputation {
    pub actor: ActorId,
    pub reputation_score: u32,
    pub post_count: u32,
    pub comment_count: u32,
    pub proposal_count: u32,
    pub is_verified: bool,
    pub is_moderator: bool,
    pub first_seen: Timestamp,
}

/// A kind of contribution that earns reputation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contribution {
    Post,
    Comment,
    Proposal,
}

impl Reputation {
    pub fn zeroed(actor: ActorId, now: Timestamp) -> Self {
        Self {
            actor,
            reputation_score: 0,
            post_count: 0,
            comment_count: 0,
            proposal_count: 0,
            is_verified: false,
            is_moderator: false,
            first_seen: now,
        }
    }

    /// Count one contribution. Counters saturate rather than wrap.
    pub fn record(&mut self, contribution: Contribution, weights: &ReputationWeights) {
        let (counter, reward) = match contribution {
            Contribution::Post => (&mut self.post_count, weights.post),
            Contribution::Comment => (&mut self.comment_count, weights.comment),
            Contribution::Proposal => (&mut self.proposal_count, weights.proposal),
        };
        *counter = counter.saturating_add(1);
        self.reputation_score = self.reputation_score.saturating_add(reward);
    }
}

pub struct IdentityResolver {
    ctx: Arc<LedgerContext>,
}

impl IdentityResolver {
    pub(crate) fn new(ctx: Arc<LedgerContext>) -> Self {
        Self { ctx }
    }

    /// Return the actor's record, creating a zeroed one on first contact.
    pub fn ensure(&self, actor: &ActorId) -> Result<Reputation, ForumError> {
        let _locks = self.ctx.locks.acquire(&[LockKey::Actor(actor)]);
        if let Some(existing) = self.lookup(actor)? {
            return Ok(existing);
        }
        let fresh = Reputation::zeroed(actor.clone(), self.ctx.now());
        let mut batch = WriteBatch::new();
        stage_reputation(&mut batch, &fresh)?;
        self.ctx.store.commit(batch)?;
        tracing::debug!(actor = %actor, "reputation record created");
        Ok(fresh)
    }

    /// Read the actor's record without creating it.
    pub fn lookup(&self, actor: &ActorId) -> Result<Option<Reputation>, ForumError> {
        self.ctx.load(Table::Reputations, &keys::reputation(actor))
    }

    pub fn is_admin(&self, actor: &ActorId) -> bool {
        self.ctx.params.admins.contains(actor)
    }

    /// Give `target` moderator capability. Admins only.
    pub fn grant_moderator(&self, admin: &ActorId, target: &ActorId) -> Result<Reputation, ForumError> {
        self.privileged_update(admin, target, "grant moderator rights", |rep| {
            rep.is_moderator = true
        })
    }

    /// Mark `target` as a verified account. Admins only.
    pub fn verify(&self, admin: &ActorId, target: &ActorId) -> Result<Reputation, ForumError> {
        self.privileged_update(admin, target, "verify accounts", |rep| rep.is_verified = true)
    }

    fn privileged_update(
        &self,
        admin: &ActorId,
        target: &ActorId,
        action: &'static str,
        apply: impl FnOnce(&mut Reputation),
    ) -> Result<Reputation, ForumError> {
        if !self.is_admin(admin) {
            tracing::warn!(actor = %admin, action, "privileged operation denied");
            return Err(ForumError::PermissionDenied {
                actor: admin.to_string(),
                action,
            });
        }
        let _locks = self.ctx.locks.acquire(&[LockKey::Actor(target)]);
        let mut rep = load_or_zeroed(&self.ctx, target)?;
        apply(&mut rep);
        let mut batch = WriteBatch::new();
        stage_reputation(&mut batch, &rep)?;
        self.ctx.store.commit(batch)?;
        tracing::info!(admin = %admin, target = %target, action, "privileged update applied");
        Ok(rep)
    }
}

/// Existing record or a zeroed one, without persisting it.
///
/// The caller must hold the actor's lock if it intends to write the result back.
pub(crate) fn load_or_zeroed(ctx: &LedgerContext, actor: &ActorId) -> Result<Reputation, ForumError> {
    Ok(ctx
        .load(Table::Reputations, &keys::reputation(actor))?
        .unwrap_or_else(|| Reputation::zeroed(actor.clone(), ctx.now())))
}

pub(crate) fn stage_reputation(batch: &mut WriteBatch, rep: &Reputation) -> Result<(), ForumError> {
    batch.put(Table::Reputations, keys::reputation(&rep.actor), codec::encode(rep)?);
    Ok(())
}
