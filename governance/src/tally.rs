//! Confidential vote accumulation shared by the post and proposal ledgers.
//!
//! Every target keeps a [`TallySheet`]: plaintext participation counters plus
//! one sealed aggregate per direction, produced by folding each encrypted weight
//! through the configured [`EncryptedTally`] scheme. Weights are never decrypted
//! here.
//!
//! A participation record keyed by `(target, voter)` is written in the same
//! batch as the updated counters. Both ledgers call [`TallyAccumulator::accumulate`]
//! while holding the target's lock, so checking for an earlier vote and recording
//! the new one cannot interleave with another vote on that target.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use whisper_proof::EncryptedTally;
use whisper_store::{keys, Table, WriteBatch};
use whisper_types::{ActorId, PostId, ProposalId, Timestamp};

use crate::codec;
use crate::context::{require_bytes, LedgerContext, STAT_VOTES_ACCEPTED, STAT_VOTES_REJECTED};
use crate::ForumError;

/// What a vote is cast on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteTarget {
    Post(PostId),
    Proposal(ProposalId),
}

impl VoteTarget {
    pub(crate) fn key(&self) -> Vec<u8> {
        match self {
            Self::Post(id) => keys::post_target(*id),
            Self::Proposal(id) => keys::proposal_target(*id),
        }
    }
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post(id) => write!(f, "{id}"),
            Self::Proposal(id) => write!(f, "{id}"),
        }
    }
}

/// Upvote/yes versus downvote/no.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    InFavor,
    Against,
}

impl Direction {
    pub fn from_flag(in_favor: bool) -> Self {
        if in_favor {
            Self::InFavor
        } else {
            Self::Against
        }
    }
}

/// One encrypted vote as submitted by a caller.
#[derive(Clone, Debug)]
pub struct Ballot {
    pub direction: Direction,
    pub encrypted_weight: Vec<u8>,
    pub proof: Vec<u8>,
}

impl Ballot {
    pub fn new(in_favor: bool, encrypted_weight: Vec<u8>, proof: Vec<u8>) -> Self {
        Self {
            direction: Direction::from_flag(in_favor),
            encrypted_weight,
            proof,
        }
    }
}

/// Which counters the ceiling applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CounterScope {
    /// Each direction is bounded on its own (post up/down votes).
    PerDirection,
    /// The combined total is bounded (proposal `totalVotes`).
    Combined,
}

/// Vote counters and sealed aggregates of one target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallySheet {
    pub in_favor: u32,
    pub against: u32,
    pub sealed_in_favor: Option<Vec<u8>>,
    pub sealed_against: Option<Vec<u8>>,
}

impl TallySheet {
    pub fn total(&self) -> u32 {
        self.in_favor.saturating_add(self.against)
    }

    /// Apply one counted vote, failing instead of exceeding `ceiling`.
    fn count(&mut self, direction: Direction, scope: CounterScope, ceiling: u32) -> Result<(), ForumError> {
        let (counter, name) = match direction {
            Direction::InFavor => (self.in_favor, "in-favor"),
            Direction::Against => (self.against, "against"),
        };
        let (bounded, name) = match scope {
            CounterScope::PerDirection => (counter, name),
            CounterScope::Combined => (self.total(), "total"),
        };
        if bounded >= ceiling {
            return Err(ForumError::CounterSaturated {
                counter: name,
                ceiling,
            });
        }
        match direction {
            Direction::InFavor => self.in_favor += 1,
            Direction::Against => self.against += 1,
        }
        Ok(())
    }

    fn sealed_mut(&mut self, direction: Direction) -> &mut Option<Vec<u8>> {
        match direction {
            Direction::InFavor => &mut self.sealed_in_favor,
            Direction::Against => &mut self.sealed_against,
        }
    }
}

/// Participation record: proves `voter` voted on `target` without saying how.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter: ActorId,
    pub target: VoteTarget,
    pub cast_at: Timestamp,
    pub encrypted_weight: Vec<u8>,
}

pub struct TallyAccumulator {
    ctx: Arc<LedgerContext>,
    scheme: Arc<dyn EncryptedTally>,
}

impl TallyAccumulator {
    pub(crate) fn new(ctx: Arc<LedgerContext>, scheme: Arc<dyn EncryptedTally>) -> Self {
        Self { ctx, scheme }
    }

    /// Check and record one vote on `target`, updating `sheet` and staging the
    /// participation record into `batch`.
    ///
    /// The caller must hold the target's lock and must hand `batch`, together
    /// with the updated sheet, to [`TallyAccumulator::commit_vote`]. On error
    /// neither `sheet` nor `batch` is modified.
    pub(crate) fn accumulate(
        &self,
        voter: &ActorId,
        target: VoteTarget,
        ballot: &Ballot,
        sheet: &mut TallySheet,
        scope: CounterScope,
        batch: &mut WriteBatch,
    ) -> Result<(), ForumError> {
        let result = self.try_accumulate(voter, target, ballot, sheet, scope, batch);
        if let Err(e) = &result {
            self.ctx.stats.increment(STAT_VOTES_REJECTED);
            tracing::debug!(voter = %voter, target = %target, reason = e.code(), "vote rejected");
        }
        result
    }

    /// Commit a batch staged by [`TallyAccumulator::accumulate`]. A vote only
    /// counts as accepted once its batch is durable.
    pub(crate) fn commit_vote(&self, batch: WriteBatch) -> Result<(), ForumError> {
        match self.ctx.store.commit(batch) {
            Ok(()) => {
                self.ctx.stats.increment(STAT_VOTES_ACCEPTED);
                Ok(())
            }
            Err(e) => {
                self.ctx.stats.increment(STAT_VOTES_REJECTED);
                tracing::warn!(error = %e, "vote batch failed to commit");
                Err(e.into())
            }
        }
    }

    fn try_accumulate(
        &self,
        voter: &ActorId,
        target: VoteTarget,
        ballot: &Ballot,
        sheet: &mut TallySheet,
        scope: CounterScope,
        batch: &mut WriteBatch,
    ) -> Result<(), ForumError> {
        let vote_key = keys::vote(&target.key(), voter);
        if self.ctx.store.contains(Table::Votes, &vote_key)? {
            return Err(ForumError::DuplicateVote {
                voter: voter.to_string(),
                target: target.to_string(),
            });
        }

        self.ctx.check_proof(&ballot.encrypted_weight, &ballot.proof)?;

        let mut updated = sheet.clone();
        updated.count(ballot.direction, scope, self.ctx.params.counter_ceiling)?;
        let sealed = updated.sealed_mut(ballot.direction);
        *sealed = Some(self.scheme.combine(sealed.as_deref(), &ballot.encrypted_weight)?);

        let record = VoteRecord {
            voter: voter.clone(),
            target,
            cast_at: self.ctx.now(),
            encrypted_weight: ballot.encrypted_weight.clone(),
        };
        batch.put(Table::Votes, vote_key, codec::encode(&record)?);
        *sheet = updated;
        Ok(())
    }

    /// Name of the encrypted aggregation scheme.
    pub fn scheme_name(&self) -> &str {
        self.scheme.name()
    }
}

/// Shape checks shared by both vote paths; run before any lock is taken.
pub(crate) fn validate_ballot(ballot: &Ballot) -> Result<(), ForumError> {
    require_bytes("vote weight", &ballot.encrypted_weight)?;
    require_bytes("input proof", &ballot.proof)
}
