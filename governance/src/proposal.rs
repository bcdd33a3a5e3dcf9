//! Governance proposals and their lifecycle.
//!
//! A proposal is `Active` from the moment it is created and runs for its full
//! configured duration. The first operation that observes `now >= end_time`
//! finalizes it to `Passed` or `Rejected`; nothing is decided earlier, even if
//! quorum and supermajority are already met. Once decided the outcome never
//! changes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use whisper_store::{keys, Table, WriteBatch};
use whisper_types::{ActorId, ContentHash, EntityKind, ProposalId, Timestamp};
use whisper_utils::format_duration;

use crate::codec;
use crate::context::{
    require_bytes, require_text, LedgerContext, STAT_FINALIZED, STAT_PROPOSALS,
};
use crate::identity::{load_or_zeroed, stage_reputation, Contribution};
use crate::locks::LockKey;
use crate::tally::{validate_ballot, Ballot, CounterScope, TallyAccumulator, TallySheet, VoteTarget};
use crate::ForumError;

/// Ledger states of a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Accepting votes until `end_time`.
    Active,
    /// Quorum met and more than two thirds voted yes.
    Passed,
    /// Deadline reached without quorum or supermajority.
    Rejected,
}

impl ProposalStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Active)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Passed => "passed",
            Self::Rejected => "rejected",
        }
    }
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub proposal_hash: ContentHash,
    pub proposer: ActorId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Minimum total votes (quorum).
    pub threshold: u32,
    pub encrypted_details: Vec<u8>,
    pub proof: Vec<u8>,
    /// Yes votes are `in_favor`, no votes `against`.
    pub tally: TallySheet,
    pub status: ProposalStatus,
    pub finalized_at: Option<Timestamp>,
}

impl Proposal {
    pub fn yes_votes(&self) -> u32 {
        self.tally.in_favor
    }

    pub fn no_votes(&self) -> u32 {
        self.tally.against
    }

    /// Always `yes_votes + no_votes`.
    pub fn total_votes(&self) -> u32 {
        self.tally.total()
    }

    pub fn is_passed(&self) -> bool {
        self.status == ProposalStatus::Passed
    }

    /// Whether a vote cast at `now` may still be counted.
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.status == ProposalStatus::Active && now < self.end_time
    }

    /// The status this proposal has at `now`, without writing anything.
    pub fn evaluate(&self, now: Timestamp) -> ProposalStatus {
        if self.status.is_final() || now < self.end_time {
            self.status
        } else {
            self.outcome()
        }
    }

    /// Quorum and two-thirds supermajority, in exact integer arithmetic.
    pub fn outcome(&self) -> ProposalStatus {
        let yes = u64::from(self.yes_votes());
        let total = u64::from(self.total_votes());
        let quorum_met = total >= u64::from(self.threshold);
        let supermajority = yes * 3 > total * 2;
        if quorum_met && supermajority {
            ProposalStatus::Passed
        } else {
            ProposalStatus::Rejected
        }
    }

    /// Votes cast relative to quorum, in basis points, capped at 100%.
    pub fn participation_bps(&self) -> u32 {
        if self.threshold == 0 {
            return 10_000;
        }
        let bps = u64::from(self.total_votes()) * 10_000 / u64::from(self.threshold);
        bps.min(10_000) as u32
    }

    /// Apply the deadline transition if due. Returns whether anything changed.
    fn finalize_at(&mut self, now: Timestamp) -> bool {
        let next = self.evaluate(now);
        if next == self.status {
            return false;
        }
        self.status = next;
        self.finalized_at = Some(now);
        true
    }
}

/// Request to open a proposal.
#[derive(Clone, Debug)]
pub struct NewProposal {
    pub title: String,
    pub description: String,
    pub proposal_hash: ContentHash,
    pub duration_secs: u64,
    pub threshold: u32,
    pub encrypted_details: Vec<u8>,
    pub proof: Vec<u8>,
}

impl NewProposal {
    pub(crate) fn validate(&self, max_title_len: usize) -> Result<(), ForumError> {
        require_text("title", &self.title, max_title_len)?;
        require_duration(self.duration_secs)?;
        require_bytes("encrypted details", &self.encrypted_details)?;
        require_bytes("input proof", &self.proof)
    }
}

/// A voting window must have a positive length.
pub(crate) fn require_duration(duration_secs: u64) -> Result<(), ForumError> {
    if duration_secs == 0 {
        return Err(ForumError::Validation("duration must be positive".into()));
    }
    Ok(())
}

pub struct ProposalLedger {
    ctx: Arc<LedgerContext>,
    tally: Arc<TallyAccumulator>,
}

impl ProposalLedger {
    pub(crate) fn new(ctx: Arc<LedgerContext>, tally: Arc<TallyAccumulator>) -> Self {
        Self { ctx, tally }
    }

    pub fn create_proposal(&self, proposer: &ActorId, new: NewProposal) -> Result<ProposalId, ForumError> {
        new.validate(self.ctx.params.max_title_len)?;
        self.ctx.check_proof(&new.encrypted_details, &new.proof)?;

        let _locks = self.ctx.locks.acquire(&[
            LockKey::Sequence(EntityKind::Proposal),
            LockKey::Actor(proposer),
        ]);
        let mut batch = WriteBatch::new();
        let id = self.stage_proposal(proposer, new, &mut batch)?;
        self.ctx.store.commit(batch)?;
        self.ctx.stats.increment(STAT_PROPOSALS);
        Ok(id)
    }

    /// Build a validated, proof-checked proposal and stage it with the
    /// proposer's reputation bump.
    ///
    /// The caller must hold `Sequence(Proposal)` and the proposer's lock.
    pub(crate) fn stage_proposal(
        &self,
        proposer: &ActorId,
        new: NewProposal,
        batch: &mut WriteBatch,
    ) -> Result<ProposalId, ForumError> {
        let now = self.ctx.now();
        let end_time = now
            .checked_add_secs(new.duration_secs)
            .ok_or_else(|| ForumError::Validation("duration overflows the clock".into()))?;
        if new.threshold > self.ctx.params.counter_ceiling {
            tracing::warn!(
                threshold = new.threshold,
                ceiling = self.ctx.params.counter_ceiling,
                "quorum exceeds the vote counter ceiling and cannot be reached"
            );
        }

        let id = ProposalId::new(self.ctx.next_id(EntityKind::Proposal, batch)?);
        let proposal = Proposal {
            id,
            title: new.title.trim().to_string(),
            description: new.description,
            proposal_hash: new.proposal_hash,
            proposer: proposer.clone(),
            start_time: now,
            end_time,
            threshold: new.threshold,
            encrypted_details: new.encrypted_details,
            proof: new.proof,
            tally: TallySheet::default(),
            status: ProposalStatus::Active,
            finalized_at: None,
        };
        let mut rep = load_or_zeroed(&self.ctx, proposer)?;
        rep.record(Contribution::Proposal, &self.ctx.params.reputation);

        stage_proposal_record(batch, &proposal)?;
        stage_reputation(batch, &rep)?;

        tracing::info!(
            proposal_id = %id,
            proposer = %proposer,
            threshold = proposal.threshold,
            window = %format_duration(new.duration_secs),
            "proposal created"
        );
        Ok(id)
    }

    /// Cast an encrypted yes/no vote. One vote per actor per proposal.
    pub fn vote_on_proposal(
        &self,
        voter: &ActorId,
        proposal_id: ProposalId,
        ballot: Ballot,
    ) -> Result<(), ForumError> {
        validate_ballot(&ballot)?;

        let _locks = self.ctx.locks.acquire(&[LockKey::Proposal(proposal_id)]);
        let mut proposal = self.get(proposal_id)?;
        let now = self.ctx.now();
        if !proposal.is_open(now) {
            // Observing the deadline here finalizes, like any other operation would.
            if proposal.finalize_at(now) {
                self.commit_finalized(&proposal)?;
            }
            return Err(ForumError::ProposalClosed(proposal_id));
        }

        let mut batch = WriteBatch::new();
        self.tally.accumulate(
            voter,
            VoteTarget::Proposal(proposal_id),
            &ballot,
            &mut proposal.tally,
            CounterScope::Combined,
            &mut batch,
        )?;
        stage_proposal_record(&mut batch, &proposal)?;
        self.tally.commit_vote(batch)?;

        tracing::debug!(
            proposal_id = %proposal_id,
            voter = %voter,
            total_votes = proposal.total_votes(),
            "proposal vote accepted"
        );
        Ok(())
    }

    /// Finalize if the deadline has passed; otherwise a no-op. Returns the
    /// current status either way.
    pub fn finalize(&self, proposal_id: ProposalId) -> Result<ProposalStatus, ForumError> {
        self.observe(proposal_id).map(|p| p.status)
    }

    /// Load a proposal, finalizing it first if its deadline has passed.
    pub fn observe(&self, proposal_id: ProposalId) -> Result<Proposal, ForumError> {
        let now = self.ctx.now();
        let proposal = self.get(proposal_id)?;
        if proposal.evaluate(now) == proposal.status {
            return Ok(proposal);
        }

        let _locks = self.ctx.locks.acquire(&[LockKey::Proposal(proposal_id)]);
        // Re-read under the lock: another observer may have finalized meanwhile.
        let mut proposal = self.get(proposal_id)?;
        if proposal.finalize_at(now) {
            self.commit_finalized(&proposal)?;
        }
        Ok(proposal)
    }

    /// Finalize every proposal whose deadline has passed. Returns how many
    /// this call transitioned.
    pub fn finalize_due(&self) -> Result<usize, ForumError> {
        let now = self.ctx.now();
        let due: Vec<ProposalId> = self
            .all()?
            .into_iter()
            .filter(|p| p.evaluate(now) != p.status)
            .map(|p| p.id)
            .collect();

        let mut finalized = 0;
        for id in due {
            let _locks = self.ctx.locks.acquire(&[LockKey::Proposal(id)]);
            let mut proposal = self.get(id)?;
            if proposal.finalize_at(now) {
                self.commit_finalized(&proposal)?;
                finalized += 1;
            }
        }
        if finalized > 0 {
            tracing::info!(finalized, "maintenance sweep finalized proposals");
        }
        Ok(finalized)
    }

    fn commit_finalized(&self, proposal: &Proposal) -> Result<(), ForumError> {
        let mut batch = WriteBatch::new();
        stage_proposal_record(&mut batch, proposal)?;
        self.ctx.store.commit(batch)?;
        self.ctx.stats.increment(STAT_FINALIZED);
        tracing::info!(
            proposal_id = %proposal.id,
            status = proposal.status.name(),
            yes = proposal.yes_votes(),
            no = proposal.no_votes(),
            threshold = proposal.threshold,
            "proposal finalized"
        );
        Ok(())
    }

    /// Raw read without lazy finalization.
    pub fn get(&self, proposal_id: ProposalId) -> Result<Proposal, ForumError> {
        self.ctx
            .load(Table::Proposals, &keys::proposal(proposal_id))?
            .ok_or_else(|| ForumError::NotFound(proposal_id.to_string()))
    }

    pub fn all(&self) -> Result<Vec<Proposal>, ForumError> {
        self.ctx.load_all(Table::Proposals)
    }
}

fn stage_proposal_record(batch: &mut WriteBatch, proposal: &Proposal) -> Result<(), ForumError> {
    batch.put(Table::Proposals, keys::proposal(proposal.id), codec::encode(proposal)?);
    Ok(())
}
