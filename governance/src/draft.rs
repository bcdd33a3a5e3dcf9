//! Proposal drafts.
//!
//! Drafts are private working copies that never enter the proposal ledger.
//! Submitting one runs the normal proposal creation path and deletes the draft
//! in the same write batch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use whisper_store::{keys, Table, WriteBatch};
use whisper_types::{ActorId, ContentHash, DraftId, EntityKind, ProposalId, Timestamp};

use crate::codec;
use crate::context::{require_text, LedgerContext, STAT_PROPOSALS};
use crate::locks::LockKey;
use crate::proposal::{require_duration, NewProposal, ProposalLedger};
use crate::ForumError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub id: DraftId,
    pub author: ActorId,
    pub title: String,
    pub description: String,
    pub proposal_hash: ContentHash,
    pub duration_secs: u64,
    pub threshold: u32,
    pub saved_at: Timestamp,
}

/// Editable fields of a draft.
#[derive(Clone, Debug)]
pub struct DraftFields {
    pub title: String,
    pub description: String,
    pub proposal_hash: ContentHash,
    pub duration_secs: u64,
    pub threshold: u32,
}

pub struct DraftBook {
    ctx: Arc<LedgerContext>,
    proposals: Arc<ProposalLedger>,
}

impl DraftBook {
    pub(crate) fn new(ctx: Arc<LedgerContext>, proposals: Arc<ProposalLedger>) -> Self {
        Self { ctx, proposals }
    }

    pub fn save_draft(&self, author: &ActorId, fields: DraftFields) -> Result<DraftId, ForumError> {
        require_text("title", &fields.title, self.ctx.params.max_title_len)?;
        require_duration(fields.duration_secs)?;

        let _locks = self.ctx.locks.acquire(&[LockKey::Sequence(EntityKind::Draft)]);
        let mut batch = WriteBatch::new();
        let id = DraftId::new(self.ctx.next_id(EntityKind::Draft, &mut batch)?);
        let draft = ProposalDraft {
            id,
            author: author.clone(),
            title: fields.title,
            description: fields.description,
            proposal_hash: fields.proposal_hash,
            duration_secs: fields.duration_secs,
            threshold: fields.threshold,
            saved_at: self.ctx.now(),
        };
        batch.put(Table::Drafts, keys::draft(id), codec::encode(&draft)?);
        self.ctx.store.commit(batch)?;

        tracing::debug!(draft_id = %id, author = %author, "draft saved");
        Ok(id)
    }

    pub fn discard_draft(&self, author: &ActorId, draft_id: DraftId) -> Result<(), ForumError> {
        let _locks = self.ctx.locks.acquire(&[LockKey::Draft(draft_id)]);
        self.owned_draft(author, draft_id, "discard this draft")?;
        let mut batch = WriteBatch::new();
        batch.delete(Table::Drafts, keys::draft(draft_id));
        self.ctx.store.commit(batch)?;

        tracing::debug!(draft_id = %draft_id, author = %author, "draft discarded");
        Ok(())
    }

    /// Drafts saved by `author`, oldest first.
    pub fn list_drafts(&self, author: &ActorId) -> Result<Vec<ProposalDraft>, ForumError> {
        Ok(self
            .ctx
            .load_all::<ProposalDraft>(Table::Drafts)?
            .into_iter()
            .filter(|d| &d.author == author)
            .collect())
    }

    /// Turn a draft into an active proposal.
    pub fn submit_draft(
        &self,
        author: &ActorId,
        draft_id: DraftId,
        encrypted_details: Vec<u8>,
        proof: Vec<u8>,
    ) -> Result<ProposalId, ForumError> {
        let draft = self.owned_draft(author, draft_id, "submit this draft")?;
        let new = NewProposal {
            title: draft.title,
            description: draft.description,
            proposal_hash: draft.proposal_hash,
            duration_secs: draft.duration_secs,
            threshold: draft.threshold,
            encrypted_details,
            proof,
        };
        new.validate(self.ctx.params.max_title_len)?;
        self.ctx.check_proof(&new.encrypted_details, &new.proof)?;

        let _locks = self.ctx.locks.acquire(&[
            LockKey::Sequence(EntityKind::Proposal),
            LockKey::Draft(draft_id),
            LockKey::Actor(author),
        ]);
        // Drafts are immutable and ids are never reused, so the draft is either
        // still the one that was verified or gone.
        self.owned_draft(author, draft_id, "submit this draft")?;

        let mut batch = WriteBatch::new();
        let id = self.proposals.stage_proposal(author, new, &mut batch)?;
        batch.delete(Table::Drafts, keys::draft(draft_id));
        self.ctx.store.commit(batch)?;
        self.ctx.stats.increment(STAT_PROPOSALS);

        tracing::info!(draft_id = %draft_id, proposal_id = %id, "draft submitted");
        Ok(id)
    }

    fn owned_draft(
        &self,
        author: &ActorId,
        draft_id: DraftId,
        action: &'static str,
    ) -> Result<ProposalDraft, ForumError> {
        let draft: ProposalDraft = self
            .ctx
            .load(Table::Drafts, &keys::draft(draft_id))?
            .ok_or_else(|| ForumError::NotFound(draft_id.to_string()))?;
        if &draft.author != author {
            return Err(ForumError::PermissionDenied {
                actor: author.to_string(),
                action,
            });
        }
        Ok(draft)
    }
}
