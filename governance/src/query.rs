//! Read-only projections for the presentation layer.
//!
//! Field names serialize in camelCase to match the existing view models. The
//! only write a query can cause is the lazy finalization of a proposal whose
//! deadline has passed.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use whisper_store::Table;
use whisper_types::{ActorId, Category, CommentId, ContentHash, PostId, ProposalId, Timestamp};

use crate::context::LedgerContext;
use crate::identity::{load_or_zeroed, Reputation};
use crate::post::{Comment, Post, PostLedger};
use crate::proposal::{Proposal, ProposalLedger, ProposalStatus};
use crate::ForumError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInfo {
    pub id: PostId,
    pub title: String,
    pub content_hash: ContentHash,
    pub upvotes: u32,
    pub downvotes: u32,
    pub comment_count: u32,
    pub is_encrypted: bool,
    pub is_moderated: bool,
    pub author: ActorId,
    pub timestamp: Timestamp,
    /// Wire code, see [`Category::code`].
    pub category: u64,
}

impl From<&Post> for PostInfo {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            content_hash: post.content_hash.clone(),
            upvotes: post.tally.in_favor,
            downvotes: post.tally.against,
            comment_count: post.comment_count,
            is_encrypted: post.is_encrypted,
            is_moderated: post.is_moderated,
            author: post.author.clone(),
            timestamp: post.created_at,
            category: post.category.code(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInfo {
    pub id: CommentId,
    pub post_id: PostId,
    pub author: ActorId,
    pub content_hash: ContentHash,
    pub timestamp: Timestamp,
}

impl From<&Comment> for CommentInfo {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author: comment.author.clone(),
            content_hash: comment.content_hash.clone(),
            timestamp: comment.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalInfo {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub proposal_hash: ContentHash,
    pub yes_votes: u32,
    pub no_votes: u32,
    pub total_votes: u32,
    pub is_active: bool,
    pub is_passed: bool,
    pub proposer: ActorId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub threshold: u32,
    pub status: ProposalStatus,
    pub participation_bps: u32,
}

impl ProposalInfo {
    /// Project `proposal` as it stands at `now`.
    fn at(proposal: &Proposal, now: Timestamp) -> Self {
        let status = proposal.evaluate(now);
        Self {
            id: proposal.id,
            title: proposal.title.clone(),
            description: proposal.description.clone(),
            proposal_hash: proposal.proposal_hash.clone(),
            yes_votes: proposal.yes_votes(),
            no_votes: proposal.no_votes(),
            total_votes: proposal.total_votes(),
            is_active: status == ProposalStatus::Active,
            is_passed: status == ProposalStatus::Passed,
            proposer: proposal.proposer.clone(),
            start_time: proposal.start_time,
            end_time: proposal.end_time,
            threshold: proposal.threshold,
            status,
            participation_bps: proposal.participation_bps(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReputation {
    pub actor: ActorId,
    pub reputation: u32,
    pub post_count: u32,
    pub comment_count: u32,
    pub proposal_count: u32,
    pub is_verified: bool,
    pub is_moderator: bool,
}

impl From<Reputation> for UserReputation {
    fn from(rep: Reputation) -> Self {
        Self {
            actor: rep.actor,
            reputation: rep.reputation_score,
            post_count: rep.post_count,
            comment_count: rep.comment_count,
            proposal_count: rep.proposal_count,
            is_verified: rep.is_verified,
            is_moderator: rep.is_moderator,
        }
    }
}

/// Forum-wide counts for dashboards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumStats {
    pub members: u64,
    pub posts: u64,
    pub posts_by_category: BTreeMap<String, u64>,
    pub comments: u64,
    pub proposals_active: u64,
    pub proposals_passed: u64,
    pub proposals_rejected: u64,
    pub votes_cast: u64,
}

pub struct QueryFacade {
    ctx: Arc<LedgerContext>,
    posts: Arc<PostLedger>,
    proposals: Arc<ProposalLedger>,
}

impl QueryFacade {
    pub(crate) fn new(ctx: Arc<LedgerContext>, posts: Arc<PostLedger>, proposals: Arc<ProposalLedger>) -> Self {
        Self {
            ctx,
            posts,
            proposals,
        }
    }

    pub fn post_info(&self, post_id: PostId) -> Result<PostInfo, ForumError> {
        self.posts.get(post_id).map(|p| PostInfo::from(&p))
    }

    /// Finalizes the proposal first if its deadline has passed.
    pub fn proposal_info(&self, proposal_id: ProposalId) -> Result<ProposalInfo, ForumError> {
        let proposal = self.proposals.observe(proposal_id)?;
        Ok(ProposalInfo::at(&proposal, self.ctx.now()))
    }

    /// Never-seen actors read as a zeroed record.
    pub fn user_reputation(&self, actor: &ActorId) -> Result<UserReputation, ForumError> {
        load_or_zeroed(&self.ctx, actor).map(UserReputation::from)
    }

    pub fn comments(&self, post_id: PostId) -> Result<Vec<CommentInfo>, ForumError> {
        Ok(self.posts.comments(post_id)?.iter().map(CommentInfo::from).collect())
    }

    /// Posts in id order, optionally restricted to one category.
    pub fn list_posts(&self, category: Option<Category>) -> Result<Vec<PostInfo>, ForumError> {
        Ok(self
            .posts
            .all()?
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .map(PostInfo::from)
            .collect())
    }

    /// Proposals in id order. Statuses reflect the deadline without finalizing.
    pub fn list_proposals(&self) -> Result<Vec<ProposalInfo>, ForumError> {
        let now = self.ctx.now();
        Ok(self
            .proposals
            .all()?
            .iter()
            .map(|p| ProposalInfo::at(p, now))
            .collect())
    }

    pub fn stats(&self) -> Result<ForumStats, ForumError> {
        let now = self.ctx.now();
        let mut stats = ForumStats {
            members: self.ctx.store.count(Table::Reputations)?,
            comments: self.ctx.store.count(Table::Comments)?,
            votes_cast: self.ctx.store.count(Table::Votes)?,
            ..Default::default()
        };
        for category in Category::ALL {
            stats.posts_by_category.insert(category.name().to_string(), 0);
        }
        for post in self.posts.all()? {
            stats.posts += 1;
            *stats
                .posts_by_category
                .entry(post.category.name().to_string())
                .or_default() += 1;
        }
        for proposal in self.proposals.all()? {
            match proposal.evaluate(now) {
                ProposalStatus::Active => stats.proposals_active += 1,
                ProposalStatus::Passed => stats.proposals_passed += 1,
                ProposalStatus::Rejected => stats.proposals_rejected += 1,
            }
        }
        Ok(stats)
    }
}
