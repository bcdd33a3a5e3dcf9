//! Post ledger: discussion threads, comments, post votes and moderation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use whisper_store::{keys, Table, WriteBatch};
use whisper_types::{ActorId, Category, CommentId, ContentHash, EntityKind, PostId, Timestamp};

use crate::codec;
use crate::context::{require_bytes, require_text, LedgerContext, STAT_COMMENTS, STAT_POSTS};
use crate::identity::{load_or_zeroed, stage_reputation, Contribution};
use crate::locks::LockKey;
use crate::tally::{validate_ballot, Ballot, CounterScope, TallyAccumulator, TallySheet, VoteTarget};
use crate::ForumError;

/// A discussion thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content_hash: ContentHash,
    pub category: Category,
    pub encrypted_body: Vec<u8>,
    pub proof: Vec<u8>,
    pub author: ActorId,
    pub created_at: Timestamp,
    /// Upvotes are `in_favor`, downvotes `against`.
    pub tally: TallySheet,
    pub comment_count: u32,
    pub is_encrypted: bool,
    pub is_moderated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author: ActorId,
    pub content_hash: ContentHash,
    pub encrypted_body: Vec<u8>,
    pub proof: Vec<u8>,
    pub created_at: Timestamp,
}

/// Request to open a new thread.
#[derive(Clone, Debug)]
pub struct NewPost {
    pub title: String,
    pub content_hash: ContentHash,
    pub category: Category,
    pub encrypted_body: Vec<u8>,
    pub proof: Vec<u8>,
}

/// Request to reply to a thread.
#[derive(Clone, Debug)]
pub struct NewComment {
    pub post_id: PostId,
    pub content_hash: ContentHash,
    pub encrypted_body: Vec<u8>,
    pub proof: Vec<u8>,
}

pub struct PostLedger {
    ctx: Arc<LedgerContext>,
    tally: Arc<TallyAccumulator>,
}

impl PostLedger {
    pub(crate) fn new(ctx: Arc<LedgerContext>, tally: Arc<TallyAccumulator>) -> Self {
        Self { ctx, tally }
    }

    pub fn create_post(&self, author: &ActorId, new: NewPost) -> Result<PostId, ForumError> {
        require_text("title", &new.title, self.ctx.params.max_title_len)?;
        require_bytes("encrypted body", &new.encrypted_body)?;
        require_bytes("input proof", &new.proof)?;
        self.ctx.check_proof(&new.encrypted_body, &new.proof)?;

        let _locks = self
            .ctx
            .locks
            .acquire(&[LockKey::Sequence(EntityKind::Post), LockKey::Actor(author)]);
        let mut batch = WriteBatch::new();
        let id = PostId::new(self.ctx.next_id(EntityKind::Post, &mut batch)?);
        let post = Post {
            id,
            title: new.title.trim().to_string(),
            content_hash: new.content_hash,
            category: new.category,
            encrypted_body: new.encrypted_body,
            proof: new.proof,
            author: author.clone(),
            created_at: self.ctx.now(),
            tally: TallySheet::default(),
            comment_count: 0,
            is_encrypted: true,
            is_moderated: false,
        };
        let mut rep = load_or_zeroed(&self.ctx, author)?;
        rep.record(Contribution::Post, &self.ctx.params.reputation);

        stage_post(&mut batch, &post)?;
        stage_reputation(&mut batch, &rep)?;
        self.ctx.store.commit(batch)?;

        self.ctx.stats.increment(STAT_POSTS);
        tracing::info!(post_id = %id, author = %author, category = %post.category, "post created");
        Ok(id)
    }

    /// Reply to a post. The comment, the post's comment count and the author's
    /// comment count are written in one batch.
    pub fn add_comment(&self, author: &ActorId, new: NewComment) -> Result<CommentId, ForumError> {
        require_bytes("encrypted body", &new.encrypted_body)?;
        require_bytes("input proof", &new.proof)?;
        if !self.ctx.store.contains(Table::Posts, &keys::post(new.post_id))? {
            return Err(ForumError::NotFound(new.post_id.to_string()));
        }
        self.ctx.check_proof(&new.encrypted_body, &new.proof)?;

        let _locks = self.ctx.locks.acquire(&[
            LockKey::Sequence(EntityKind::Comment),
            LockKey::Post(new.post_id),
            LockKey::Actor(author),
        ]);
        let mut post = self.get(new.post_id)?;

        post.comment_count = post
            .comment_count
            .checked_add(1)
            .ok_or(ForumError::CounterSaturated {
                counter: "comment",
                ceiling: u32::MAX,
            })?;

        let mut batch = WriteBatch::new();
        let id = CommentId::new(self.ctx.next_id(EntityKind::Comment, &mut batch)?);
        let comment = Comment {
            id,
            post_id: new.post_id,
            author: author.clone(),
            content_hash: new.content_hash,
            encrypted_body: new.encrypted_body,
            proof: new.proof,
            created_at: self.ctx.now(),
        };
        let mut rep = load_or_zeroed(&self.ctx, author)?;
        rep.record(Contribution::Comment, &self.ctx.params.reputation);

        batch.put(
            Table::Comments,
            keys::comment(comment.post_id, id),
            codec::encode(&comment)?,
        );
        stage_post(&mut batch, &post)?;
        stage_reputation(&mut batch, &rep)?;
        self.ctx.store.commit(batch)?;

        self.ctx.stats.increment(STAT_COMMENTS);
        tracing::info!(comment_id = %id, post_id = %post.id, author = %author, "comment added");
        Ok(id)
    }

    /// Cast an encrypted up- or downvote on a post. One vote per actor per post.
    pub fn vote_on_post(&self, voter: &ActorId, post_id: PostId, ballot: Ballot) -> Result<(), ForumError> {
        validate_ballot(&ballot)?;

        let _locks = self.ctx.locks.acquire(&[LockKey::Post(post_id)]);
        let mut post = self.get(post_id)?;
        let mut batch = WriteBatch::new();
        self.tally.accumulate(
            voter,
            VoteTarget::Post(post_id),
            &ballot,
            &mut post.tally,
            CounterScope::PerDirection,
            &mut batch,
        )?;
        stage_post(&mut batch, &post)?;
        self.tally.commit_vote(batch)?;

        tracing::debug!(post_id = %post_id, voter = %voter, "post vote accepted");
        Ok(())
    }

    /// Set or clear the moderation flag. Requires moderator capability.
    pub fn moderate(&self, moderator: &ActorId, post_id: PostId, flag: bool) -> Result<(), ForumError> {
        let rep = load_or_zeroed(&self.ctx, moderator)?;
        if !rep.is_moderator {
            tracing::warn!(actor = %moderator, post_id = %post_id, "moderation denied");
            return Err(ForumError::PermissionDenied {
                actor: moderator.to_string(),
                action: "moderate posts",
            });
        }

        let _locks = self.ctx.locks.acquire(&[LockKey::Post(post_id)]);
        let mut post = self.get(post_id)?;
        if post.is_moderated == flag {
            return Ok(());
        }
        post.is_moderated = flag;
        let mut batch = WriteBatch::new();
        stage_post(&mut batch, &post)?;
        self.ctx.store.commit(batch)?;

        tracing::info!(post_id = %post_id, moderator = %moderator, flag, "post moderation updated");
        Ok(())
    }

    pub fn get(&self, post_id: PostId) -> Result<Post, ForumError> {
        self.ctx
            .load(Table::Posts, &keys::post(post_id))?
            .ok_or_else(|| ForumError::NotFound(post_id.to_string()))
    }

    /// Comments of a post, oldest first.
    pub fn comments(&self, post_id: PostId) -> Result<Vec<Comment>, ForumError> {
        if !self.ctx.store.contains(Table::Posts, &keys::post(post_id))? {
            return Err(ForumError::NotFound(post_id.to_string()));
        }
        self.ctx
            .store
            .scan_prefix(Table::Comments, &keys::comments_of(post_id))?
            .iter()
            .map(|(_, bytes)| codec::decode(bytes))
            .collect()
    }

    pub fn all(&self) -> Result<Vec<Post>, ForumError> {
        self.ctx.load_all(Table::Posts)
    }
}

fn stage_post(batch: &mut WriteBatch, post: &Post) -> Result<(), ForumError> {
    batch.put(Table::Posts, keys::post(post.id), codec::encode(post)?);
    Ok(())
}
