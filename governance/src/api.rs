//! The fixed call surface used by existing front-ends.
//!
//! Arguments arrive as raw strings, integers and byte strings, exactly as the
//! original contract interface takes them; this layer parses them into typed
//! requests and forwards to the ledgers. The caller (the transaction sender in
//! the original interface) is explicit on every write.

use std::sync::Arc;

use whisper_types::{ActorId, Category, ContentHash, PostId, ProposalId};

use crate::post::{NewComment, NewPost};
use crate::proposal::NewProposal;
use crate::query::{PostInfo, ProposalInfo, UserReputation};
use crate::tally::Ballot;
use crate::{Forum, ForumError};

#[derive(Clone)]
pub struct ForumApi {
    forum: Arc<Forum>,
}

impl ForumApi {
    pub fn new(forum: Arc<Forum>) -> Self {
        Self { forum }
    }

    pub fn forum(&self) -> &Forum {
        &self.forum
    }

    pub fn create_post(
        &self,
        caller: &str,
        title: &str,
        content_hash: &str,
        category: u64,
        encrypted_content: &[u8],
        input_proof: &[u8],
    ) -> Result<u64, ForumError> {
        let author = ActorId::parse(caller)?;
        let new = NewPost {
            title: title.to_string(),
            content_hash: ContentHash::new(content_hash)?,
            category: Category::from_code(category)?,
            encrypted_body: encrypted_content.to_vec(),
            proof: input_proof.to_vec(),
        };
        self.forum.posts().create_post(&author, new).map(|id| id.get())
    }

    pub fn add_comment(
        &self,
        caller: &str,
        post_id: u64,
        content_hash: &str,
        encrypted_content: &[u8],
        input_proof: &[u8],
    ) -> Result<u64, ForumError> {
        let author = ActorId::parse(caller)?;
        let new = NewComment {
            post_id: PostId::new(post_id),
            content_hash: ContentHash::new(content_hash)?,
            encrypted_body: encrypted_content.to_vec(),
            proof: input_proof.to_vec(),
        };
        self.forum.posts().add_comment(&author, new).map(|id| id.get())
    }

    pub fn vote_on_post(
        &self,
        caller: &str,
        post_id: u64,
        is_upvote: bool,
        vote_weight: &[u8],
        input_proof: &[u8],
    ) -> Result<(), ForumError> {
        let voter = ActorId::parse(caller)?;
        let ballot = Ballot::new(is_upvote, vote_weight.to_vec(), input_proof.to_vec());
        self.forum
            .posts()
            .vote_on_post(&voter, PostId::new(post_id), ballot)
    }

    // Mirrors the external interface argument for argument.
    #[allow(clippy::too_many_arguments)]
    pub fn create_proposal(
        &self,
        caller: &str,
        title: &str,
        description: &str,
        proposal_hash: &str,
        duration: u64,
        threshold: u64,
        encrypted_details: &[u8],
        input_proof: &[u8],
    ) -> Result<u64, ForumError> {
        let proposer = ActorId::parse(caller)?;
        let threshold = u32::try_from(threshold)
            .map_err(|_| ForumError::Validation(format!("threshold {threshold} out of range")))?;
        let new = NewProposal {
            title: title.to_string(),
            description: description.to_string(),
            proposal_hash: ContentHash::new(proposal_hash)?,
            duration_secs: duration,
            threshold,
            encrypted_details: encrypted_details.to_vec(),
            proof: input_proof.to_vec(),
        };
        self.forum
            .proposals()
            .create_proposal(&proposer, new)
            .map(|id| id.get())
    }

    pub fn vote_on_proposal(
        &self,
        caller: &str,
        proposal_id: u64,
        is_yes: bool,
        vote_weight: &[u8],
        input_proof: &[u8],
    ) -> Result<(), ForumError> {
        let voter = ActorId::parse(caller)?;
        let ballot = Ballot::new(is_yes, vote_weight.to_vec(), input_proof.to_vec());
        self.forum
            .proposals()
            .vote_on_proposal(&voter, ProposalId::new(proposal_id), ballot)
    }

    pub fn get_post_info(&self, post_id: u64) -> Result<PostInfo, ForumError> {
        self.forum.query().post_info(PostId::new(post_id))
    }

    pub fn get_proposal_info(&self, proposal_id: u64) -> Result<ProposalInfo, ForumError> {
        self.forum.query().proposal_info(ProposalId::new(proposal_id))
    }

    pub fn get_user_reputation(&self, user: &str) -> Result<UserReputation, ForumError> {
        let actor = ActorId::parse(user)?;
        self.forum.query().user_reputation(&actor)
    }
}
