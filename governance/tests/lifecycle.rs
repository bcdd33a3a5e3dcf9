mod common;

use common::{actor, Harness, GENESIS, HASH, HOUR};
use whisper_governance::{DraftFields, ForumError, LedgerParams, ProposalStatus};
use whisper_nullables::VerifierMode;
use whisper_types::{Category, ContentHash, PostId, ProposalId};

// ── Posts and comments ──────────────────────────────────────────────────

#[test]
fn post_ids_start_at_one_and_increase() {
    let h = Harness::new();
    assert_eq!(h.post("0xalice", "First"), 1);
    assert_eq!(h.post("0xbob", "Second"), 2);
    assert_eq!(h.post("0xalice", "Third"), 3);

    let info = h.api.get_post_info(2).unwrap();
    assert_eq!(info.title, "Second");
    assert_eq!(info.author, actor("0xbob"));
    assert_eq!(info.timestamp.as_secs(), GENESIS);
    assert_eq!(info.category, 1);
    assert!(info.is_encrypted);
    assert!(!info.is_moderated);
}

#[test]
fn post_creation_rewards_the_author() {
    let h = Harness::new();
    h.post("0xalice", "Hello");
    let rep = h.api.get_user_reputation("0xalice").unwrap();
    assert_eq!(rep.post_count, 1);
    assert_eq!(rep.reputation, 2);
}

#[test]
fn invalid_post_input_is_rejected() {
    let h = Harness::new();
    let err = h
        .api
        .create_post("0xalice", "Hello", HASH, 0, b"c", b"p")
        .unwrap_err();
    assert!(matches!(err, ForumError::Validation(_)));

    let err = h
        .api
        .create_post("0xalice", "   ", HASH, 1, b"c", b"p")
        .unwrap_err();
    assert!(matches!(err, ForumError::Validation(_)));

    let err = h.api.create_post("", "Hello", HASH, 1, b"c", b"p").unwrap_err();
    assert!(matches!(err, ForumError::Validation(_)));
    assert_eq!(h.store.commit_count(), 0);
}

#[test]
fn comment_updates_post_and_author_together() {
    let h = Harness::new();
    let post_id = h.post("0xalice", "Thread");
    let first = h
        .api
        .add_comment("0xbob", post_id, HASH, b"reply", b"proof")
        .unwrap();
    let second = h
        .api
        .add_comment("0xbob", post_id, HASH, b"reply", b"proof")
        .unwrap();
    assert_eq!((first, second), (1, 2));

    assert_eq!(h.api.get_post_info(post_id).unwrap().comment_count, 2);
    let rep = h.api.get_user_reputation("0xbob").unwrap();
    assert_eq!(rep.comment_count, 2);
    assert_eq!(rep.reputation, 2);

    let comments = h.forum.query().comments(PostId::new(post_id)).unwrap();
    assert_eq!(comments.len(), 2);
    assert!(comments.iter().all(|c| c.author == actor("0xbob")));
}

#[test]
fn comment_on_missing_post_changes_nothing() {
    let h = Harness::new();
    let err = h
        .api
        .add_comment("0xbob", 42, HASH, b"reply", b"proof")
        .unwrap_err();
    assert!(matches!(err, ForumError::NotFound(_)));
    assert_eq!(h.api.get_user_reputation("0xbob").unwrap().comment_count, 0);
    assert_eq!(h.store.commit_count(), 0);
}

#[test]
fn failed_commit_leaves_no_partial_comment() {
    let h = Harness::new();
    let post_id = h.post("0xalice", "Thread");
    h.store.fail_next_commit();
    let err = h
        .api
        .add_comment("0xbob", post_id, HASH, b"reply", b"proof")
        .unwrap_err();
    assert!(matches!(err, ForumError::Store(_)));

    assert_eq!(h.api.get_post_info(post_id).unwrap().comment_count, 0);
    assert_eq!(h.api.get_user_reputation("0xbob").unwrap().comment_count, 0);
    // The id sequence bump was part of the failed batch.
    let id = h
        .api
        .add_comment("0xbob", post_id, HASH, b"reply", b"proof")
        .unwrap();
    assert_eq!(id, 1);
}

// ── Proofs ──────────────────────────────────────────────────────────────

#[test]
fn rejected_proof_blocks_creation() {
    let h = Harness::new();
    h.verifier.reject_proof(b"forged");
    let err = h
        .api
        .create_post("0xalice", "Hello", HASH, 1, b"c", b"forged")
        .unwrap_err();
    assert!(matches!(err, ForumError::InvalidProof));
    assert!(matches!(
        h.api.get_post_info(1).unwrap_err(),
        ForumError::NotFound(_)
    ));
    assert_eq!(h.forum.op_stats()["proofs_rejected"], 1);
}

#[test]
fn unavailable_verifier_fails_closed() {
    let h = Harness::new();
    let post_id = h.post("0xalice", "Hello");
    h.verifier.set_mode(VerifierMode::Unavailable);

    let err = h
        .api
        .vote_on_post("0xbob", post_id, true, b"w", b"proof")
        .unwrap_err();
    assert_eq!(err.code(), "verifier_unavailable");
    assert_eq!(h.api.get_post_info(post_id).unwrap().upvotes, 0);

    // Nothing was recorded, so the same voter may retry once the verifier is back.
    h.verifier.set_mode(VerifierMode::AcceptAll);
    h.api
        .vote_on_post("0xbob", post_id, true, b"w", b"proof")
        .unwrap();
    assert_eq!(h.api.get_post_info(post_id).unwrap().upvotes, 1);
}

// ── Post votes ──────────────────────────────────────────────────────────

#[test]
fn second_vote_on_a_post_is_a_duplicate() {
    let h = Harness::new();
    let post_id = h.post("0xalice", "Hello");
    h.api
        .vote_on_post("0xbob", post_id, true, b"w", b"proof")
        .unwrap();
    let err = h
        .api
        .vote_on_post("0xbob", post_id, false, b"w", b"proof")
        .unwrap_err();
    assert!(matches!(err, ForumError::DuplicateVote { .. }));

    let info = h.api.get_post_info(post_id).unwrap();
    assert_eq!((info.upvotes, info.downvotes), (1, 0));
}

#[test]
fn vote_on_missing_post_is_not_found() {
    let h = Harness::new();
    let err = h
        .api
        .vote_on_post("0xbob", 7, true, b"w", b"proof")
        .unwrap_err();
    assert!(matches!(err, ForumError::NotFound(_)));
}

#[test]
fn post_counters_saturate_per_direction() {
    let h = Harness::new();
    let post_id = h.post("0xalice", "Popular");
    for i in 0..255 {
        h.api
            .vote_on_post(&format!("0xfan{i}"), post_id, true, b"w", b"proof")
            .unwrap();
    }
    let err = h
        .api
        .vote_on_post("0xlate", post_id, true, b"w", b"proof")
        .unwrap_err();
    assert!(matches!(
        err,
        ForumError::CounterSaturated { ceiling: 255, .. }
    ));

    // Downvotes have their own counter.
    h.api
        .vote_on_post("0xcritic", post_id, false, b"w", b"proof")
        .unwrap();
    let info = h.api.get_post_info(post_id).unwrap();
    assert_eq!((info.upvotes, info.downvotes), (255, 1));
}

#[test]
fn failed_vote_commit_is_counted_as_rejected() {
    let h = Harness::new();
    let post_id = h.post("0xalice", "Hello");
    h.store.fail_next_commit();

    let err = h
        .api
        .vote_on_post("0xbob", post_id, true, b"w", b"proof")
        .unwrap_err();
    assert!(matches!(err, ForumError::Store(_)));
    assert_eq!(h.api.get_post_info(post_id).unwrap().upvotes, 0);
    let stats = h.forum.op_stats();
    assert_eq!(stats["votes_accepted"], 0);
    assert_eq!(stats["votes_rejected"], 1);

    // The participation record was rolled back with the counter.
    h.api
        .vote_on_post("0xbob", post_id, true, b"w", b"proof")
        .unwrap();
    assert_eq!(h.api.get_post_info(post_id).unwrap().upvotes, 1);
    assert_eq!(h.forum.op_stats()["votes_accepted"], 1);
}

// ── Moderation and privileges ───────────────────────────────────────────

#[test]
fn moderation_requires_moderator_rights() {
    let h = Harness::with_params(LedgerParams {
        admins: vec![actor("0xadmin")],
        ..LedgerParams::default()
    });
    let post_id = PostId::new(h.post("0xalice", "Spam?"));
    let mallory = actor("0xmallory");

    let err = h.forum.posts().moderate(&mallory, post_id, true).unwrap_err();
    assert!(matches!(err, ForumError::PermissionDenied { .. }));

    let err = h
        .forum
        .identity()
        .grant_moderator(&mallory, &mallory)
        .unwrap_err();
    assert!(matches!(err, ForumError::PermissionDenied { .. }));

    let carol = actor("0xcarol");
    let rep = h
        .forum
        .identity()
        .grant_moderator(&actor("0xadmin"), &carol)
        .unwrap();
    assert!(rep.is_moderator);
    h.forum.posts().moderate(&carol, post_id, true).unwrap();
    assert!(h.api.get_post_info(post_id.get()).unwrap().is_moderated);

    // Moderated posts still accept votes.
    h.api
        .vote_on_post("0xbob", post_id.get(), false, b"w", b"proof")
        .unwrap();
}

#[test]
fn admins_verify_accounts() {
    let h = Harness::with_params(LedgerParams {
        admins: vec![actor("0xadmin")],
        ..LedgerParams::default()
    });
    assert!(!h.api.get_user_reputation("0xalice").unwrap().is_verified);
    h.forum
        .identity()
        .verify(&actor("0xadmin"), &actor("0xalice"))
        .unwrap();
    assert!(h.api.get_user_reputation("0xalice").unwrap().is_verified);
}

#[test]
fn ensure_creates_once_and_keeps_earned_counters() {
    let h = Harness::new();
    let alice = actor("0xalice");
    assert!(h.forum.identity().lookup(&alice).unwrap().is_none());

    let fresh = h.forum.identity().ensure(&alice).unwrap();
    assert_eq!(fresh.reputation_score, 0);
    assert_eq!(fresh.post_count, 0);
    assert_eq!(fresh.first_seen.as_secs(), GENESIS);
    assert_eq!(h.forum.identity().lookup(&alice).unwrap(), Some(fresh.clone()));

    h.clock.advance(HOUR);
    h.post("0xalice", "Hello");
    let again = h.forum.identity().ensure(&alice).unwrap();
    assert_eq!(again.post_count, 1);
    assert_eq!(again.reputation_score, 2);
    assert_eq!(again.first_seen, fresh.first_seen);
}

#[test]
fn unknown_actor_reads_as_zeroed() {
    let h = Harness::new();
    let rep = h.api.get_user_reputation("0xnobody").unwrap();
    assert_eq!(rep.reputation, 0);
    assert_eq!(rep.post_count + rep.comment_count + rep.proposal_count, 0);
    assert!(h.forum.identity().lookup(&actor("0xnobody")).unwrap().is_none());
}

// ── Proposals ───────────────────────────────────────────────────────────

#[test]
fn proposal_starts_active_with_deadline() {
    let h = Harness::new();
    let id = h.proposal("0xalice", 7 * 24 * HOUR, 100);
    let info = h.api.get_proposal_info(id).unwrap();
    assert!(info.is_active);
    assert!(!info.is_passed);
    assert_eq!(info.start_time.as_secs(), GENESIS);
    assert_eq!(info.end_time.as_secs(), GENESIS + 7 * 24 * HOUR);
    assert_eq!(info.total_votes, 0);

    let rep = h.api.get_user_reputation("0xalice").unwrap();
    assert_eq!((rep.proposal_count, rep.reputation), (1, 3));
}

#[test]
fn invalid_proposal_input_is_rejected() {
    let h = Harness::new();
    let err = h
        .api
        .create_proposal("0xalice", "T", "D", HASH, 0, 10, b"d", b"p")
        .unwrap_err();
    assert!(matches!(err, ForumError::Validation(_)));

    let err = h
        .api
        .create_proposal("0xalice", "T", "D", HASH, HOUR, u64::MAX, b"d", b"p")
        .unwrap_err();
    assert!(matches!(err, ForumError::Validation(_)));
}

#[test]
fn proposal_with_quorum_and_supermajority_passes() {
    let h = Harness::with_ceiling(1_000);
    let id = h.proposal("0xalice", HOUR, 300);
    h.cast(id, 456, 89);

    let info = h.api.get_proposal_info(id).unwrap();
    assert!(info.is_active, "nothing is decided before the deadline");
    assert_eq!(info.total_votes, 545);

    h.clock.advance(HOUR);
    let info = h.api.get_proposal_info(id).unwrap();
    assert!(!info.is_active);
    assert!(info.is_passed);
    assert_eq!(info.status, ProposalStatus::Passed);
    assert_eq!((info.yes_votes, info.no_votes), (456, 89));
}

#[test]
fn proposal_short_of_quorum_is_rejected() {
    let h = Harness::with_ceiling(1_000);
    let id = h.proposal("0xalice", HOUR, 300);
    h.cast(id, 234, 45);

    h.clock.advance(HOUR + 1);
    let info = h.api.get_proposal_info(id).unwrap();
    assert!(!info.is_active);
    assert!(!info.is_passed);
    assert_eq!(info.status, ProposalStatus::Rejected);
    assert_eq!(info.total_votes, 279);
}

#[test]
fn failed_proposal_vote_commit_is_counted_as_rejected() {
    let h = Harness::new();
    let id = h.proposal("0xalice", HOUR, 1);
    h.store.fail_next_commit();
    assert!(h
        .api
        .vote_on_proposal("0xbob", id, true, b"w", b"proof")
        .is_err());
    assert_eq!(h.api.get_proposal_info(id).unwrap().total_votes, 0);
    assert_eq!(h.forum.op_stats()["votes_accepted"], 0);
    assert_eq!(h.forum.op_stats()["votes_rejected"], 1);
}

#[test]
fn proposal_total_votes_saturate() {
    let h = Harness::with_ceiling(3);
    let id = h.proposal("0xalice", HOUR, 2);
    h.cast(id, 2, 1);
    let err = h
        .api
        .vote_on_proposal("0xlate", id, true, b"w", b"proof")
        .unwrap_err();
    assert!(matches!(err, ForumError::CounterSaturated { ceiling: 3, .. }));
    assert_eq!(h.api.get_proposal_info(id).unwrap().total_votes, 3);
}

#[test]
fn proposal_duplicate_vote_is_rejected() {
    let h = Harness::new();
    let id = h.proposal("0xalice", HOUR, 1);
    h.api
        .vote_on_proposal("0xbob", id, true, b"w", b"proof")
        .unwrap();
    let err = h
        .api
        .vote_on_proposal("0xbob", id, true, b"w", b"proof")
        .unwrap_err();
    assert!(matches!(err, ForumError::DuplicateVote { .. }));
    assert_eq!(h.api.get_proposal_info(id).unwrap().yes_votes, 1);
}

#[test]
fn vote_after_deadline_closes_the_proposal() {
    let h = Harness::new();
    let id = h.proposal("0xalice", HOUR, 1);
    h.cast(id, 1, 0);
    h.clock.advance(HOUR);

    let err = h
        .api
        .vote_on_proposal("0xbob", id, true, b"w", b"proof")
        .unwrap_err();
    assert!(matches!(err, ForumError::ProposalClosed(p) if p == ProposalId::new(id)));

    let stored = h.forum.proposals().get(ProposalId::new(id)).unwrap();
    assert_eq!(stored.status, ProposalStatus::Passed);
    assert_eq!(stored.finalized_at.map(|t| t.as_secs()), Some(GENESIS + HOUR));
}

#[test]
fn finalization_is_idempotent() {
    let h = Harness::new();
    let id = ProposalId::new(h.proposal("0xalice", HOUR, 1));
    assert_eq!(h.forum.proposals().finalize(id).unwrap(), ProposalStatus::Active);

    h.clock.advance(2 * HOUR);
    assert_eq!(h.forum.proposals().finalize(id).unwrap(), ProposalStatus::Rejected);
    h.clock.advance(HOUR);
    assert_eq!(h.forum.proposals().finalize(id).unwrap(), ProposalStatus::Rejected);
    assert_eq!(h.forum.op_stats()["proposals_finalized"], 1);
}

#[test]
fn finalize_due_sweeps_only_expired_proposals() {
    let h = Harness::new();
    h.proposal("0xalice", 10, 1);
    h.proposal("0xalice", 100, 1);
    h.clock.advance(50);

    assert_eq!(h.forum.proposals().finalize_due().unwrap(), 1);
    assert_eq!(h.forum.proposals().finalize_due().unwrap(), 0);
    assert!(h.api.get_proposal_info(2).unwrap().is_active);
}

#[test]
fn missing_proposal_is_not_found() {
    let h = Harness::new();
    assert!(matches!(
        h.api.get_proposal_info(9).unwrap_err(),
        ForumError::NotFound(_)
    ));
    assert!(matches!(
        h.api
            .vote_on_proposal("0xbob", 9, true, b"w", b"proof")
            .unwrap_err(),
        ForumError::NotFound(_)
    ));
}

// ── Drafts ──────────────────────────────────────────────────────────────

fn draft_fields() -> DraftFields {
    DraftFields {
        title: "Fund the audit".into(),
        description: "Third-party review of the tally path.".into(),
        proposal_hash: ContentHash::new(HASH).unwrap(),
        duration_secs: HOUR,
        threshold: 10,
    }
}

#[test]
fn submitted_draft_becomes_an_active_proposal() {
    let h = Harness::new();
    let alice = actor("0xalice");
    let draft_id = h.forum.drafts().save_draft(&alice, draft_fields()).unwrap();
    assert_eq!(h.forum.drafts().list_drafts(&alice).unwrap().len(), 1);

    let proposal_id = h
        .forum
        .drafts()
        .submit_draft(&alice, draft_id, b"details".to_vec(), b"proof".to_vec())
        .unwrap();
    let info = h.api.get_proposal_info(proposal_id.get()).unwrap();
    assert_eq!(info.title, "Fund the audit");
    assert!(info.is_active);
    assert!(h.forum.drafts().list_drafts(&alice).unwrap().is_empty());
    assert_eq!(h.api.get_user_reputation("0xalice").unwrap().proposal_count, 1);
}

#[test]
fn drafts_belong_to_their_author() {
    let h = Harness::new();
    let alice = actor("0xalice");
    let draft_id = h.forum.drafts().save_draft(&alice, draft_fields()).unwrap();

    let err = h
        .forum
        .drafts()
        .discard_draft(&actor("0xbob"), draft_id)
        .unwrap_err();
    assert!(matches!(err, ForumError::PermissionDenied { .. }));
    assert!(h.forum.drafts().list_drafts(&actor("0xbob")).unwrap().is_empty());

    h.forum.drafts().discard_draft(&alice, draft_id).unwrap();
    assert!(matches!(
        h.forum.drafts().discard_draft(&alice, draft_id).unwrap_err(),
        ForumError::NotFound(_)
    ));
}

#[test]
fn draft_needs_a_voting_window() {
    let h = Harness::new();
    let alice = actor("0xalice");
    let err = h
        .forum
        .drafts()
        .save_draft(
            &alice,
            DraftFields {
                duration_secs: 0,
                ..draft_fields()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ForumError::Validation(_)));
    assert!(h.forum.drafts().list_drafts(&alice).unwrap().is_empty());
}

#[test]
fn draft_with_rejected_proof_stays_a_draft() {
    let h = Harness::new();
    let alice = actor("0xalice");
    let draft_id = h.forum.drafts().save_draft(&alice, draft_fields()).unwrap();
    h.verifier.set_mode(VerifierMode::RejectAll);

    let err = h
        .forum
        .drafts()
        .submit_draft(&alice, draft_id, b"details".to_vec(), b"proof".to_vec())
        .unwrap_err();
    assert!(matches!(err, ForumError::InvalidProof));
    assert_eq!(h.forum.drafts().list_drafts(&alice).unwrap().len(), 1);
    assert!(h.forum.proposals().all().unwrap().is_empty());
}

// ── Queries ─────────────────────────────────────────────────────────────

#[test]
fn stats_summarize_the_forum() {
    let h = Harness::new();
    h.post("0xalice", "One");
    h.api
        .create_post("0xbob", "Two", HASH, 2, b"c", b"p")
        .unwrap();
    h.api.add_comment("0xcarol", 1, HASH, b"c", b"p").unwrap();
    h.api.vote_on_post("0xdave", 1, true, b"w", b"p").unwrap();
    let expired = h.proposal("0xalice", 10, 0);
    h.proposal("0xalice", HOUR, 5);
    h.clock.advance(20);

    let stats = h.forum.query().stats().unwrap();
    assert_eq!(stats.posts, 2);
    assert_eq!(stats.posts_by_category["governance"], 1);
    assert_eq!(stats.posts_by_category["technical"], 1);
    assert_eq!(stats.posts_by_category["community"], 0);
    assert_eq!(stats.comments, 1);
    assert_eq!(stats.members, 3);
    assert_eq!(stats.votes_cast, 1);
    assert_eq!(stats.proposals_active, 1);
    assert_eq!(stats.proposals_rejected, 1);

    // Listing reflects the deadline without writing.
    let listed = h.forum.query().list_proposals().unwrap();
    assert_eq!(listed[0].status, ProposalStatus::Rejected);
    let stored = h.forum.proposals().get(ProposalId::new(expired)).unwrap();
    assert_eq!(stored.status, ProposalStatus::Active);
}

#[test]
fn posts_filter_by_category() {
    let h = Harness::new();
    h.post("0xalice", "Governance thread");
    h.api
        .create_post("0xalice", "Community thread", HASH, 3, b"c", b"p")
        .unwrap();
    let community = h.forum.query().list_posts(Some(Category::Community)).unwrap();
    assert_eq!(community.len(), 1);
    assert_eq!(community[0].title, "Community thread");
    assert_eq!(h.forum.query().list_posts(None).unwrap().len(), 2);
}

#[test]
fn post_info_serializes_camel_case() {
    let h = Harness::new();
    let id = h.post("0xalice", "Hello");
    let json = serde_json::to_value(h.api.get_post_info(id).unwrap()).unwrap();
    assert_eq!(json["commentCount"], 0);
    assert_eq!(json["isEncrypted"], true);
    assert_eq!(json["contentHash"], HASH);
}
