#![allow(dead_code)]

use std::sync::Arc;

use whisper_governance::{Forum, ForumApi, LedgerParams};
use whisper_nullables::{NullClock, NullStore, NullVerifier};
use whisper_proof::HashChainTally;
use whisper_types::ActorId;

pub const GENESIS: u64 = 1_700_000_000;
pub const HOUR: u64 = 3_600;
pub const HASH: &str = "bafkreigh2akiscaildc";

pub struct Harness {
    pub forum: Arc<Forum>,
    pub api: ForumApi,
    pub store: Arc<NullStore>,
    pub verifier: Arc<NullVerifier>,
    pub clock: Arc<NullClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_params(LedgerParams::default())
    }

    pub fn with_ceiling(counter_ceiling: u32) -> Self {
        Self::with_params(LedgerParams {
            counter_ceiling,
            ..LedgerParams::default()
        })
    }

    pub fn with_params(params: LedgerParams) -> Self {
        let store = Arc::new(NullStore::new());
        let verifier = Arc::new(NullVerifier::accept_all());
        let clock = Arc::new(NullClock::new(GENESIS));
        let forum = Arc::new(Forum::new(
            store.clone(),
            verifier.clone(),
            Arc::new(HashChainTally),
            clock.clone(),
            params,
        ));
        Self {
            api: ForumApi::new(forum.clone()),
            forum,
            store,
            verifier,
            clock,
        }
    }

    pub fn post(&self, caller: &str, title: &str) -> u64 {
        self.api
            .create_post(caller, title, HASH, 1, b"ciphertext", b"proof")
            .unwrap()
    }

    pub fn proposal(&self, caller: &str, duration: u64, threshold: u64) -> u64 {
        self.api
            .create_proposal(
                caller,
                "Raise the treasury cap",
                "Doubles the monthly cap.",
                HASH,
                duration,
                threshold,
                b"details",
                b"proof",
            )
            .unwrap()
    }

    /// Cast `yes` yes votes and `no` no votes from distinct voters.
    pub fn cast(&self, proposal_id: u64, yes: u32, no: u32) {
        for i in 0..yes {
            self.api
                .vote_on_proposal(&format!("0xyes{i}"), proposal_id, true, b"w", b"proof")
                .unwrap();
        }
        for i in 0..no {
            self.api
                .vote_on_proposal(&format!("0xno{i}"), proposal_id, false, b"w", b"proof")
                .unwrap();
        }
    }
}

pub fn actor(name: &str) -> ActorId {
    ActorId::parse(name).unwrap()
}
