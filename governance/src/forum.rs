//! Composition root wiring the ledgers to their shared capabilities.

use std::collections::BTreeMap;
use std::sync::Arc;

use whisper_proof::{EncryptedTally, ProofVerifier};
use whisper_store::LedgerStore;
use whisper_types::Clock;

use crate::context::LedgerContext;
use crate::draft::DraftBook;
use crate::identity::IdentityResolver;
use crate::post::PostLedger;
use crate::proposal::ProposalLedger;
use crate::query::QueryFacade;
use crate::tally::TallyAccumulator;
use crate::LedgerParams;

/// The governance ledger: posts, proposals, drafts, reputation and queries over
/// one store.
pub struct Forum {
    ctx: Arc<LedgerContext>,
    identity: IdentityResolver,
    posts: Arc<PostLedger>,
    proposals: Arc<ProposalLedger>,
    drafts: DraftBook,
    query: QueryFacade,
    tally: Arc<TallyAccumulator>,
}

impl Forum {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        verifier: Arc<dyn ProofVerifier>,
        scheme: Arc<dyn EncryptedTally>,
        clock: Arc<dyn Clock>,
        params: LedgerParams,
    ) -> Self {
        let ctx = Arc::new(LedgerContext::new(store, verifier, clock, params));
        let tally = Arc::new(TallyAccumulator::new(Arc::clone(&ctx), scheme));
        let posts = Arc::new(PostLedger::new(Arc::clone(&ctx), Arc::clone(&tally)));
        let proposals = Arc::new(ProposalLedger::new(Arc::clone(&ctx), Arc::clone(&tally)));
        let drafts = DraftBook::new(Arc::clone(&ctx), Arc::clone(&proposals));
        let query = QueryFacade::new(Arc::clone(&ctx), Arc::clone(&posts), Arc::clone(&proposals));
        tracing::info!(
            verifier = ctx.verifier.name(),
            tally = tally.scheme_name(),
            counter_ceiling = ctx.params.counter_ceiling,
            "governance ledger ready"
        );
        Self {
            identity: IdentityResolver::new(Arc::clone(&ctx)),
            ctx,
            posts,
            proposals,
            drafts,
            query,
            tally,
        }
    }

    pub fn identity(&self) -> &IdentityResolver {
        &self.identity
    }

    pub fn posts(&self) -> &PostLedger {
        &self.posts
    }

    pub fn proposals(&self) -> &ProposalLedger {
        &self.proposals
    }

    pub fn drafts(&self) -> &DraftBook {
        &self.drafts
    }

    pub fn query(&self) -> &QueryFacade {
        &self.query
    }

    pub fn tally(&self) -> &TallyAccumulator {
        &self.tally
    }

    pub fn params(&self) -> &LedgerParams {
        &self.ctx.params
    }

    /// Operation counters since start-up.
    pub fn op_stats(&self) -> BTreeMap<&'static str, u64> {
        self.ctx.stats.snapshot()
    }
}
