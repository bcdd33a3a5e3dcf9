//! Striped per-entity write locks.
//!
//! Every mutation locks the entities it touches. Keys hash onto a fixed set of
//! stripes; a caller takes all of its stripes in one [`LockTable::acquire`] call,
//! which locks them in ascending index order, so two operations can never wait
//! on each other in a cycle. Operations never acquire a second lock set while
//! holding one.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

use whisper_types::{ActorId, DraftId, EntityKind, PostId, ProposalId};

#[derive(Clone, Copy, Debug, Hash)]
pub(crate) enum LockKey<'a> {
    /// Id allocation for one entity kind.
    Sequence(EntityKind),
    Post(PostId),
    Proposal(ProposalId),
    Draft(DraftId),
    Actor(&'a ActorId),
}

pub(crate) struct LockTable {
    stripes: Vec<Mutex<()>>,
}

/// Guards for every stripe of one operation; released on drop.
pub(crate) struct LockSet<'a> {
    _guards: Vec<MutexGuard<'a, ()>>,
}

impl LockTable {
    pub(crate) fn new(stripes: usize) -> Self {
        let stripes = (0..stripes.max(1)).map(|_| Mutex::new(())).collect();
        Self { stripes }
    }

    fn stripe_of(&self, key: &LockKey<'_>) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }

    pub(crate) fn acquire(&self, keys: &[LockKey<'_>]) -> LockSet<'_> {
        let mut indices: Vec<usize> = keys.iter().map(|k| self.stripe_of(k)).collect();
        indices.sort_unstable();
        indices.dedup();
        let guards = indices
            .into_iter()
            .map(|i| self.stripes[i].lock().unwrap_or_else(PoisonError::into_inner))
            .collect();
        LockSet { _guards: guards }
    }
}
