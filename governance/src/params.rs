//! Tunable ledger parameters.
//!
//! Loaded from the `[ledger]` table of the daemon configuration; every field has
//! a default so an empty table is valid.

use serde::{Deserialize, Serialize};
use whisper_types::ActorId;

/// Largest value of the confidential 8-bit counters.
pub const DEFAULT_COUNTER_CEILING: u32 = 255;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerParams {
    /// Upper bound of every vote counter. Exceeding it fails with `CounterSaturated`.
    pub counter_ceiling: u32,
    /// Actors allowed to grant moderator rights and mark accounts verified.
    pub admins: Vec<ActorId>,
    pub reputation: ReputationWeights,
    /// Maximum title length in characters.
    pub max_title_len: usize,
    /// Number of lock stripes guarding per-entity writes.
    pub lock_stripes: usize,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            counter_ceiling: DEFAULT_COUNTER_CEILING,
            admins: Vec::new(),
            reputation: ReputationWeights::default(),
            max_title_len: 200,
            lock_stripes: 64,
        }
    }
}

/// Reputation score awarded per successful contribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationWeights {
    pub post: u32,
    pub comment: u32,
    pub proposal: u32,
}

impl Default for ReputationWeights {
    fn default() -> Self {
        Self {
            post: 2,
            comment: 1,
            proposal: 3,
        }
    }
}
