//! Logical tables of the ledger.

/// One logical table. Backends map each to a separate keyspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    Posts,
    /// Keyed by `post id || comment id` so a post's comments are contiguous.
    Comments,
    Proposals,
    Reputations,
    /// Participation records keyed by `target || voter`.
    Votes,
    Drafts,
    /// Id sequences and other bookkeeping.
    Meta,
    /// Content-addressed blobs (see [`crate::ContentStore`]).
    Content,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::Posts,
        Table::Comments,
        Table::Proposals,
        Table::Reputations,
        Table::Votes,
        Table::Drafts,
        Table::Meta,
        Table::Content,
    ];

    /// Stable name, used as the LMDB database name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Comments => "comments",
            Self::Proposals => "proposals",
            Self::Reputations => "reputations",
            Self::Votes => "votes",
            Self::Drafts => "drafts",
            Self::Meta => "meta",
            Self::Content => "content",
        }
    }
}
