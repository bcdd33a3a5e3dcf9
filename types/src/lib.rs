//! Fundamental types for the Whisper governance ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! entity identifiers, actor references, post categories, content hashes and timestamps.

pub mod actor;
pub mod category;
pub mod content;
pub mod error;
pub mod ids;
pub mod time;

pub use actor::ActorId;
pub use category::Category;
pub use content::ContentHash;
pub use error::TypesError;
pub use ids::{CommentId, DraftId, EntityKind, PostId, ProposalId};
pub use time::{Clock, SystemClock, Timestamp};
