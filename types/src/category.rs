//! Post categories and their stable wire codes.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of discussion categories.
///
/// The numeric codes are part of the external interface and must never change:
/// 1 = Governance, 2 = Technical, 3 = Community, 4 = Proposals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Governance,
    Technical,
    Community,
    Proposals,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Governance,
        Category::Technical,
        Category::Community,
        Category::Proposals,
    ];

    /// Wire code used by existing callers.
    pub fn code(&self) -> u64 {
        match self {
            Self::Governance => 1,
            Self::Technical => 2,
            Self::Community => 3,
            Self::Proposals => 4,
        }
    }

    pub fn from_code(code: u64) -> Result<Self, TypesError> {
        match code {
            1 => Ok(Self::Governance),
            2 => Ok(Self::Technical),
            3 => Ok(Self::Community),
            4 => Ok(Self::Proposals),
            other => Err(TypesError::InvalidCategory(other)),
        }
    }

    /// Human-readable name of this category.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Governance => "governance",
            Self::Technical => "technical",
            Self::Community => "community",
            Self::Proposals => "proposals",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
