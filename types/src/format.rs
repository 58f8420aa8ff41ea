//! Ballot formats supported by a voting session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a cast vote is weighed and what it may carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingFormat {
    /// One voter, one vote (plus any delegated weight).
    #[default]
    Simple,
    /// Voters carry an explicit administrator-assigned weight.
    Weighted,
    /// A label for delegation-focused sessions. Counts exactly like `Simple`;
    /// delegated weight applies in every format.
    Delegated,
    /// Voters may attach an ordered preference list to their ballot.
    Ranked,
}

impl VotingFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Weighted => "weighted",
            Self::Delegated => "delegated",
            Self::Ranked => "ranked",
        }
    }

    /// Whether explicit per-voter weights apply in this format.
    pub fn uses_explicit_weights(&self) -> bool {
        matches!(self, Self::Weighted)
    }

    /// Whether ballots in this format carry a ranking list.
    pub fn accepts_rankings(&self) -> bool {
        matches!(self, Self::Ranked)
    }
}

impl fmt::Display for VotingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
