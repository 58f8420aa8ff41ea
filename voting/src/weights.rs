//! Explicit per-voter weights for the weighted format.

use agora_types::{Address, VotingFormat, Weight};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weight of a voter with no explicit record, and of every voter outside the
/// weighted format.
pub const DEFAULT_WEIGHT: Weight = 1;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VoterWeights {
    explicit: HashMap<Address, Weight>,
}

impl VoterWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, voter: &Address, weight: Weight) {
        self.explicit.insert(voter.clone(), weight);
    }

    pub fn explicit(&self, voter: &Address) -> Option<Weight> {
        self.explicit.get(voter).copied()
    }

    /// The voter's own weight under `format`.
    pub fn own_weight(&self, voter: &Address, format: VotingFormat) -> Weight {
        match (format.uses_explicit_weights(), self.explicit(voter)) {
            (true, Some(weight)) => weight,
            (true, None) | (false, _) => DEFAULT_WEIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_weight_only_applies_to_weighted_format() {
        let mut weights = VoterWeights::new();
        let voter = Address::new("agora_v1");
        weights.set(&voter, 5);
        assert_eq!(weights.own_weight(&voter, VotingFormat::Weighted), 5);
        assert_eq!(weights.own_weight(&voter, VotingFormat::Simple), 1);
        assert_eq!(weights.own_weight(&voter, VotingFormat::Ranked), 1);
    }

    #[test]
    fn default_weight_is_one() {
        let weights = VoterWeights::new();
        let voter = Address::new("agora_v2");
        assert_eq!(weights.own_weight(&voter, VotingFormat::Weighted), DEFAULT_WEIGHT);
    }
}
