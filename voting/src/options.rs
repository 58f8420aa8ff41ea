//! Option registry: the bounded set of ballot options of the current session.

use agora_types::{OptionId, Weight};
use serde::{Deserialize, Serialize};

use crate::VotingError;

/// Maximum number of options a session can hold.
pub const MAX_OPTIONS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotOption {
    pub id: OptionId,
    pub text: String,
    /// Votes counted in the current round.
    pub votes: u64,
    /// Weight counted in the current round.
    pub weight: Weight,
    pub active: bool,
}

/// Options are numbered 1..=MAX_OPTIONS in registration order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OptionRegistry {
    options: Vec<BallotOption>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an option and return its id.
    pub fn register(&mut self, text: &str) -> Result<OptionId, VotingError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VotingError::InvalidConfig(
                "option text must not be empty".to_string(),
            ));
        }
        if self.options.len() >= MAX_OPTIONS {
            return Err(VotingError::CapacityExceeded {
                capacity: MAX_OPTIONS,
            });
        }
        let id = (self.options.len() + 1) as OptionId;
        self.options.push(BallotOption {
            id,
            text: text.to_string(),
            votes: 0,
            weight: 0,
            active: true,
        });
        Ok(id)
    }

    pub fn get(&self, id: OptionId) -> Option<&BallotOption> {
        let index = usize::from(id).checked_sub(1)?;
        self.options.get(index)
    }

    fn get_mut(&mut self, id: OptionId) -> Option<&mut BallotOption> {
        let index = usize::from(id).checked_sub(1)?;
        self.options.get_mut(index)
    }

    /// The option with `id`, provided it exists and is active.
    pub fn active(&self, id: OptionId) -> Result<&BallotOption, VotingError> {
        self.get(id)
            .filter(|option| option.active)
            .ok_or(VotingError::InvalidOption(id))
    }

    /// Check that crediting one vote of `weight` to `id` cannot overflow.
    pub fn check_credit(&self, id: OptionId, weight: Weight) -> Result<(), VotingError> {
        let option = self.active(id)?;
        option.votes.checked_add(1).ok_or(VotingError::Overflow)?;
        option.weight.checked_add(weight).ok_or(VotingError::Overflow)?;
        Ok(())
    }

    /// Add one vote of `weight` to option `id`.
    ///
    /// Callers validate with [`OptionRegistry::check_credit`] first; an unknown
    /// id is ignored here.
    pub fn credit(&mut self, id: OptionId, weight: Weight) {
        if let Some(option) = self.get_mut(id) {
            option.votes = option.votes.saturating_add(1);
            option.weight = option.weight.saturating_add(weight);
        }
    }

    /// Remove one vote of `weight` from option `id`.
    pub fn debit(&mut self, id: OptionId, weight: Weight) {
        if let Some(option) = self.get_mut(id) {
            option.votes = option.votes.saturating_sub(1);
            option.weight = option.weight.saturating_sub(weight);
        }
    }

    /// Zero every option's per-round counters.
    pub fn reset_tallies(&mut self) {
        for option in &mut self.options {
            option.votes = 0;
            option.weight = 0;
        }
    }

    /// The active option with the most raw votes, ties broken toward the lower
    /// id. `None` while no votes have been counted.
    pub fn leader(&self) -> Option<OptionId> {
        self.options
            .iter()
            .filter(|option| option.active && option.votes > 0)
            .fold(None::<&BallotOption>, |best, option| match best {
                Some(best) if best.votes >= option.votes => Some(best),
                _ => Some(option),
            })
            .map(|option| option.id)
    }

    pub fn total_votes(&self) -> u64 {
        self.options.iter().map(|option| option.votes).sum()
    }

    pub fn total_weight(&self) -> Weight {
        self.options.iter().map(|option| option.weight).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BallotOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
