//! Round controller: advances a session to a new round when quorum is unmet.

use agora_types::{Height, OptionId, Weight};
use serde::{Deserialize, Serialize};

use crate::options::OptionRegistry;
use crate::session::VotingSession;
use crate::VotingError;

/// Snapshot of a closed round. Appended once, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u8,
    /// Leading option by raw votes, ties toward the lower id.
    pub leading_option: Option<OptionId>,
    pub total_votes: u64,
    pub total_weight: Weight,
    pub quorum_met: bool,
    pub closed_at: Height,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoundController {
    results: Vec<RoundResult>,
}

impl RoundController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `session` may move to its next round.
    ///
    /// Advancing is only allowed while the quorum is unmet and rounds remain.
    pub fn check_advance(session: &VotingSession) -> Result<(), VotingError> {
        if session.current_round >= session.settings.max_rounds {
            return Err(VotingError::RoundsExhausted(session.settings.max_rounds));
        }
        if session.quorum_met() {
            return Err(VotingError::QuorumReached(session.settings.quorum_threshold));
        }
        Ok(())
    }

    /// Close the current round and open the next one.
    ///
    /// Snapshots the closing round, then zeroes the session and per-option
    /// counters. Voter records stay stored under their round.
    pub fn advance(
        &mut self,
        session: &mut VotingSession,
        options: &mut OptionRegistry,
        now: Height,
    ) -> Result<RoundResult, VotingError> {
        Self::check_advance(session)?;

        let result = RoundResult {
            round: session.current_round,
            leading_option: options.leader(),
            total_votes: session.total_votes,
            total_weight: session.total_weight,
            quorum_met: false,
            closed_at: now,
        };
        self.results.push(result.clone());

        session.current_round += 1;
        session.total_votes = 0;
        session.total_weight = 0;
        options.reset_tallies();
        Ok(result)
    }

    pub fn results(&self) -> &[RoundResult] {
        &self.results
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}
