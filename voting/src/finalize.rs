//! Finalization gate: the one-shot transition that locks a session's results.

use agora_types::{Height, OptionId, SessionId, Weight};
use serde::{Deserialize, Serialize};

use crate::options::OptionRegistry;
use crate::session::VotingSession;
use crate::VotingError;

/// Per-option line of a final tally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionTally {
    pub id: OptionId,
    pub text: String,
    pub votes: u64,
    pub weight: Weight,
}

/// Locked results of a finalized session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalResult {
    pub session_id: SessionId,
    pub total_votes: u64,
    pub total_weight: Weight,
    pub winner: Option<OptionId>,
    /// Whether the winner's weight share reaches the session's win threshold.
    pub threshold_met: bool,
    pub tally: Vec<OptionTally>,
    pub finalized_at: Height,
}

pub struct FinalizationGate;

impl FinalizationGate {
    /// Check that `session` can be finalized at `now`.
    ///
    /// Order: already finalized, still active, quorum, end height.
    pub fn check(session: &VotingSession, now: Height) -> Result<(), VotingError> {
        if session.finalized {
            return Err(VotingError::AlreadyFinalized);
        }
        if session.active {
            return Err(VotingError::SessionActive);
        }
        if !session.quorum_met() {
            return Err(VotingError::QuorumNotMet {
                have: session.total_votes,
                need: session.settings.quorum_threshold,
            });
        }
        if !session.has_ended_at(now) {
            return Err(VotingError::SessionActive);
        }
        Ok(())
    }

    /// Lock `session` and compute its winner.
    pub fn finalize(
        session: &mut VotingSession,
        options: &OptionRegistry,
        now: Height,
    ) -> Result<FinalResult, VotingError> {
        Self::check(session, now)?;

        let winner = options.leader();
        let winner_weight = winner
            .and_then(|id| options.get(id))
            .map(|option| option.weight)
            .unwrap_or(0);
        let threshold_met = meets_threshold(
            winner_weight,
            session.total_weight,
            session.settings.win_threshold_pct,
        );
        let tally = options
            .iter()
            .map(|option| OptionTally {
                id: option.id,
                text: option.text.clone(),
                votes: option.votes,
                weight: option.weight,
            })
            .collect();

        session.finalized = true;
        Ok(FinalResult {
            session_id: session.id,
            total_votes: session.total_votes,
            total_weight: session.total_weight,
            winner,
            threshold_met,
            tally,
            finalized_at: now,
        })
    }
}

/// `winner_weight / total_weight >= threshold_pct / 100`, in integers.
pub fn meets_threshold(winner_weight: Weight, total_weight: Weight, threshold_pct: u8) -> bool {
    if total_weight == 0 {
        return false;
    }
    winner_weight.saturating_mul(100) >= total_weight.saturating_mul(Weight::from(threshold_pct))
}
