//! Voting sessions, their settings, and the history records they leave behind.

use agora_types::{Amount, Height, OptionId, SessionId, VotingFormat, Weight};
use serde::{Deserialize, Serialize};

use crate::VotingError;

/// Options that must be supplied when a session starts.
pub const MIN_INITIAL_OPTIONS: usize = 2;
pub const MAX_INITIAL_OPTIONS: usize = 5;
pub const MAX_ROUNDS: u8 = 10;
pub const MAX_WIN_THRESHOLD: u8 = 100;

/// Administrator-tunable settings of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub format: VotingFormat,
    /// Minimum total votes required before finalization. Zero disables the gate.
    pub quorum_threshold: u64,
    /// Share of the total weight (percent) the winner should reach.
    pub win_threshold_pct: u8,
    pub max_rounds: u8,
    pub allow_delegation: bool,
    pub allow_vote_changing: bool,
    pub require_minimum_balance: bool,
    pub minimum_balance: Amount,
    /// Fee charged per cast vote. Zero disables fee collection.
    pub fee: Amount,
}

impl Default for SessionSettings {
    /// Simple format, no quorum, 50% win threshold, a single round, no
    /// delegation, no vote changing, no balance gate, no fee.
    fn default() -> Self {
        Self {
            format: VotingFormat::Simple,
            quorum_threshold: 0,
            win_threshold_pct: 50,
            max_rounds: 1,
            allow_delegation: false,
            allow_vote_changing: false,
            require_minimum_balance: false,
            minimum_balance: Amount::ZERO,
            fee: Amount::ZERO,
        }
    }
}

impl SessionSettings {
    pub fn with_win_threshold(mut self, pct: u8) -> Self {
        self.win_threshold_pct = pct;
        self
    }

    pub fn validate(&self) -> Result<(), VotingError> {
        if self.win_threshold_pct > MAX_WIN_THRESHOLD {
            return Err(VotingError::InvalidConfig(format!(
                "win threshold {}% exceeds {MAX_WIN_THRESHOLD}%",
                self.win_threshold_pct
            )));
        }
        if self.max_rounds == 0 || self.max_rounds > MAX_ROUNDS {
            return Err(VotingError::InvalidConfig(format!(
                "max rounds must be within 1..={MAX_ROUNDS}, got {}",
                self.max_rounds
            )));
        }
        Ok(())
    }

    /// The balance gate, if one applies.
    pub fn minimum_balance(&self) -> Option<Amount> {
        self.require_minimum_balance.then_some(self.minimum_balance)
    }
}

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Open, and no ballot has been cast yet.
    Configuring,
    /// Accepting ballots.
    Open,
    /// Ended by the administrator; tally inspectable but not authoritative.
    Closed,
    /// Results locked. Terminal state.
    Finalized,
}

/// The current voting session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingSession {
    pub id: SessionId,
    pub question: String,
    pub start_height: Height,
    pub end_height: Height,
    pub active: bool,
    pub finalized: bool,
    pub settings: SessionSettings,
    /// 1-based round counter.
    pub current_round: u8,
    /// Votes counted in the current round.
    pub total_votes: u64,
    /// Weight counted in the current round.
    pub total_weight: Weight,
    /// Ballots accepted across all rounds of this session.
    pub ballots_cast: u64,
    pub fees_collected: Amount,
}

impl VotingSession {
    pub fn new(
        id: SessionId,
        question: String,
        start_height: Height,
        end_height: Height,
        settings: SessionSettings,
    ) -> Self {
        Self {
            id,
            question,
            start_height,
            end_height,
            active: true,
            finalized: false,
            settings,
            current_round: 1,
            total_votes: 0,
            total_weight: 0,
            ballots_cast: 0,
            fees_collected: Amount::ZERO,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.finalized, self.active) {
            (true, _) => SessionPhase::Finalized,
            (false, false) => SessionPhase::Closed,
            (false, true) if self.ballots_cast == 0 => SessionPhase::Configuring,
            (false, true) => SessionPhase::Open,
        }
    }

    /// Whether ballots are accepted at `now`.
    pub fn accepts_votes_at(&self, now: Height) -> bool {
        self.active && now < self.end_height
    }

    /// Whether the voting window has run out at `now`.
    pub fn has_ended_at(&self, now: Height) -> bool {
        now >= self.end_height
    }

    pub fn quorum_met(&self) -> bool {
        self.total_votes >= self.settings.quorum_threshold
    }

    /// History record of this session as it stands now.
    pub fn record(&self, winner: Option<OptionId>) -> SessionRecord {
        SessionRecord {
            id: self.id,
            question: self.question.clone(),
            start_height: self.start_height,
            end_height: self.end_height,
            total_votes: self.total_votes,
            total_weight: self.total_weight,
            ballots_cast: self.ballots_cast,
            winner,
            finalized: self.finalized,
        }
    }
}

/// Retained summary of a session, kept after the next session starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub question: String,
    pub start_height: Height,
    pub end_height: Height,
    pub total_votes: u64,
    pub total_weight: Weight,
    pub ballots_cast: u64,
    pub winner: Option<OptionId>,
    pub finalized: bool,
}
