//! Read-only views over the voting core.

use agora_ledger::Ledger;
use agora_types::{Address, Amount, Clock, Height, OptionId, SessionId, VotingFormat, Weight};
use serde::{Deserialize, Serialize};

use crate::delegation::DelegationEdge;
use crate::engine::{effective_weight, VotingCore};
use crate::options::{BallotOption, MAX_OPTIONS};
use crate::rounds::{RoundController, RoundResult};
use crate::session::{SessionPhase, SessionRecord, SessionSettings, VotingSession};
use crate::tally::{VoterHistory, VoterRecord};
use crate::VotingError;

/// Snapshot of the current session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub id: SessionId,
    pub question: String,
    pub phase: SessionPhase,
    pub format: VotingFormat,
    pub start_height: Height,
    pub end_height: Height,
    /// Blocks left before ballots stop being accepted; zero once passed.
    pub blocks_remaining: u64,
    pub current_round: u8,
    pub max_rounds: u8,
    pub total_votes: u64,
    pub total_weight: Weight,
    pub ballots_cast: u64,
    pub quorum_threshold: u64,
    pub quorum_met: bool,
    pub option_count: usize,
    pub fees_collected: Amount,
    /// Every configured parameter, including the ones summarized above.
    pub settings: SessionSettings,
}

/// Both sides of an address's delegation state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationInfo {
    pub address: Address,
    /// Outgoing edge, if the address delegates.
    pub delegates_to: Option<DelegationEdge>,
    /// Weight delegated to the address.
    pub received_weight: Weight,
    pub delegators: Vec<Address>,
}

/// Results laid out in fixed slots; slot `i` holds option `i + 1`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedResults {
    pub session_id: SessionId,
    pub slots: [Option<BallotOption>; MAX_OPTIONS],
    pub total_votes: u64,
    pub total_weight: Weight,
    pub leader: Option<OptionId>,
    pub finalized: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analytics {
    pub session_count: u64,
    pub finalized_count: u64,
    pub total_ballots: u64,
    /// Ballots per session, rounded down.
    pub average_participation: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    pub current_round: u8,
    pub max_rounds: u8,
    pub closed_rounds: Vec<RoundResult>,
    /// Whether `process_next_round` would currently succeed.
    pub can_advance: bool,
}

impl<L: Ledger, C: Clock> VotingCore<L, C> {
    pub fn session_status(&self) -> Result<SessionStatus, VotingError> {
        let session = self.current_session()?;
        let now = self.clock().height();
        Ok(SessionStatus {
            id: session.id,
            question: session.question.clone(),
            phase: session.phase(),
            format: session.settings.format,
            start_height: session.start_height,
            end_height: session.end_height,
            blocks_remaining: now.blocks_until(session.end_height),
            current_round: session.current_round,
            max_rounds: session.settings.max_rounds,
            total_votes: session.total_votes,
            total_weight: session.total_weight,
            ballots_cast: session.ballots_cast,
            quorum_threshold: session.settings.quorum_threshold,
            quorum_met: session.quorum_met(),
            option_count: self.state.options.len(),
            fees_collected: session.fees_collected,
            settings: session.settings.clone(),
        })
    }

    pub fn option(&self, id: OptionId) -> Option<&BallotOption> {
        self.state.options.get(id)
    }

    /// `voter`'s latest ballot in the current session.
    pub fn voter_record(&self, voter: &Address) -> Option<&VoterRecord> {
        let session = self.state.session.as_ref()?;
        self.state
            .tally
            .latest_record(session.id, session.current_round, voter)
    }

    pub fn delegation_info(&self, address: &Address) -> DelegationInfo {
        let delegations = &self.state.delegations;
        DelegationInfo {
            address: address.clone(),
            delegates_to: delegations.edge(address).cloned(),
            received_weight: delegations.received(address),
            delegators: delegations
                .delegators_of(address)
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    pub fn voter_history(&self, voter: &Address) -> VoterHistory {
        self.state.tally.history(voter)
    }

    pub fn detailed_results(&self) -> Result<DetailedResults, VotingError> {
        let session = self.current_session()?;
        let options = &self.state.options;
        let slots = std::array::from_fn(|slot| {
            OptionId::try_from(slot + 1)
                .ok()
                .and_then(|id| options.get(id))
                .cloned()
        });
        Ok(DetailedResults {
            session_id: session.id,
            slots,
            total_votes: session.total_votes,
            total_weight: session.total_weight,
            leader: options.leader(),
            finalized: session.finalized,
        })
    }

    pub fn analytics(&self) -> Analytics {
        let history = &self.state.history;
        let session_count = history.len() as u64;
        let finalized_count = history.values().filter(|r| r.finalized).count() as u64;
        let total_ballots = self.state.tally.total_ballots();
        Analytics {
            session_count,
            finalized_count,
            total_ballots,
            average_participation: total_ballots.checked_div(session_count).unwrap_or(0),
        }
    }

    pub fn round_info(&self) -> Result<RoundInfo, VotingError> {
        let session = self.current_session()?;
        Ok(RoundInfo {
            current_round: session.current_round,
            max_rounds: session.settings.max_rounds,
            closed_rounds: self.state.rounds.results().to_vec(),
            can_advance: session.active && RoundController::check_advance(session).is_ok(),
        })
    }

    /// Option with the most votes this round, ties toward the lower id.
    pub fn current_leader(&self) -> Option<OptionId> {
        self.state.options.leader()
    }

    pub fn is_eligible(&self, voter: &Address) -> bool {
        let minimum = self
            .state
            .session
            .as_ref()
            .and_then(|s| s.settings.minimum_balance());
        self.state
            .eligibility
            .is_eligible(voter, minimum, || self.ledger().balance_of(voter))
    }

    /// Own weight under the current format plus weight delegated to `voter`.
    pub fn effective_weight(&self, voter: &Address) -> Weight {
        let format = self
            .state
            .session
            .as_ref()
            .map(|s| s.settings.format)
            .unwrap_or_default();
        effective_weight(&self.state.weights, &self.state.delegations, voter, format)
    }

    pub fn session_record(&self, id: SessionId) -> Result<&SessionRecord, VotingError> {
        self.state
            .history
            .get(&id)
            .ok_or_else(|| VotingError::NotFound(format!("session {id}")))
    }

    fn current_session(&self) -> Result<&VotingSession, VotingError> {
        self.state
            .session
            .as_ref()
            .ok_or_else(|| VotingError::NotFound("session".to_string()))
    }
}
