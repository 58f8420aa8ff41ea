//! Tally engine: records cast ballots and keeps per-option and session totals.
//!
//! Casting is split in two: [`TallyEngine::prepare`] runs every check that can
//! fail, [`TallyEngine::commit`] applies the ballot and cannot fail. The engine
//! charges the voting fee between the two, so a rejected ballot never costs a
//! fee and a charged fee always produces a counted ballot.

use agora_types::{Address, Height, OptionId, SessionId, VotingFormat, Weight};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::config::VoteChangePolicy;
use crate::options::OptionRegistry;
use crate::session::VotingSession;
use crate::VotingError;

/// Maximum length of a ranking list.
pub const MAX_RANKING: usize = 10;

/// A voter's ballot in one round of one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub voter: Address,
    pub session_id: SessionId,
    pub option_id: OptionId,
    pub weight: Weight,
    pub round: u8,
    pub height: Height,
    /// Ordered preferences; only present in the ranked format.
    pub ranking: Option<Vec<OptionId>>,
}

/// What a successful cast applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub option_id: OptionId,
    pub weight: Weight,
    pub round: u8,
}

/// Participation of one voter across all sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterHistory {
    pub votes_cast: u64,
    pub last_session: Option<SessionId>,
    pub last_height: Option<Height>,
}

/// A ballot that passed every check and is ready to be applied.
#[derive(Debug)]
pub struct PreparedBallot {
    record: VoterRecord,
    /// Earlier same-round ballot whose contribution is withdrawn first.
    replaced: Option<VoterRecord>,
}

type RecordKey = (SessionId, u8, Address);

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TallyEngine {
    records: HashMap<RecordKey, VoterRecord>,
    history: HashMap<Address, VoterHistory>,
    total_ballots: u64,
}

impl TallyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// `AlreadyVoted` when `voter` already has a ballot in the session's current
    /// round and vote changing is off.
    pub fn check_repeat(&self, session: &VotingSession, voter: &Address) -> Result<(), VotingError> {
        let prior = self.record(session.id, session.current_round, voter);
        if prior.is_some() && !session.settings.allow_vote_changing {
            return Err(VotingError::AlreadyVoted(voter.clone()));
        }
        Ok(())
    }

    /// Validate `record` against the session and the option registry.
    ///
    /// A ballot is a duplicate only against a record from the same round;
    /// records from earlier rounds never block a new vote.
    pub fn prepare(
        &self,
        session: &VotingSession,
        options: &OptionRegistry,
        record: VoterRecord,
        policy: VoteChangePolicy,
    ) -> Result<PreparedBallot, VotingError> {
        let prior = self.record(record.session_id, record.round, &record.voter);
        let replaced = match (prior, session.settings.allow_vote_changing, policy) {
            (None, _, _) => None,
            (Some(_), false, _) => return Err(VotingError::AlreadyVoted(record.voter.clone())),
            (Some(_), true, VoteChangePolicy::Accumulate) => None,
            (Some(prior), true, VoteChangePolicy::Replace) => Some(prior.clone()),
        };

        options.check_credit(record.option_id, record.weight)?;
        session
            .total_votes
            .checked_add(1)
            .and(session.total_weight.checked_add(record.weight))
            .and(session.ballots_cast.checked_add(1))
            .and(self.total_ballots.checked_add(1))
            .ok_or(VotingError::Overflow)?;

        Ok(PreparedBallot { record, replaced })
    }

    /// Apply a prepared ballot to the option registry and session totals.
    pub fn commit(
        &mut self,
        session: &mut VotingSession,
        options: &mut OptionRegistry,
        ballot: PreparedBallot,
    ) -> VoteReceipt {
        let PreparedBallot { record, replaced } = ballot;

        if let Some(prior) = replaced {
            options.debit(prior.option_id, prior.weight);
            session.total_votes = session.total_votes.saturating_sub(1);
            session.total_weight = session.total_weight.saturating_sub(prior.weight);
        }

        options.credit(record.option_id, record.weight);
        session.total_votes += 1;
        session.total_weight += record.weight;
        session.ballots_cast += 1;
        self.total_ballots += 1;

        let history = self.history.entry(record.voter.clone()).or_default();
        history.votes_cast += 1;
        history.last_session = Some(record.session_id);
        history.last_height = Some(record.height);

        let receipt = VoteReceipt {
            option_id: record.option_id,
            weight: record.weight,
            round: record.round,
        };
        self.records.insert(
            (record.session_id, record.round, record.voter.clone()),
            record,
        );
        receipt
    }

    /// The ballot `voter` cast in `round` of `session`.
    pub fn record(&self, session: SessionId, round: u8, voter: &Address) -> Option<&VoterRecord> {
        self.records.get(&(session, round, voter.clone()))
    }

    /// The most recent ballot `voter` cast in `session`, searching back from
    /// `current_round`.
    pub fn latest_record(
        &self,
        session: SessionId,
        current_round: u8,
        voter: &Address,
    ) -> Option<&VoterRecord> {
        (1..=current_round)
            .rev()
            .find_map(|round| self.record(session, round, voter))
    }

    pub fn history(&self, voter: &Address) -> VoterHistory {
        self.history.get(voter).cloned().unwrap_or_default()
    }

    /// Ballots accepted across every session.
    pub fn total_ballots(&self) -> u64 {
        self.total_ballots
    }

    /// Drop every ballot record. Participation history and the ballot
    /// counter are kept.
    pub fn clear_records(&mut self) {
        self.records.clear();
    }
}

/// Decide what ranking, if any, is stored with a ballot.
///
/// Rankings are kept only in the ranked format. The length bound always
/// applies; with `validate` set, every entry must name a distinct active option.
pub fn admit_ranking(
    format: VotingFormat,
    ranking: Option<Vec<OptionId>>,
    options: &OptionRegistry,
    validate: bool,
) -> Result<Option<Vec<OptionId>>, VotingError> {
    let ranking = match (format.accepts_rankings(), ranking) {
        (true, Some(ranking)) => ranking,
        (true, None) | (false, _) => return Ok(None),
    };
    if ranking.len() > MAX_RANKING {
        return Err(VotingError::CapacityExceeded {
            capacity: MAX_RANKING,
        });
    }
    if validate {
        let mut seen = BTreeSet::new();
        for &id in &ranking {
            options.active(id)?;
            if !seen.insert(id) {
                return Err(VotingError::InvalidOption(id));
            }
        }
    }
    Ok(Some(ranking))
}
