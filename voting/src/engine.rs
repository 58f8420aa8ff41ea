//! Voting core: the owned aggregate behind every voting operation.
//!
//! Every operation checks all of its preconditions before writing anything,
//! so a failed call leaves the aggregate exactly as it was. The clock is read
//! at most once per operation.

use agora_ledger::Ledger;
use agora_types::{Address, Amount, Clock, OptionId, SessionId, VotingFormat, Weight};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::VotingConfig;
use crate::delegation::DelegationGraph;
use crate::eligibility::Eligibility;
use crate::finalize::{FinalResult, FinalizationGate};
use crate::options::OptionRegistry;
use crate::rounds::{RoundController, RoundResult};
use crate::session::{
    SessionRecord, SessionSettings, VotingSession, MAX_INITIAL_OPTIONS, MIN_INITIAL_OPTIONS,
};
use crate::tally::{admit_ranking, TallyEngine, VoteReceipt, VoterRecord};
use crate::weights::VoterWeights;
use crate::VotingError;

/// Maximum number of addresses in one batch authorization.
pub const MAX_BATCH: usize = 50;

/// Everything the core owns. Serialized as a whole by the snapshot module.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct CoreState {
    pub(crate) session: Option<VotingSession>,
    pub(crate) last_session_id: SessionId,
    pub(crate) options: OptionRegistry,
    pub(crate) delegations: DelegationGraph,
    pub(crate) eligibility: Eligibility,
    pub(crate) weights: VoterWeights,
    pub(crate) tally: TallyEngine,
    pub(crate) rounds: RoundController,
    pub(crate) history: BTreeMap<SessionId, SessionRecord>,
    pub(crate) fee_balance: Amount,
}

/// The voting aggregate: one current session plus contract-wide records.
pub struct VotingCore<L, C> {
    config: VotingConfig,
    ledger: L,
    clock: C,
    pub(crate) state: CoreState,
}

impl<L: Ledger, C: Clock> VotingCore<L, C> {
    pub fn new(config: VotingConfig, ledger: L, clock: C) -> Result<Self, VotingError> {
        Self::with_state(config, ledger, clock, CoreState::default())
    }

    pub(crate) fn with_state(
        config: VotingConfig,
        ledger: L,
        clock: C,
        state: CoreState,
    ) -> Result<Self, VotingError> {
        config.validate()?;
        Ok(Self {
            config,
            ledger,
            clock,
            state,
        })
    }

    pub fn config(&self) -> &VotingConfig {
        &self.config
    }

    pub fn admin(&self) -> &Address {
        &self.config.admin
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn ensure_admin(&self, caller: &Address, operation: &'static str) -> Result<(), VotingError> {
        if caller == &self.config.admin {
            return Ok(());
        }
        warn!(%caller, operation, "rejected administrator call");
        Err(VotingError::Unauthorized(caller.clone()))
    }

    // ── Session lifecycle ──────────────────────────────────────────────

    /// Open a new session lasting `duration` blocks with 2 to 5 initial options.
    ///
    /// Clears the option registry, delegation edges, ballot records and round
    /// history of the previous session; its history record is kept.
    pub fn start_session<S: AsRef<str>>(
        &mut self,
        caller: &Address,
        question: &str,
        duration: u64,
        options: &[S],
    ) -> Result<SessionId, VotingError> {
        self.ensure_admin(caller, "start_session")?;
        if self.state.session.as_ref().is_some_and(|s| s.active) {
            return Err(VotingError::SessionActive);
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(VotingError::InvalidConfig(
                "question must not be empty".to_string(),
            ));
        }
        if duration == 0 {
            return Err(VotingError::InvalidConfig(
                "duration must be at least one block".to_string(),
            ));
        }
        if options.len() < MIN_INITIAL_OPTIONS {
            return Err(VotingError::InvalidConfig(format!(
                "at least {MIN_INITIAL_OPTIONS} options are required, got {}",
                options.len()
            )));
        }
        if options.len() > MAX_INITIAL_OPTIONS {
            return Err(VotingError::CapacityExceeded {
                capacity: MAX_INITIAL_OPTIONS,
            });
        }
        let mut registry = OptionRegistry::new();
        options
            .iter()
            .try_for_each(|text| registry.register(text.as_ref()).map(|_| ()))?;
        let id = self
            .state
            .last_session_id
            .checked_add(1)
            .ok_or(VotingError::Overflow)?;

        let now = self.clock.height();
        let settings =
            SessionSettings::default().with_win_threshold(self.config.default_win_threshold);
        let session = VotingSession::new(
            id,
            question.to_string(),
            now,
            now.saturating_add(duration),
            settings,
        );
        info!(
            session_id = id,
            end_height = %session.end_height,
            options = registry.len(),
            "voting session started"
        );

        self.state.history.insert(id, session.record(None));
        self.state.session = Some(session);
        self.state.options = registry;
        self.state.delegations.clear();
        self.state.rounds.clear();
        self.state.tally.clear_records();
        self.state.last_session_id = id;
        Ok(id)
    }

    /// Append an option to the open session (at most 10 in total).
    pub fn add_option(&mut self, caller: &Address, text: &str) -> Result<OptionId, VotingError> {
        self.ensure_admin(caller, "add_option")?;
        let session = self
            .state
            .session
            .as_ref()
            .filter(|s| s.active)
            .ok_or(VotingError::SessionNotActive)?;
        let id = self.state.options.register(text)?;
        debug!(session_id = session.id, option_id = id, "option added");
        Ok(id)
    }

    /// Replace the open session's settings.
    pub fn configure(
        &mut self,
        caller: &Address,
        settings: SessionSettings,
    ) -> Result<(), VotingError> {
        self.ensure_admin(caller, "configure")?;
        settings.validate()?;
        let session = self
            .state
            .session
            .as_mut()
            .filter(|s| s.active)
            .ok_or(VotingError::SessionNotActive)?;
        if settings.max_rounds < session.current_round {
            return Err(VotingError::InvalidConfig(format!(
                "max rounds {} is below the current round {}",
                settings.max_rounds, session.current_round
            )));
        }
        let format_changed = settings.format != session.settings.format;
        let delegation_disabled = session.settings.allow_delegation && !settings.allow_delegation;
        if !self.state.delegations.is_empty() && (format_changed || delegation_disabled) {
            return Err(VotingError::InvalidConfig(format!(
                "{} delegations must be revoked before changing the format or disabling delegation",
                self.state.delegations.len()
            )));
        }
        info!(
            session_id = session.id,
            format = %settings.format,
            quorum = settings.quorum_threshold,
            max_rounds = settings.max_rounds,
            fee = %settings.fee,
            "session configured"
        );
        session.settings = settings;
        Ok(())
    }

    /// Stop accepting ballots without finalizing.
    pub fn end_session(&mut self, caller: &Address) -> Result<(), VotingError> {
        self.ensure_admin(caller, "end_session")?;
        let state = &mut self.state;
        let session = state
            .session
            .as_mut()
            .filter(|s| s.active)
            .ok_or(VotingError::SessionNotActive)?;
        session.active = false;
        state.history.insert(session.id, session.record(None));
        info!(
            session_id = session.id,
            total_votes = session.total_votes,
            "voting session ended"
        );
        Ok(())
    }

    /// Lock the ended session's results and record its winner.
    pub fn finalize(&mut self, caller: &Address) -> Result<FinalResult, VotingError> {
        self.ensure_admin(caller, "finalize")?;
        let now = self.clock.height();
        let state = &mut self.state;
        let session = state
            .session
            .as_mut()
            .ok_or_else(|| VotingError::NotFound("session".to_string()))?;
        let result = FinalizationGate::finalize(session, &state.options, now)?;
        state.history.insert(session.id, session.record(result.winner));
        info!(
            session_id = session.id,
            winner = ?result.winner,
            total_votes = result.total_votes,
            threshold_met = result.threshold_met,
            "session finalized"
        );
        Ok(result)
    }

    /// Close the current round and open the next one (quorum unmet only).
    pub fn process_next_round(&mut self, caller: &Address) -> Result<RoundResult, VotingError> {
        self.ensure_admin(caller, "process_next_round")?;
        let now = self.clock.height();
        let state = &mut self.state;
        let session = state
            .session
            .as_mut()
            .filter(|s| s.active)
            .ok_or(VotingError::SessionNotActive)?;
        let result = state.rounds.advance(session, &mut state.options, now)?;
        info!(
            session_id = session.id,
            closed_round = result.round,
            round = session.current_round,
            leading_option = ?result.leading_option,
            "round advanced"
        );
        Ok(result)
    }

    // ── Voters ─────────────────────────────────────────────────────────

    /// Set an explicit weight for `voter` (weighted format only).
    pub fn set_voter_weight(
        &mut self,
        caller: &Address,
        voter: &Address,
        weight: Weight,
    ) -> Result<(), VotingError> {
        self.ensure_admin(caller, "set_voter_weight")?;
        let session = self
            .state
            .session
            .as_ref()
            .filter(|s| s.active)
            .ok_or(VotingError::SessionNotActive)?;
        if session.settings.format != VotingFormat::Weighted {
            return Err(VotingError::InvalidConfig(format!(
                "voter weights apply to the weighted format, session is {}",
                session.settings.format
            )));
        }
        if weight == 0 {
            return Err(VotingError::InvalidConfig(
                "voter weight must be at least 1".to_string(),
            ));
        }
        ensure_valid_address(voter)?;
        self.state.weights.set(voter, weight);
        debug!(%voter, weight, "voter weight set");
        Ok(())
    }

    pub fn authorize(&mut self, caller: &Address, voter: &Address) -> Result<(), VotingError> {
        self.ensure_admin(caller, "authorize")?;
        ensure_valid_address(voter)?;
        self.state.eligibility.authorize(voter);
        debug!(%voter, "voter authorized");
        Ok(())
    }

    pub fn revoke_authorization(
        &mut self,
        caller: &Address,
        voter: &Address,
    ) -> Result<(), VotingError> {
        self.ensure_admin(caller, "revoke_authorization")?;
        ensure_valid_address(voter)?;
        self.state.eligibility.revoke(voter);
        debug!(%voter, "voter authorization revoked");
        Ok(())
    }

    /// Authorize up to 50 voters at once. Any malformed entry rejects the
    /// whole batch.
    pub fn authorize_batch(
        &mut self,
        caller: &Address,
        voters: &[Address],
    ) -> Result<usize, VotingError> {
        self.ensure_admin(caller, "authorize_batch")?;
        if voters.len() > MAX_BATCH {
            return Err(VotingError::CapacityExceeded {
                capacity: MAX_BATCH,
            });
        }
        let count = voters.iter().try_fold(0usize, |count, voter| {
            ensure_valid_address(voter).map(|()| count + 1)
        })?;
        for voter in voters {
            self.state.eligibility.authorize(voter);
        }
        info!(count, "voters authorized");
        Ok(count)
    }

    // ── Ballots ────────────────────────────────────────────────────────

    /// Cast `voter`'s ballot for `option_id`, charging the session fee first.
    pub fn cast_vote(
        &mut self,
        voter: &Address,
        option_id: OptionId,
        ranking: Option<Vec<OptionId>>,
    ) -> Result<VoteReceipt, VotingError> {
        let now = self.clock.height();
        let ledger = &self.ledger;
        let config = &self.config;
        let state = &mut self.state;

        let session = state
            .session
            .as_mut()
            .ok_or(VotingError::SessionNotActive)?;
        if !session.accepts_votes_at(now) {
            return Err(VotingError::VotingEnded);
        }
        let minimum = session.settings.minimum_balance();
        if !state
            .eligibility
            .is_eligible(voter, minimum, || ledger.balance_of(voter))
        {
            return Err(VotingError::Unauthorized(voter.clone()));
        }
        state.options.active(option_id)?;
        state.tally.check_repeat(session, voter)?;

        let format = session.settings.format;
        let ranking = admit_ranking(format, ranking, &state.options, config.validate_rankings)?;
        let weight = effective_weight(&state.weights, &state.delegations, voter, format);
        let record = VoterRecord {
            voter: voter.clone(),
            session_id: session.id,
            option_id,
            weight,
            round: session.current_round,
            height: now,
            ranking,
        };
        let ballot = state
            .tally
            .prepare(session, &state.options, record, config.vote_change_policy)?;

        let fee = session.settings.fee;
        let fees_collected = session
            .fees_collected
            .checked_add(fee)
            .ok_or(VotingError::Overflow)?;
        let fee_balance = state
            .fee_balance
            .checked_add(fee)
            .ok_or(VotingError::Overflow)?;
        if !fee.is_zero() {
            ledger.charge(voter, fee)?;
        }

        session.fees_collected = fees_collected;
        state.fee_balance = fee_balance;
        let receipt = state.tally.commit(session, &mut state.options, ballot);
        debug!(
            session_id = session.id,
            %voter,
            option_id,
            weight,
            round = receipt.round,
            "vote cast"
        );
        Ok(receipt)
    }

    // ── Delegation ─────────────────────────────────────────────────────

    /// Delegate `delegator`'s own weight to `delegate` for this session.
    pub fn delegate(&mut self, delegator: &Address, delegate: &Address) -> Result<(), VotingError> {
        let now = self.clock.height();
        let ledger = &self.ledger;
        let state = &mut self.state;

        let session = state
            .session
            .as_ref()
            .ok_or(VotingError::SessionNotActive)?;
        if !session.settings.allow_delegation {
            return Err(VotingError::DelegationNotAllowed);
        }
        if !session.active {
            return Err(VotingError::SessionNotActive);
        }
        if delegator == delegate {
            return Err(VotingError::SelfDelegation);
        }
        let minimum = session.settings.minimum_balance();
        if !state
            .eligibility
            .is_eligible(delegate, minimum, || ledger.balance_of(delegate))
        {
            return Err(VotingError::Ineligible(delegate.clone()));
        }
        let weight = state.weights.own_weight(delegator, session.settings.format);
        state.delegations.delegate(delegator, delegate, weight, now)?;
        debug!(
            session_id = session.id,
            %delegator,
            %delegate,
            weight,
            "weight delegated"
        );
        Ok(())
    }

    /// Remove `delegator`'s edge and return the weight it had added.
    pub fn revoke_delegation(&mut self, delegator: &Address) -> Result<Weight, VotingError> {
        let state = &mut self.state;
        let session = state
            .session
            .as_ref()
            .filter(|s| s.active)
            .ok_or(VotingError::SessionNotActive)?;
        let edge = state.delegations.revoke(delegator)?;
        debug!(
            session_id = session.id,
            %delegator,
            delegate = %edge.delegate,
            weight = edge.weight,
            "delegation revoked"
        );
        Ok(edge.weight)
    }

    // ── Fees ───────────────────────────────────────────────────────────

    /// Pay every collected fee out to the administrator.
    pub fn withdraw_fees(&mut self, caller: &Address) -> Result<Amount, VotingError> {
        self.ensure_admin(caller, "withdraw_fees")?;
        let amount = self.state.fee_balance;
        if amount.is_zero() {
            return Err(VotingError::NotFound("fee balance".to_string()));
        }
        self.ledger.pay_out(&self.config.admin, amount)?;
        self.state.fee_balance = Amount::ZERO;
        info!(%amount, "fees withdrawn");
        Ok(amount)
    }
}

/// Own weight under `format` plus weight delegated to `voter`.
pub(crate) fn effective_weight(
    weights: &VoterWeights,
    delegations: &DelegationGraph,
    voter: &Address,
    format: VotingFormat,
) -> Weight {
    weights
        .own_weight(voter, format)
        .saturating_add(delegations.received(voter))
}

fn ensure_valid_address(address: &Address) -> Result<(), VotingError> {
    if address.is_valid() {
        Ok(())
    } else {
        Err(VotingError::InvalidConfig(format!(
            "malformed address {:?}",
            address.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_nullables::{NullClock, NullLedger};

    fn admin() -> Address {
        Address::new("agora_admin")
    }

    fn wallet(name: &str) -> Address {
        Address::new(format!("agora_{name}"))
    }

    fn core<'a>(
        ledger: &'a NullLedger,
        clock: &'a NullClock,
    ) -> VotingCore<&'a NullLedger, &'a NullClock> {
        VotingCore::new(VotingConfig::new(admin()), ledger, clock).unwrap()
    }

    fn started<'a>(
        ledger: &'a NullLedger,
        clock: &'a NullClock,
    ) -> VotingCore<&'a NullLedger, &'a NullClock> {
        let mut core = core(ledger, clock);
        core.start_session(&admin(), "Colour?", 100, &["Red", "Blue"])
            .unwrap();
        core
    }

    #[test]
    fn only_admin_starts_sessions() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(1));
        let mut core = core(&ledger, &clock);
        let err = core
            .start_session(&wallet("mallory"), "Colour?", 100, &["Red", "Blue"])
            .unwrap_err();
        assert!(matches!(err, VotingError::Unauthorized(_)));
        assert!(core.state.session.is_none());
    }

    #[test]
    fn start_session_applies_safe_defaults() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(10));
        let core = started(&ledger, &clock);
        let session = core.state.session.as_ref().unwrap();
        assert_eq!(session.id, 1);
        assert_eq!(session.start_height.as_u64(), 10);
        assert_eq!(session.end_height.as_u64(), 110);
        assert_eq!(session.settings, SessionSettings::default());
        assert_eq!(core.state.options.len(), 2);
    }

    #[test]
    fn start_session_validates_options() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(1));
        let mut core = core(&ledger, &clock);
        assert!(matches!(
            core.start_session(&admin(), "Q", 10, &["only"]),
            Err(VotingError::InvalidConfig(_))
        ));
        assert!(matches!(
            core.start_session(&admin(), "Q", 10, &["a", "b", "c", "d", "e", "f"]),
            Err(VotingError::CapacityExceeded { capacity: MAX_INITIAL_OPTIONS })
        ));
        assert!(matches!(
            core.start_session(&admin(), "Q", 10, &["a", ""]),
            Err(VotingError::InvalidConfig(_))
        ));
        assert!(matches!(
            core.start_session(&admin(), "Q", 0, &["a", "b"]),
            Err(VotingError::InvalidConfig(_))
        ));
        assert!(core.state.session.is_none());
        assert_eq!(core.state.last_session_id, 0);
    }

    #[test]
    fn second_start_while_open_is_rejected() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(1));
        let mut core = started(&ledger, &clock);
        assert!(matches!(
            core.start_session(&admin(), "Again?", 10, &["Yes", "No"]),
            Err(VotingError::SessionActive)
        ));
    }

    #[test]
    fn new_session_resets_per_session_state() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(1));
        let mut core = started(&ledger, &clock);
        core.configure(
            &admin(),
            SessionSettings {
                allow_delegation: true,
                ..SessionSettings::default()
            },
        )
        .unwrap();
        core.add_option(&admin(), "Green").unwrap();
        core.delegate(&wallet("a"), &wallet("b")).unwrap();
        core.cast_vote(&wallet("b"), 1, None).unwrap();
        core.end_session(&admin()).unwrap();

        let id = core
            .start_session(&admin(), "Shape?", 50, &["Circle", "Square"])
            .unwrap();
        assert_eq!(id, 2);
        assert_eq!(core.state.options.len(), 2);
        assert!(core.state.delegations.is_empty());
        assert!(core.state.tally.record(1, 1, &wallet("b")).is_none());
        assert_eq!(core.state.tally.history(&wallet("b")).votes_cast, 1);
        let session = core.state.session.as_ref().unwrap();
        assert_eq!(session.total_votes, 0);
        assert!(!session.finalized);
        assert_eq!(core.state.history.len(), 2);
    }

    #[test]
    fn add_option_capacity() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(1));
        let mut core = started(&ledger, &clock);
        for i in 3..=10 {
            assert_eq!(core.add_option(&admin(), &format!("opt {i}")).unwrap(), i);
        }
        assert!(matches!(
            core.add_option(&admin(), "eleventh"),
            Err(VotingError::CapacityExceeded { capacity: 10 })
        ));
    }

    #[test]
    fn add_option_requires_open_session() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(1));
        let mut core = core(&ledger, &clock);
        assert!(matches!(
            core.add_option(&admin(), "Red"),
            Err(VotingError::SessionNotActive)
        ));
    }

    #[test]
    fn configure_rejects_out_of_bounds() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(1));
        let mut core = started(&ledger, &clock);
        let bad = SessionSettings {
            win_threshold_pct: 101,
            ..SessionSettings::default()
        };
        assert!(matches!(
            core.configure(&admin(), bad),
            Err(VotingError::InvalidConfig(_))
        ));
        let bad = SessionSettings {
            max_rounds: 11,
            ..SessionSettings::default()
        };
        assert!(matches!(
            core.configure(&admin(), bad),
            Err(VotingError::InvalidConfig(_))
        ));
        assert!(matches!(
            core.configure(&wallet("x"), SessionSettings::default()),
            Err(VotingError::Unauthorized(_))
        ));
    }

    #[test]
    fn configure_cannot_shrink_below_current_round() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(1));
        let mut core = started(&ledger, &clock);
        let settings = SessionSettings {
            quorum_threshold: 10,
            max_rounds: 3,
            ..SessionSettings::default()
        };
        core.configure(&admin(), settings.clone()).unwrap();
        core.process_next_round(&admin()).unwrap();
        core.process_next_round(&admin()).unwrap();
        let shrink = SessionSettings {
            max_rounds: 2,
            ..settings
        };
        assert!(matches!(
            core.configure(&admin(), shrink),
            Err(VotingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn vote_after_end_height_is_rejected() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        clock.advance(100);
        assert!(matches!(
            core.cast_vote(&wallet("v"), 1, None),
            Err(VotingError::VotingEnded)
        ));
    }

    #[test]
    fn vote_after_end_session_is_rejected() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        core.end_session(&admin()).unwrap();
        assert!(matches!(
            core.cast_vote(&wallet("v"), 1, None),
            Err(VotingError::VotingEnded)
        ));
    }

    #[test]
    fn revoked_voter_is_unauthorized() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        core.revoke_authorization(&admin(), &wallet("v")).unwrap();
        assert!(matches!(
            core.cast_vote(&wallet("v"), 1, None),
            Err(VotingError::Unauthorized(_))
        ));
        core.authorize(&admin(), &wallet("v")).unwrap();
        core.cast_vote(&wallet("v"), 1, None).unwrap();
    }

    #[test]
    fn minimum_balance_gates_voting() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        core.configure(
            &admin(),
            SessionSettings {
                require_minimum_balance: true,
                minimum_balance: Amount::new(10),
                ..SessionSettings::default()
            },
        )
        .unwrap();
        ledger.fund(&wallet("poor"), 9);
        ledger.fund(&wallet("rich"), 10);
        assert!(matches!(
            core.cast_vote(&wallet("poor"), 1, None),
            Err(VotingError::Unauthorized(_))
        ));
        core.cast_vote(&wallet("rich"), 1, None).unwrap();
    }

    #[test]
    fn fee_is_charged_and_withdrawn() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        core.configure(
            &admin(),
            SessionSettings {
                fee: Amount::new(3),
                ..SessionSettings::default()
            },
        )
        .unwrap();
        ledger.fund(&wallet("v1"), 5);
        ledger.fund(&wallet("v2"), 5);
        core.cast_vote(&wallet("v1"), 1, None).unwrap();
        core.cast_vote(&wallet("v2"), 2, None).unwrap();

        assert_eq!(ledger.custody(), Amount::new(6));
        assert_eq!(core.state.fee_balance, Amount::new(6));
        let session = core.state.session.as_ref().unwrap();
        assert_eq!(session.fees_collected, Amount::new(6));

        assert!(matches!(
            core.withdraw_fees(&wallet("v1")),
            Err(VotingError::Unauthorized(_))
        ));
        assert_eq!(core.withdraw_fees(&admin()).unwrap(), Amount::new(6));
        assert_eq!(ledger.balance_of(&admin()), Amount::new(6));
        assert!(matches!(
            core.withdraw_fees(&admin()),
            Err(VotingError::NotFound(_))
        ));
    }

    #[test]
    fn failed_fee_charge_leaves_state_untouched() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        core.configure(
            &admin(),
            SessionSettings {
                fee: Amount::new(3),
                ..SessionSettings::default()
            },
        )
        .unwrap();
        ledger.fund(&wallet("v1"), 2);
        assert!(matches!(
            core.cast_vote(&wallet("v1"), 1, None),
            Err(VotingError::InsufficientBalance(_))
        ));
        let session = core.state.session.as_ref().unwrap();
        assert_eq!(session.total_votes, 0);
        assert_eq!(session.ballots_cast, 0);
        assert!(session.fees_collected.is_zero());
        assert!(core.state.fee_balance.is_zero());
        assert_eq!(core.state.options.total_votes(), 0);
        assert!(core.state.tally.record(1, 1, &wallet("v1")).is_none());
        assert_eq!(ledger.balance_of(&wallet("v1")), Amount::new(2));
    }

    #[test]
    fn rejected_ballot_is_not_charged() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        core.configure(
            &admin(),
            SessionSettings {
                fee: Amount::new(1),
                ..SessionSettings::default()
            },
        )
        .unwrap();
        ledger.fund(&wallet("v1"), 5);
        core.cast_vote(&wallet("v1"), 1, None).unwrap();
        assert!(matches!(
            core.cast_vote(&wallet("v1"), 2, None),
            Err(VotingError::AlreadyVoted(_))
        ));
        assert_eq!(ledger.balance_of(&wallet("v1")), Amount::new(4));
    }

    #[test]
    fn delegation_preconditions() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = core(&ledger, &clock);
        assert!(matches!(
            core.delegate(&wallet("a"), &wallet("b")),
            Err(VotingError::SessionNotActive)
        ));

        core.start_session(&admin(), "Colour?", 100, &["Red", "Blue"])
            .unwrap();
        assert!(matches!(
            core.delegate(&wallet("a"), &wallet("b")),
            Err(VotingError::DelegationNotAllowed)
        ));

        core.configure(
            &admin(),
            SessionSettings {
                allow_delegation: true,
                ..SessionSettings::default()
            },
        )
        .unwrap();
        assert!(matches!(
            core.delegate(&wallet("a"), &wallet("a")),
            Err(VotingError::SelfDelegation)
        ));

        core.revoke_authorization(&admin(), &wallet("b")).unwrap();
        assert!(matches!(
            core.delegate(&wallet("a"), &wallet("b")),
            Err(VotingError::Ineligible(_))
        ));

        core.delegate(&wallet("a"), &wallet("c")).unwrap();
        assert!(matches!(
            core.delegate(&wallet("a"), &wallet("d")),
            Err(VotingError::AlreadyDelegated(_))
        ));

        core.end_session(&admin()).unwrap();
        assert!(matches!(
            core.delegate(&wallet("e"), &wallet("c")),
            Err(VotingError::SessionNotActive)
        ));
        assert!(matches!(
            core.revoke_delegation(&wallet("a")),
            Err(VotingError::SessionNotActive)
        ));
    }

    #[test]
    fn live_delegations_pin_format_and_delegation_flag() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        let weighted = SessionSettings {
            format: VotingFormat::Weighted,
            allow_delegation: true,
            ..SessionSettings::default()
        };
        core.configure(&admin(), weighted.clone()).unwrap();
        core.set_voter_weight(&admin(), &wallet("v1"), 5).unwrap();
        core.delegate(&wallet("v1"), &wallet("v2")).unwrap();

        let simple_closed = SessionSettings {
            format: VotingFormat::Simple,
            allow_delegation: false,
            ..SessionSettings::default()
        };
        assert!(matches!(
            core.configure(&admin(), simple_closed.clone()),
            Err(VotingError::InvalidConfig(_))
        ));
        let delegation_off = SessionSettings {
            allow_delegation: false,
            ..weighted.clone()
        };
        assert!(matches!(
            core.configure(&admin(), delegation_off),
            Err(VotingError::InvalidConfig(_))
        ));
        let settings = &core.state.session.as_ref().unwrap().settings;
        assert_eq!(settings.format, VotingFormat::Weighted);
        assert!(settings.allow_delegation);

        // Other settings stay adjustable while edges exist.
        core.configure(
            &admin(),
            SessionSettings {
                quorum_threshold: 3,
                ..weighted
            },
        )
        .unwrap();

        core.revoke_delegation(&wallet("v1")).unwrap();
        core.configure(&admin(), simple_closed).unwrap();
        assert_eq!(core.cast_vote(&wallet("v2"), 1, None).unwrap().weight, 1);
    }

    #[test]
    fn repeat_voter_with_bad_ranking_is_already_voted() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        core.configure(
            &admin(),
            SessionSettings {
                format: VotingFormat::Ranked,
                ..SessionSettings::default()
            },
        )
        .unwrap();
        core.cast_vote(&wallet("v"), 1, Some(vec![1, 2])).unwrap();
        assert!(matches!(
            core.cast_vote(&wallet("v"), 2, Some(vec![2, 9])),
            Err(VotingError::AlreadyVoted(_))
        ));
        assert!(matches!(
            core.cast_vote(&wallet("v"), 2, Some(vec![1; 11])),
            Err(VotingError::AlreadyVoted(_))
        ));
    }

    #[test]
    fn delegated_weight_counts_in_ballots() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        core.configure(
            &admin(),
            SessionSettings {
                allow_delegation: true,
                ..SessionSettings::default()
            },
        )
        .unwrap();
        core.delegate(&wallet("a"), &wallet("b")).unwrap();
        core.delegate(&wallet("c"), &wallet("b")).unwrap();
        let receipt = core.cast_vote(&wallet("b"), 2, None).unwrap();
        assert_eq!(receipt.weight, 3);
        assert_eq!(core.state.options.get(2).unwrap().weight, 3);
        assert_eq!(core.state.session.as_ref().unwrap().total_weight, 3);
    }

    #[test]
    fn revoke_without_delegation_is_not_found() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        assert!(matches!(
            core.revoke_delegation(&wallet("a")),
            Err(VotingError::NotFound(_))
        ));
    }

    #[test]
    fn voter_weight_requires_weighted_format() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        assert!(matches!(
            core.set_voter_weight(&admin(), &wallet("v"), 5),
            Err(VotingError::InvalidConfig(_))
        ));
        core.configure(
            &admin(),
            SessionSettings {
                format: VotingFormat::Weighted,
                ..SessionSettings::default()
            },
        )
        .unwrap();
        assert!(matches!(
            core.set_voter_weight(&admin(), &wallet("v"), 0),
            Err(VotingError::InvalidConfig(_))
        ));
        core.set_voter_weight(&admin(), &wallet("v"), 5).unwrap();
        assert_eq!(core.cast_vote(&wallet("v"), 1, None).unwrap().weight, 5);
    }

    #[test]
    fn ranked_ballot_stores_ranking() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        core.add_option(&admin(), "Green").unwrap();
        core.configure(
            &admin(),
            SessionSettings {
                format: VotingFormat::Ranked,
                ..SessionSettings::default()
            },
        )
        .unwrap();
        core.cast_vote(&wallet("v"), 3, Some(vec![3, 1, 2])).unwrap();
        let record = core.state.tally.record(1, 1, &wallet("v")).unwrap();
        assert_eq!(record.ranking, Some(vec![3, 1, 2]));

        assert!(matches!(
            core.cast_vote(&wallet("w"), 1, Some(vec![1, 9])),
            Err(VotingError::InvalidOption(9))
        ));
    }

    #[test]
    fn batch_authorization_is_all_or_nothing() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = core(&ledger, &clock);
        let batch = vec![wallet("a"), Address::new(""), wallet("b")];
        assert!(matches!(
            core.authorize_batch(&admin(), &batch),
            Err(VotingError::InvalidConfig(_))
        ));
        assert_eq!(core.state.eligibility.record(&wallet("a")), None);

        let too_many: Vec<Address> = (0..=MAX_BATCH).map(|i| wallet(&format!("v{i}"))).collect();
        assert!(matches!(
            core.authorize_batch(&admin(), &too_many),
            Err(VotingError::CapacityExceeded { capacity: MAX_BATCH })
        ));

        let ok = vec![wallet("a"), wallet("b")];
        assert_eq!(core.authorize_batch(&admin(), &ok).unwrap(), 2);
        assert_eq!(core.state.eligibility.record(&wallet("b")), Some(true));
    }

    #[test]
    fn finalize_without_session_is_not_found() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = core(&ledger, &clock);
        assert!(matches!(
            core.finalize(&admin()),
            Err(VotingError::NotFound(_))
        ));
    }

    #[test]
    fn finalize_records_history() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        core.cast_vote(&wallet("v1"), 2, None).unwrap();
        core.end_session(&admin()).unwrap();
        assert!(matches!(
            core.finalize(&admin()),
            Err(VotingError::SessionActive)
        ));
        clock.advance(100);
        let result = core.finalize(&admin()).unwrap();
        assert_eq!(result.winner, Some(2));

        let record = &core.state.history[&1];
        assert!(record.finalized);
        assert_eq!(record.winner, Some(2));
        assert_eq!(record.total_votes, 1);
        assert!(matches!(
            core.finalize(&admin()),
            Err(VotingError::AlreadyFinalized)
        ));
    }

    #[test]
    fn finalized_session_rejects_mutation() {
        let (ledger, clock) = (NullLedger::new(), NullClock::new(0));
        let mut core = started(&ledger, &clock);
        core.end_session(&admin()).unwrap();
        clock.advance(100);
        core.finalize(&admin()).unwrap();

        assert!(matches!(
            core.add_option(&admin(), "Late"),
            Err(VotingError::SessionNotActive)
        ));
        assert!(matches!(
            core.configure(&admin(), SessionSettings::default()),
            Err(VotingError::SessionNotActive)
        ));
        assert!(matches!(
            core.end_session(&admin()),
            Err(VotingError::SessionNotActive)
        ));
        assert!(matches!(
            core.process_next_round(&admin()),
            Err(VotingError::SessionNotActive)
        ));
        assert!(matches!(
            core.cast_vote(&wallet("v"), 1, None),
            Err(VotingError::VotingEnded)
        ));
    }
}
