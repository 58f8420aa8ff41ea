use agora_ledger::LedgerError;
use agora_store::StoreError;
use agora_types::{Address, OptionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VotingError {
    #[error("{0} is not authorized for this operation")]
    Unauthorized(Address),

    #[error("{0} not found")]
    NotFound(String),

    #[error("voting has ended for the current session")]
    VotingEnded,

    #[error("no voting session is open")]
    SessionNotActive,

    #[error("a voting session is still open")]
    SessionActive,

    #[error("{0} has already voted in this round")]
    AlreadyVoted(Address),

    #[error("session has already been finalized")]
    AlreadyFinalized,

    #[error("option {0} does not exist or is inactive")]
    InvalidOption(OptionId),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("quorum not met: {have} < {need} votes")]
    QuorumNotMet { have: u64, need: u64 },

    #[error("quorum of {0} votes already reached, round cannot advance")]
    QuorumReached(u64),

    #[error("all {0} rounds have been used")]
    RoundsExhausted(u8),

    #[error("delegation is not allowed in this session")]
    DelegationNotAllowed,

    #[error("cannot delegate to self")]
    SelfDelegation,

    #[error("{0} is not eligible to receive delegated weight")]
    Ineligible(Address),

    #[error("{0} already delegates; revoke the existing delegation first")]
    AlreadyDelegated(Address),

    #[error("capacity exceeded: at most {capacity} entries")]
    CapacityExceeded { capacity: usize },

    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("arithmetic overflow in tally")]
    Overflow,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<LedgerError> for VotingError {
    fn from(err: LedgerError) -> Self {
        Self::InsufficientBalance(err.to_string())
    }
}
