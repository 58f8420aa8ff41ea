//! Voting core for the Agora contracts.
//!
//! A single owned aggregate, [`VotingCore`], runs one voting session at a time
//! through its lifecycle:
//!
//! Configuring → Open → Closed → Finalized, with an Open → next round → Open
//! loop bounded by the session's maximum round count.
//!
//! Ballots come in four formats (simple, weighted, delegated, ranked). Weight
//! may be delegated one hop, votes are gated on eligibility and optional
//! per-vote fees, and finalization is a one-shot transition guarded by quorum.
//!
//! Caller identity, the height clock, value transfer and durable storage are
//! supplied by the host through [`agora_types::Clock`], [`agora_ledger::Ledger`]
//! and [`agora_store::VotingStore`].

pub mod config;
pub mod delegation;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod finalize;
pub mod options;
pub mod queries;
pub mod rounds;
pub mod session;
pub mod snapshot;
pub mod tally;
pub mod weights;

pub use config::{VoteChangePolicy, VotingConfig};
pub use delegation::{DelegationEdge, DelegationGraph};
pub use eligibility::Eligibility;
pub use engine::VotingCore;
pub use error::VotingError;
pub use finalize::{FinalResult, FinalizationGate, OptionTally};
pub use options::{BallotOption, OptionRegistry};
pub use queries::{Analytics, DelegationInfo, DetailedResults, RoundInfo, SessionStatus};
pub use rounds::{RoundController, RoundResult};
pub use session::{SessionPhase, SessionRecord, SessionSettings, VotingSession};
pub use tally::{TallyEngine, VoteReceipt, VoterHistory, VoterRecord};
pub use weights::VoterWeights;
