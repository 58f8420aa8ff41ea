//! Fundamental types for the Agora voting core.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! addresses, block heights and the clock abstraction, value amounts, and the
//! ballot format enum.

pub mod address;
pub mod amount;
pub mod format;
pub mod time;

pub use address::Address;
pub use amount::Amount;
pub use format::VotingFormat;
pub use time::{Clock, Height};

/// Identifier of a voting session. Sessions are numbered from 1.
pub type SessionId = u64;

/// Identifier of a ballot option within a session (1-based).
pub type OptionId = u8;

/// Vote weight. Simple ballots carry weight 1.
pub type Weight = u128;
