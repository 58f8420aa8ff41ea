//! In-memory stand-ins for the host services the voting core consumes.
//!
//! Each type implements one adapter trait and exposes extra knobs for tests:
//! [`NullClock`] moves only when told to, [`NullLedger`] can be funded or made
//! to reject transfers, and [`NullVotingStore`] keeps records in a map.

pub mod clock;
pub mod ledger;
pub mod store;

pub use clock::NullClock;
pub use ledger::NullLedger;
pub use store::NullVotingStore;
