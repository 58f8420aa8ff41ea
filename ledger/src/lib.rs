//! Value-transfer interface consumed by the voting core.
//!
//! The core never holds balances itself. Per-vote fees are charged from the
//! voter into the core's custody and accumulated fees are paid out to the
//! administrator, both through a [`Ledger`] implementation supplied by the host.

pub mod error;
pub mod transfer;

pub use error::LedgerError;
pub use transfer::Ledger;
