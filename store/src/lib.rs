//! Abstract storage traits for the Agora voting core.
//!
//! Every storage backend (an on-chain key-value map, a database, in-memory for
//! testing) implements these traits. The voting core depends only on the traits
//! and hands them opaque serialized records.

pub mod error;
pub mod voting;

pub use error::StoreError;
pub use voting::VotingStore;
