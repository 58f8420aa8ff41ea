//! Snapshot persistence of the voting aggregate through a [`VotingStore`].
//!
//! The whole aggregate is written as one bincode record; each session's history
//! record is also written under its id so it can be read without loading the
//! aggregate.

use agora_ledger::Ledger;
use agora_store::VotingStore;
use agora_types::{Clock, SessionId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::VotingConfig;
use crate::engine::{CoreState, VotingCore};
use crate::session::SessionRecord;
use crate::VotingError;

impl<L: Ledger, C: Clock> VotingCore<L, C> {
    /// Persist the aggregate and every session history record.
    pub fn save_state(&self, store: &dyn VotingStore) -> Result<(), VotingError> {
        let bytes = encode(&self.state)?;
        store.put_state(&bytes)?;
        for record in self.state.history.values() {
            store.put_session_record(record.id, &encode(record)?)?;
        }
        debug!(
            bytes = bytes.len(),
            sessions = self.state.history.len(),
            "voting state saved"
        );
        Ok(())
    }

    /// Rebuild a core from the aggregate stored in `store`.
    pub fn restore(
        config: VotingConfig,
        ledger: L,
        clock: C,
        store: &dyn VotingStore,
    ) -> Result<Self, VotingError> {
        let bytes = store
            .get_state()?
            .ok_or_else(|| VotingError::NotFound("voting state".to_string()))?;
        let state: CoreState = decode(&bytes)?;
        info!(
            session_id = ?state.session.as_ref().map(|s| s.id),
            sessions = state.history.len(),
            "voting state restored"
        );
        Self::with_state(config, ledger, clock, state)
    }
}

/// Read one session's history record straight from `store`.
pub fn load_session_record(
    store: &dyn VotingStore,
    id: SessionId,
) -> Result<SessionRecord, VotingError> {
    decode(&store.get_session_record(id)?)
}

/// Ids of every session with a stored history record, ascending.
pub fn stored_sessions(store: &dyn VotingStore) -> Result<Vec<SessionId>, VotingError> {
    Ok(store.list_session_records()?)
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, VotingError> {
    bincode::serialize(value).map_err(|e| VotingError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, VotingError> {
    bincode::deserialize(bytes).map_err(|e| VotingError::Serialization(e.to_string()))
}
