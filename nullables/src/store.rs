//! Nullable store: thread-safe in-memory voting storage for testing.

use agora_store::{StoreError, VotingStore};
use agora_types::SessionId;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// An in-memory voting store for testing.
pub struct NullVotingStore {
    state: Mutex<Option<Vec<u8>>>,
    sessions: Mutex<BTreeMap<SessionId, Vec<u8>>>,
}

impl NullVotingStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
            sessions: Mutex::new(BTreeMap::new()),
        }
    }
}

impl Default for NullVotingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VotingStore for NullVotingStore {
    fn put_state(&self, data: &[u8]) -> Result<(), StoreError> {
        *self.state.lock().unwrap() = Some(data.to_vec());
        Ok(())
    }

    fn get_state(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.state.lock().unwrap().clone())
    }

    fn delete_state(&self) -> Result<(), StoreError> {
        *self.state.lock().unwrap() = None;
        Ok(())
    }

    fn put_session_record(&self, id: SessionId, data: &[u8]) -> Result<(), StoreError> {
        self.sessions.lock().unwrap().insert(id, data.to_vec());
        Ok(())
    }

    fn get_session_record(&self, id: SessionId) -> Result<Vec<u8>, StoreError> {
        self.sessions
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("session {id}")))
    }

    fn list_session_records(&self) -> Result<Vec<SessionId>, StoreError> {
        Ok(self.sessions.lock().unwrap().keys().copied().collect())
    }
}
