//! Voting storage trait.

use crate::StoreError;
use agora_types::SessionId;

/// Durable associative storage for the voting core.
///
/// Writes made through one handle must be visible to subsequent reads on the
/// same handle (read-your-writes).
pub trait VotingStore {
    /// Store the serialized voting aggregate, replacing any previous snapshot.
    fn put_state(&self, data: &[u8]) -> Result<(), StoreError>;

    /// Load the serialized voting aggregate, if one has been stored.
    fn get_state(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Remove the stored aggregate snapshot.
    fn delete_state(&self) -> Result<(), StoreError>;

    /// Store the history record of a session.
    fn put_session_record(&self, id: SessionId, data: &[u8]) -> Result<(), StoreError>;

    /// Get the history record of a session.
    fn get_session_record(&self, id: SessionId) -> Result<Vec<u8>, StoreError>;

    /// List the ids of all sessions with a stored history record, ascending.
    fn list_session_records(&self) -> Result<Vec<SessionId>, StoreError>;
}
