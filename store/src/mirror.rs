//! The mirror store trait.

use crate::StoreError;
use veritas_types::{Address, QuestionId};

/// Storage surface for the relay's off-chain read model.
///
/// All writes are upserts: putting an existing key replaces the row, which
/// is what makes event redelivery harmless. Implementations must be safe
/// under concurrent access (`&self` receivers, internal synchronisation).
pub trait MirrorStore: Send + Sync {
    fn put_question(&self, id: &QuestionId, data: &[u8]) -> Result<(), StoreError>;
    fn get_question(&self, id: &QuestionId) -> Result<Option<Vec<u8>>, StoreError>;

    fn put_answer(&self, id: &QuestionId, data: &[u8]) -> Result<(), StoreError>;
    fn get_answer(&self, id: &QuestionId) -> Result<Option<Vec<u8>>, StoreError>;

    /// Upsert keyed by `(question, voter)` — one row per voter per round.
    fn put_vote(&self, id: &QuestionId, voter: &Address, data: &[u8]) -> Result<(), StoreError>;
    fn get_vote(&self, id: &QuestionId, voter: &Address) -> Result<Option<Vec<u8>>, StoreError>;
    /// All vote rows for a question, in unspecified order.
    fn votes_for_question(&self, id: &QuestionId) -> Result<Vec<Vec<u8>>, StoreError>;

    fn put_round(&self, id: &QuestionId, data: &[u8]) -> Result<(), StoreError>;
    fn get_round(&self, id: &QuestionId) -> Result<Option<Vec<u8>>, StoreError>;
    /// Every round row; the finalization sweep filters these itself since
    /// the store cannot see inside opaque bytes.
    fn iter_rounds(&self) -> Result<Vec<(QuestionId, Vec<u8>)>, StoreError>;

    /// Small keyed values: the relay cursor, in-flight markers.
    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
    fn delete_meta(&self, key: &[u8]) -> Result<(), StoreError>;
}
