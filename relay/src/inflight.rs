//! In-flight inference tracking.
//!
//! An inference job can run for minutes and survives neither the relay's
//! memory nor its process lifetime, so the claim is a persisted marker in
//! the mirror store keyed by question id — the job's idempotency key. After
//! a restart the marker still blocks re-submission; markers older than the
//! staleness bound are treated as abandoned (crash mid-request) and can be
//! re-claimed.

use crate::error::RelayError;
use std::sync::Arc;
use veritas_store::MirrorStore;
use veritas_types::{QuestionId, Timestamp};

fn marker_key(id: &QuestionId) -> Vec<u8> {
    let mut key = b"relay:inflight:".to_vec();
    key.extend_from_slice(id.as_bytes());
    key
}

/// Persisted idempotency markers for inference requests.
pub struct InflightTracker {
    store: Arc<dyn MirrorStore>,
    stale_secs: u64,
}

impl InflightTracker {
    pub fn new(store: Arc<dyn MirrorStore>, stale_secs: u64) -> Self {
        Self { store, stale_secs }
    }

    /// Try to claim the question for an inference request.
    ///
    /// Returns `false` when a live marker already exists. A stale marker is
    /// overwritten and the claim succeeds.
    pub fn try_claim(&self, id: &QuestionId, now: Timestamp) -> Result<bool, RelayError> {
        let key = marker_key(id);
        if let Some(bytes) = self.store.get_meta(&key)? {
            if bytes.len() >= 8 {
                let claimed_at =
                    Timestamp::new(u64::from_be_bytes(bytes[..8].try_into().expect("len checked")));
                if claimed_at.elapsed(now) < self.stale_secs {
                    return Ok(false);
                }
                tracing::warn!(question = %id, "reclaiming stale in-flight marker");
            }
        }
        self.store
            .put_meta(&key, &now.as_secs().to_be_bytes())?;
        Ok(true)
    }

    /// Release the claim (the request finished, successfully or not).
    pub fn release(&self, id: &QuestionId) -> Result<(), RelayError> {
        self.store.delete_meta(&marker_key(id))?;
        Ok(())
    }

    pub fn is_inflight(&self, id: &QuestionId, now: Timestamp) -> Result<bool, RelayError> {
        match self.store.get_meta(&marker_key(id))? {
            Some(bytes) if bytes.len() >= 8 => {
                let claimed_at =
                    Timestamp::new(u64::from_be_bytes(bytes[..8].try_into().expect("len checked")));
                Ok(claimed_at.elapsed(now) < self.stale_secs)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_store::MemoryStore;

    fn qid(n: u8) -> QuestionId {
        QuestionId::new([n; 32])
    }

    fn tracker() -> InflightTracker {
        InflightTracker::new(Arc::new(MemoryStore::new()), 600)
    }

    #[test]
    fn claim_is_exclusive_until_released() {
        let t = tracker();
        assert!(t.try_claim(&qid(1), Timestamp::new(100)).unwrap());
        assert!(!t.try_claim(&qid(1), Timestamp::new(200)).unwrap());
        assert!(t.is_inflight(&qid(1), Timestamp::new(200)).unwrap());

        t.release(&qid(1)).unwrap();
        assert!(!t.is_inflight(&qid(1), Timestamp::new(200)).unwrap());
        assert!(t.try_claim(&qid(1), Timestamp::new(300)).unwrap());
    }

    #[test]
    fn stale_marker_is_reclaimable() {
        let t = tracker();
        assert!(t.try_claim(&qid(1), Timestamp::new(100)).unwrap());
        // 600s staleness bound: at t=699 still live, at t=700 abandoned.
        assert!(!t.try_claim(&qid(1), Timestamp::new(699)).unwrap());
        assert!(t.try_claim(&qid(1), Timestamp::new(700)).unwrap());
    }

    #[test]
    fn claims_are_per_question() {
        let t = tracker();
        assert!(t.try_claim(&qid(1), Timestamp::new(0)).unwrap());
        assert!(t.try_claim(&qid(2), Timestamp::new(0)).unwrap());
    }
}
