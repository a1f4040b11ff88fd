//! Content-derived identifiers.
//!
//! Question ids are Blake2b-256 digests over the submission's identifying
//! fields, so the same asker resubmitting identical text still produces a
//! distinct id (the per-asker nonce differs).

use crate::address::Address;
use crate::time::Timestamp;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

type Blake2b256 = Blake2b<U32>;

/// Deterministic identifier of a submitted question.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId([u8; 32]);

impl QuestionId {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Derive the id for a submission.
    ///
    /// `nonce` is the asker's submission count at the time of submission,
    /// which keeps ids collision-free when the same text is resubmitted.
    pub fn derive(asker: &Address, text: &str, submitted_at: Timestamp, nonce: u64) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(b"veritas-question");
        hasher.update(asker.as_str().as_bytes());
        hasher.update(text.as_bytes());
        hasher.update(submitted_at.as_secs().to_be_bytes());
        hasher.update(nonce.to_be_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Hash of externally-stored content (answer payloads, model identities,
/// inference inputs/outputs). Produced by the storage/inference
/// collaborators and carried verbatim.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Hash arbitrary payload bytes.
    pub fn of(payload: &[u8]) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(payload);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }

    /// Parse from a hex string (64 hex chars).
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(arr))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asker() -> Address {
        Address::new("vrt_asker")
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = QuestionId::derive(&asker(), "what is water", Timestamp::new(100), 0);
        let b = QuestionId::derive(&asker(), "what is water", Timestamp::new(100), 0);
        assert_eq!(a, b);
    }

    #[test]
    fn nonce_distinguishes_identical_resubmission() {
        let a = QuestionId::derive(&asker(), "what is water", Timestamp::new(100), 0);
        let b = QuestionId::derive(&asker(), "what is water", Timestamp::new(100), 1);
        assert_ne!(a, b);
    }

    #[test]
    fn different_askers_different_ids() {
        let a = QuestionId::derive(&Address::new("vrt_a"), "q", Timestamp::new(1), 0);
        let b = QuestionId::derive(&Address::new("vrt_b"), "q", Timestamp::new(1), 0);
        assert_ne!(a, b);
    }

    #[test]
    fn content_hash_roundtrips_hex() {
        let h = ContentHash::of(b"payload");
        let parsed = ContentHash::from_hex(&h.to_string()).unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn content_hash_rejects_bad_hex() {
        assert!(ContentHash::from_hex("zz").is_none());
        assert!(ContentHash::from_hex("abcd").is_none());
    }
}
