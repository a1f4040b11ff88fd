//! Ledger lifecycle events.
//!
//! The ledger appends one [`SequencedEvent`] per accepted state transition.
//! The relay consumes them at-least-once and in order; `sequence` is the
//! relay's cursor, `timestamp` lets the mirror project deadlines (e.g. a
//! voting window's end) without re-reading authoritative state.

use crate::address::Address;
use crate::id::{ContentHash, QuestionId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Lifecycle events emitted by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A question was submitted with its fee escrowed. Carries the
    /// reference URLs so the relay can build the inference request without
    /// a read-back.
    QuestionSubmitted {
        question_id: QuestionId,
        asker: Address,
        text: String,
        reference_urls: Vec<String>,
        fee: u128,
    },
    /// An answer was recorded and the voting round opened.
    AnswerSubmitted {
        question_id: QuestionId,
        storage_hash: ContentHash,
        text: String,
    },
    /// A staker cast a vote; `stake` is the weight snapshotted at vote time.
    VoteCast {
        question_id: QuestionId,
        voter: Address,
        approved: bool,
        stake: u128,
    },
    /// A round was evaluated and the question finalized.
    VotingFinalized {
        question_id: QuestionId,
        approved: bool,
    },
}

impl LedgerEvent {
    /// The question this event belongs to — every event is keyed by one.
    pub fn question_id(&self) -> QuestionId {
        match self {
            LedgerEvent::QuestionSubmitted { question_id, .. }
            | LedgerEvent::AnswerSubmitted { question_id, .. }
            | LedgerEvent::VoteCast { question_id, .. }
            | LedgerEvent::VotingFinalized { question_id, .. } => *question_id,
        }
    }
}

/// An event with its position in the append-only log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedEvent {
    /// 1-based, strictly increasing, gap-free.
    pub sequence: u64,
    /// Ledger time at which the transition was accepted.
    pub timestamp: Timestamp,
    pub event: LedgerEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_id_extracted_from_every_variant() {
        let id = QuestionId::new([7u8; 32]);
        let events = [
            LedgerEvent::QuestionSubmitted {
                question_id: id,
                asker: Address::new("vrt_a"),
                text: "q".into(),
                reference_urls: vec![],
                fee: 1,
            },
            LedgerEvent::AnswerSubmitted {
                question_id: id,
                storage_hash: ContentHash::ZERO,
                text: "a".into(),
            },
            LedgerEvent::VoteCast {
                question_id: id,
                voter: Address::new("vrt_v"),
                approved: true,
                stake: 10,
            },
            LedgerEvent::VotingFinalized {
                question_id: id,
                approved: false,
            },
        ];
        for e in events {
            assert_eq!(e.question_id(), id);
        }
    }
}
