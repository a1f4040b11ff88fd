//! The off-chain read model and its idempotent upserts.
//!
//! Rows are keyed by `question_id` (votes by `(question_id, voter)`), so
//! redelivering an event rewrites the same row with the same bytes. Round
//! tallies are recomputed from the stored vote rows rather than
//! incremented — a redelivered `VoteCast` cannot double-count. Monotonic
//! flags (`answered`, `verified`, `finalized`) are merged from any existing
//! row so replays never regress them.

use crate::error::RelayError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use veritas_store::MirrorStore;
use veritas_types::{Address, ContentHash, LedgerEvent, QuestionId, SequencedEvent, Timestamp};

const CURSOR_KEY: &[u8] = b"relay:cursor";

/// Mirror row for a question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRow {
    pub id: QuestionId,
    pub asker: Address,
    pub text: String,
    pub reference_urls: Vec<String>,
    pub fee: u128,
    pub submitted_at: Timestamp,
    pub answered: bool,
}

/// Mirror row for an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRow {
    pub question_id: QuestionId,
    pub text: String,
    pub storage_hash: ContentHash,
    pub submitted_at: Timestamp,
    pub verified: bool,
}

/// Mirror row for a single vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRow {
    pub question_id: QuestionId,
    pub voter: Address,
    pub approved: bool,
    pub stake: u128,
    pub cast_at: Timestamp,
}

/// Mirror row for a voting round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRow {
    pub question_id: QuestionId,
    pub opened_at: Timestamp,
    pub ends_at: Timestamp,
    pub votes_for: u128,
    pub votes_against: u128,
    pub finalized: bool,
    pub approved: Option<bool>,
}

/// The read model: applies events onto a [`MirrorStore`] and owns the
/// persisted cursor.
pub struct Mirror {
    store: Arc<dyn MirrorStore>,
    voting_window_secs: u64,
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, RelayError> {
    bincode::serialize(value).map_err(|e| RelayError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, RelayError> {
    bincode::deserialize(bytes).map_err(|e| RelayError::Serialization(e.to_string()))
}

impl Mirror {
    pub fn new(store: Arc<dyn MirrorStore>, voting_window_secs: u64) -> Self {
        Self {
            store,
            voting_window_secs,
        }
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    /// Last processed sequence, zero before anything was applied.
    pub fn cursor(&self) -> Result<u64, RelayError> {
        match self.store.get_meta(CURSOR_KEY)? {
            Some(bytes) if bytes.len() >= 8 => {
                Ok(u64::from_be_bytes(bytes[..8].try_into().expect("len checked")))
            }
            _ => Ok(0),
        }
    }

    pub fn set_cursor(&self, sequence: u64) -> Result<(), RelayError> {
        self.store.put_meta(CURSOR_KEY, &sequence.to_be_bytes())?;
        Ok(())
    }

    // ── Event application ───────────────────────────────────────────────

    /// Apply one event. Safe to call any number of times with the same
    /// event; the cursor is NOT advanced here — that is the applier's job,
    /// after this returns Ok.
    pub fn apply(&self, event: &SequencedEvent) -> Result<(), RelayError> {
        match &event.event {
            LedgerEvent::QuestionSubmitted {
                question_id,
                asker,
                text,
                reference_urls,
                fee,
            } => {
                // A replayed submission must not clear a later `answered`.
                let answered = self
                    .question(question_id)?
                    .map(|q| q.answered)
                    .unwrap_or(false);
                let row = QuestionRow {
                    id: *question_id,
                    asker: asker.clone(),
                    text: text.clone(),
                    reference_urls: reference_urls.clone(),
                    fee: *fee,
                    submitted_at: event.timestamp,
                    answered,
                };
                self.store.put_question(question_id, &encode(&row)?)?;
            }

            LedgerEvent::AnswerSubmitted {
                question_id,
                storage_hash,
                text,
            } => {
                let verified = self
                    .answer(question_id)?
                    .map(|a| a.verified)
                    .unwrap_or(false);
                let row = AnswerRow {
                    question_id: *question_id,
                    text: text.clone(),
                    storage_hash: *storage_hash,
                    submitted_at: event.timestamp,
                    verified,
                };
                self.store.put_answer(question_id, &encode(&row)?)?;

                if let Some(mut question) = self.question(question_id)? {
                    question.answered = true;
                    self.store.put_question(question_id, &encode(&question)?)?;
                }

                let (finalized, approved) = self
                    .round(question_id)?
                    .map(|r| (r.finalized, r.approved))
                    .unwrap_or((false, None));
                let (votes_for, votes_against) = self.tally_from_votes(question_id)?;
                let round = RoundRow {
                    question_id: *question_id,
                    opened_at: event.timestamp,
                    ends_at: event.timestamp.plus_secs(self.voting_window_secs),
                    votes_for,
                    votes_against,
                    finalized,
                    approved,
                };
                self.store.put_round(question_id, &encode(&round)?)?;
            }

            LedgerEvent::VoteCast {
                question_id,
                voter,
                approved,
                stake,
            } => {
                let row = VoteRow {
                    question_id: *question_id,
                    voter: voter.clone(),
                    approved: *approved,
                    stake: *stake,
                    cast_at: event.timestamp,
                };
                self.store.put_vote(question_id, voter, &encode(&row)?)?;

                if let Some(mut round) = self.round(question_id)? {
                    let (votes_for, votes_against) = self.tally_from_votes(question_id)?;
                    round.votes_for = votes_for;
                    round.votes_against = votes_against;
                    self.store.put_round(question_id, &encode(&round)?)?;
                }
            }

            LedgerEvent::VotingFinalized {
                question_id,
                approved,
            } => {
                let mut round = self.round(question_id)?.unwrap_or(RoundRow {
                    question_id: *question_id,
                    opened_at: event.timestamp,
                    ends_at: event.timestamp,
                    votes_for: 0,
                    votes_against: 0,
                    finalized: false,
                    approved: None,
                });
                round.finalized = true;
                round.approved = Some(*approved);
                self.store.put_round(question_id, &encode(&round)?)?;

                if let Some(mut answer) = self.answer(question_id)? {
                    answer.verified = *approved;
                    self.store.put_answer(question_id, &encode(&answer)?)?;
                }
            }
        }
        Ok(())
    }

    fn tally_from_votes(&self, id: &QuestionId) -> Result<(u128, u128), RelayError> {
        let mut votes_for = 0u128;
        let mut votes_against = 0u128;
        for bytes in self.store.votes_for_question(id)? {
            let vote: VoteRow = decode(&bytes)?;
            if vote.approved {
                votes_for += vote.stake;
            } else {
                votes_against += vote.stake;
            }
        }
        Ok((votes_for, votes_against))
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn question(&self, id: &QuestionId) -> Result<Option<QuestionRow>, RelayError> {
        self.store
            .get_question(id)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    pub fn answer(&self, id: &QuestionId) -> Result<Option<AnswerRow>, RelayError> {
        self.store
            .get_answer(id)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    pub fn round(&self, id: &QuestionId) -> Result<Option<RoundRow>, RelayError> {
        self.store
            .get_round(id)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    pub fn votes(&self, id: &QuestionId) -> Result<Vec<VoteRow>, RelayError> {
        self.store
            .votes_for_question(id)?
            .iter()
            .map(|bytes| decode(bytes))
            .collect()
    }

    /// Rounds whose window has elapsed but which the ledger has not
    /// finalized yet — the sweep's work list.
    pub fn closed_unfinalized_rounds(&self, now: Timestamp) -> Result<Vec<QuestionId>, RelayError> {
        let mut due = Vec::new();
        for (id, bytes) in self.store.iter_rounds()? {
            let round: RoundRow = decode(&bytes)?;
            if !round.finalized && round.ends_at.is_past(now) {
                due.push(id);
            }
        }
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_store::MemoryStore;

    fn qid() -> QuestionId {
        QuestionId::new([5u8; 32])
    }

    fn mirror() -> Mirror {
        Mirror::new(Arc::new(MemoryStore::new()), 3600)
    }

    fn submitted(seq: u64) -> SequencedEvent {
        SequencedEvent {
            sequence: seq,
            timestamp: Timestamp::new(100),
            event: LedgerEvent::QuestionSubmitted {
                question_id: qid(),
                asker: Address::new("vrt_asker"),
                text: "what is water".into(),
                reference_urls: vec!["https://example.org".into()],
                fee: 1000,
            },
        }
    }

    fn answered(seq: u64) -> SequencedEvent {
        SequencedEvent {
            sequence: seq,
            timestamp: Timestamp::new(200),
            event: LedgerEvent::AnswerSubmitted {
                question_id: qid(),
                storage_hash: ContentHash::of(b"stored"),
                text: "wet".into(),
            },
        }
    }

    fn voted(seq: u64, voter: &str, approved: bool, stake: u128) -> SequencedEvent {
        SequencedEvent {
            sequence: seq,
            timestamp: Timestamp::new(300),
            event: LedgerEvent::VoteCast {
                question_id: qid(),
                voter: Address::new(format!("vrt_{voter}")),
                approved,
                stake,
            },
        }
    }

    fn finalized(seq: u64, approved: bool) -> SequencedEvent {
        SequencedEvent {
            sequence: seq,
            timestamp: Timestamp::new(4000),
            event: LedgerEvent::VotingFinalized {
                question_id: qid(),
                approved,
            },
        }
    }

    #[test]
    fn cursor_defaults_to_zero_and_persists() {
        let m = mirror();
        assert_eq!(m.cursor().unwrap(), 0);
        m.set_cursor(42).unwrap();
        assert_eq!(m.cursor().unwrap(), 42);
    }

    #[test]
    fn full_lifecycle_produces_consistent_rows() {
        let m = mirror();
        m.apply(&submitted(1)).unwrap();
        m.apply(&answered(2)).unwrap();
        m.apply(&voted(3, "a", true, 100)).unwrap();
        m.apply(&voted(4, "b", false, 40)).unwrap();
        m.apply(&finalized(5, true)).unwrap();

        let q = m.question(&qid()).unwrap().unwrap();
        assert!(q.answered);
        assert_eq!(q.fee, 1000);

        let a = m.answer(&qid()).unwrap().unwrap();
        assert!(a.verified);
        assert_eq!(a.storage_hash, ContentHash::of(b"stored"));

        let r = m.round(&qid()).unwrap().unwrap();
        assert!(r.finalized);
        assert_eq!(r.approved, Some(true));
        assert_eq!(r.votes_for, 100);
        assert_eq!(r.votes_against, 40);
        assert_eq!(r.ends_at, Timestamp::new(3800));
    }

    #[test]
    fn replaying_every_event_changes_nothing() {
        let m = mirror();
        let events = vec![
            submitted(1),
            answered(2),
            voted(3, "a", true, 100),
            voted(4, "b", false, 40),
            finalized(5, false),
        ];
        for e in &events {
            m.apply(e).unwrap();
        }
        let q1 = m.question(&qid()).unwrap();
        let a1 = m.answer(&qid()).unwrap();
        let r1 = m.round(&qid()).unwrap();
        let v1 = {
            let mut v = m.votes(&qid()).unwrap();
            v.sort_by(|x, y| x.voter.cmp(&y.voter));
            v
        };

        // Replay the whole log, twice.
        for _ in 0..2 {
            for e in &events {
                m.apply(e).unwrap();
            }
        }

        assert_eq!(m.question(&qid()).unwrap(), q1);
        assert_eq!(m.answer(&qid()).unwrap(), a1);
        assert_eq!(m.round(&qid()).unwrap(), r1);
        let mut v2 = m.votes(&qid()).unwrap();
        v2.sort_by(|x, y| x.voter.cmp(&y.voter));
        assert_eq!(v2, v1);
    }

    #[test]
    fn redelivered_vote_does_not_double_count() {
        let m = mirror();
        m.apply(&submitted(1)).unwrap();
        m.apply(&answered(2)).unwrap();
        m.apply(&voted(3, "a", true, 100)).unwrap();
        m.apply(&voted(3, "a", true, 100)).unwrap();
        m.apply(&voted(3, "a", true, 100)).unwrap();

        let r = m.round(&qid()).unwrap().unwrap();
        assert_eq!(r.votes_for, 100);
        assert_eq!(m.votes(&qid()).unwrap().len(), 1);
    }

    #[test]
    fn replayed_submission_keeps_answered_flag() {
        let m = mirror();
        m.apply(&submitted(1)).unwrap();
        m.apply(&answered(2)).unwrap();
        // Redelivery of the submission after the answer arrived.
        m.apply(&submitted(1)).unwrap();

        assert!(m.question(&qid()).unwrap().unwrap().answered);
    }

    #[test]
    fn replayed_answer_keeps_verified_flag() {
        let m = mirror();
        m.apply(&submitted(1)).unwrap();
        m.apply(&answered(2)).unwrap();
        m.apply(&finalized(3, true)).unwrap();
        m.apply(&answered(2)).unwrap();

        assert!(m.answer(&qid()).unwrap().unwrap().verified);
        assert!(m.round(&qid()).unwrap().unwrap().finalized);
    }

    #[test]
    fn sweep_work_list_respects_window_and_finalization() {
        let m = mirror();
        m.apply(&submitted(1)).unwrap();
        m.apply(&answered(2)).unwrap(); // ends at 3800

        // Still open.
        assert!(m.closed_unfinalized_rounds(Timestamp::new(3800)).unwrap().is_empty());
        // Closed, not finalized.
        assert_eq!(
            m.closed_unfinalized_rounds(Timestamp::new(3801)).unwrap(),
            vec![qid()]
        );

        m.apply(&finalized(3, false)).unwrap();
        assert!(m.closed_unfinalized_rounds(Timestamp::new(5000)).unwrap().is_empty());
    }

    #[test]
    fn rejected_finalize_leaves_answer_unverified() {
        let m = mirror();
        m.apply(&submitted(1)).unwrap();
        m.apply(&answered(2)).unwrap();
        m.apply(&finalized(3, false)).unwrap();

        assert!(!m.answer(&qid()).unwrap().unwrap().verified);
        assert_eq!(m.round(&qid()).unwrap().unwrap().approved, Some(false));
    }
}
