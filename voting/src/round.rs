//! Per-question voting round state machine.
//!
//! A round is created atomically with the answer it judges, stays open for a
//! fixed window, and is closed by the passage of time rather than by a
//! timer: readers derive the phase from the wall clock, so a round can be
//! logically closed before any sweep has observed it. Finalization is the
//! only explicit transition and it is monotonic.

use crate::error::VotingError;
use serde::{Deserialize, Serialize};
use veritas_types::{Address, QuestionId, Timestamp};

/// Logical phase of a round, derived lazily from the clock.
///
/// There is no pending variant: a round only exists once an answer has
/// been recorded, so "pending" is the absence of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    /// Votes are being accepted.
    Open,
    /// The window elapsed; awaiting one-shot evaluation.
    Closed,
    /// Terminal.
    Finalized,
}

/// A single cast vote. Immutable once recorded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vote {
    pub question_id: QuestionId,
    pub voter: Address,
    pub approved: bool,
    /// The voter's staked balance at the moment of voting. Never re-read, so
    /// later stake changes cannot alter a closed round's tally.
    pub stake_weight: u128,
    pub cast_at: Timestamp,
}

/// Stake-weighted voting round for one question.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingRound {
    pub question_id: QuestionId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    votes_for: u128,
    votes_against: u128,
    finalized: bool,
    votes: Vec<Vote>,
}

impl VotingRound {
    /// Open a round; `end_time = start + window`.
    pub fn open(question_id: QuestionId, start: Timestamp, window_secs: u64) -> Self {
        Self {
            question_id,
            start_time: start,
            end_time: start.plus_secs(window_secs),
            votes_for: 0,
            votes_against: 0,
            finalized: false,
            votes: Vec::new(),
        }
    }

    pub fn phase(&self, now: Timestamp) -> RoundPhase {
        if self.finalized {
            RoundPhase::Finalized
        } else if self.end_time.is_past(now) {
            RoundPhase::Closed
        } else {
            RoundPhase::Open
        }
    }

    /// Record a vote, updating the stake-weighted tally.
    pub fn cast_vote(
        &mut self,
        voter: Address,
        approved: bool,
        stake_weight: u128,
        now: Timestamp,
    ) -> Result<(), VotingError> {
        if self.finalized {
            return Err(VotingError::AlreadyFinalized);
        }
        if self.end_time.is_past(now) {
            return Err(VotingError::VotingEnded);
        }
        if stake_weight == 0 {
            return Err(VotingError::NotStaked);
        }
        if self.has_voted(&voter) {
            return Err(VotingError::AlreadyVoted(voter.to_string()));
        }
        if approved {
            self.votes_for += stake_weight;
        } else {
            self.votes_against += stake_weight;
        }
        self.votes.push(Vote {
            question_id: self.question_id,
            voter,
            approved,
            stake_weight,
            cast_at: now,
        });
        Ok(())
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.votes.iter().any(|v| v.voter == *voter)
    }

    pub fn votes_for(&self) -> u128 {
        self.votes_for
    }

    pub fn votes_against(&self) -> u128 {
        self.votes_against
    }

    /// Total stake that participated.
    pub fn total_stake_counted(&self) -> u128 {
        self.votes_for + self.votes_against
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Guard for evaluation: the window must have elapsed.
    pub fn ensure_closed(&self, now: Timestamp) -> Result<(), VotingError> {
        if self.finalized {
            return Err(VotingError::AlreadyFinalized);
        }
        if !self.end_time.is_past(now) {
            return Err(VotingError::VotingStillOpen {
                remaining_secs: self.end_time.as_secs().saturating_sub(now.as_secs()),
            });
        }
        Ok(())
    }

    /// One-way transition into the terminal phase.
    pub fn mark_finalized(&mut self) -> Result<(), VotingError> {
        if self.finalized {
            return Err(VotingError::AlreadyFinalized);
        }
        self.finalized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qid() -> QuestionId {
        QuestionId::new([1u8; 32])
    }

    fn voter(n: u8) -> Address {
        Address::new(format!("vrt_voter{n}"))
    }

    fn open_round() -> VotingRound {
        VotingRound::open(qid(), Timestamp::new(1000), 3600)
    }

    #[test]
    fn window_is_start_plus_fixed_window() {
        let round = open_round();
        assert_eq!(round.start_time, Timestamp::new(1000));
        assert_eq!(round.end_time, Timestamp::new(4600));
    }

    #[test]
    fn phase_derived_from_clock() {
        let mut round = open_round();
        assert_eq!(round.phase(Timestamp::new(2000)), RoundPhase::Open);
        // Exactly at end_time the round is still open.
        assert_eq!(round.phase(Timestamp::new(4600)), RoundPhase::Open);
        assert_eq!(round.phase(Timestamp::new(4601)), RoundPhase::Closed);

        round.mark_finalized().unwrap();
        assert_eq!(round.phase(Timestamp::new(2000)), RoundPhase::Finalized);
    }

    #[test]
    fn votes_accumulate_stake_weighted() {
        let mut round = open_round();
        round.cast_vote(voter(1), true, 100, Timestamp::new(2000)).unwrap();
        round.cast_vote(voter(2), true, 100, Timestamp::new(2001)).unwrap();
        round.cast_vote(voter(3), false, 50, Timestamp::new(2002)).unwrap();

        assert_eq!(round.votes_for(), 200);
        assert_eq!(round.votes_against(), 50);
        assert_eq!(round.total_stake_counted(), 250);
        assert_eq!(round.votes().len(), 3);
    }

    #[test]
    fn duplicate_vote_rejected_without_tally_change() {
        let mut round = open_round();
        round.cast_vote(voter(1), true, 100, Timestamp::new(2000)).unwrap();

        let err = round
            .cast_vote(voter(1), false, 100, Timestamp::new(2001))
            .unwrap_err();
        assert!(matches!(err, VotingError::AlreadyVoted(_)));
        assert_eq!(round.votes_for(), 100);
        assert_eq!(round.votes_against(), 0);
    }

    #[test]
    fn zero_stake_vote_rejected() {
        let mut round = open_round();
        let err = round
            .cast_vote(voter(1), true, 0, Timestamp::new(2000))
            .unwrap_err();
        assert!(matches!(err, VotingError::NotStaked));
    }

    #[test]
    fn vote_after_window_rejected() {
        let mut round = open_round();
        let err = round
            .cast_vote(voter(1), true, 100, Timestamp::new(4601))
            .unwrap_err();
        assert!(matches!(err, VotingError::VotingEnded));
    }

    #[test]
    fn vote_at_exact_end_time_accepted() {
        let mut round = open_round();
        round.cast_vote(voter(1), true, 100, Timestamp::new(4600)).unwrap();
        assert_eq!(round.votes_for(), 100);
    }

    #[test]
    fn finalize_is_one_way() {
        let mut round = open_round();
        round.mark_finalized().unwrap();
        assert!(round.is_finalized());
        assert!(matches!(
            round.mark_finalized().unwrap_err(),
            VotingError::AlreadyFinalized
        ));
    }

    #[test]
    fn premature_evaluation_guarded() {
        let round = open_round();
        let err = round.ensure_closed(Timestamp::new(2000)).unwrap_err();
        assert!(matches!(err, VotingError::VotingStillOpen { .. }));
        round.ensure_closed(Timestamp::new(4601)).unwrap();
    }

    #[test]
    fn votes_rejected_after_finalize() {
        let mut round = open_round();
        round.mark_finalized().unwrap();
        let err = round
            .cast_vote(voter(1), true, 100, Timestamp::new(2000))
            .unwrap_err();
        assert!(matches!(err, VotingError::AlreadyFinalized));
    }
}
