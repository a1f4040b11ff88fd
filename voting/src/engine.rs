//! Pure quorum/approval evaluation of a closed round.
//!
//! All arithmetic is integer percentages with truncation toward zero, so a
//! round sitting exactly on a boundary resolves the same way on every node:
//! truncation can only lower a percentage, never round one up into an
//! approval.

use crate::round::VotingRound;
use veritas_types::ProtocolParams;

/// Binary outcome of consensus evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    pub fn is_approve(&self) -> bool {
        matches!(self, Verdict::Approve)
    }
}

/// The verdict together with the percentages that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub verdict: Verdict,
    /// Participating stake as a truncated percentage of the aggregate
    /// staked supply at evaluation time.
    pub quorum_pct: u128,
    pub quorum_met: bool,
    /// Approving stake as a truncated percentage of participating stake.
    /// `None` when nobody voted.
    pub approval_pct: Option<u128>,
}

/// Evaluates closed rounds against the protocol thresholds.
///
/// The engine is pure and runs exactly once per round; single invocation is
/// the caller's responsibility (the registry's `AlreadyFinalized` guard).
pub struct ConsensusEngine {
    quorum_threshold_pct: u128,
    approval_threshold_pct: u128,
}

impl ConsensusEngine {
    pub fn new(params: &ProtocolParams) -> Self {
        Self {
            quorum_threshold_pct: params.quorum_threshold_pct,
            approval_threshold_pct: params.approval_threshold_pct,
        }
    }

    /// Evaluate a round's tally against `aggregate_staked`, the stake
    /// ledger's total supply at evaluation time.
    pub fn evaluate(&self, round: &VotingRound, aggregate_staked: u128) -> Evaluation {
        let total = round.total_stake_counted();

        // Nobody voted, or nothing is staked: quorum cannot be met and no
        // division happens.
        if total == 0 || aggregate_staked == 0 {
            return Evaluation {
                verdict: Verdict::Reject,
                quorum_pct: 0,
                quorum_met: false,
                approval_pct: None,
            };
        }

        let quorum_pct = total * 100 / aggregate_staked;
        if quorum_pct < self.quorum_threshold_pct {
            return Evaluation {
                verdict: Verdict::Reject,
                quorum_pct,
                quorum_met: false,
                approval_pct: None,
            };
        }

        let approval_pct = round.votes_for() * 100 / total;
        let verdict = if approval_pct >= self.approval_threshold_pct {
            Verdict::Approve
        } else {
            Verdict::Reject
        };
        Evaluation {
            verdict,
            quorum_pct,
            quorum_met: true,
            approval_pct: Some(approval_pct),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use veritas_types::{Address, QuestionId, Timestamp};

    fn engine() -> ConsensusEngine {
        ConsensusEngine::new(&ProtocolParams::reference())
    }

    /// Build a round with a single approving and a single rejecting vote of
    /// the given weights.
    fn round_with(votes_for: u128, votes_against: u128) -> VotingRound {
        let mut round = VotingRound::open(QuestionId::new([2u8; 32]), Timestamp::new(0), 100);
        if votes_for > 0 {
            round
                .cast_vote(Address::new("vrt_yes"), true, votes_for, Timestamp::new(1))
                .unwrap();
        }
        if votes_against > 0 {
            round
                .cast_vote(Address::new("vrt_no"), false, votes_against, Timestamp::new(1))
                .unwrap();
        }
        round
    }

    #[test]
    fn full_participation_strong_approval_approves() {
        // Scenario from the protocol reference: stakes {100, 100, 50},
        // votes {approve: 200, reject: 50}, aggregate 250.
        let eval = engine().evaluate(&round_with(200, 50), 250);
        assert_eq!(eval.verdict, Verdict::Approve);
        assert_eq!(eval.quorum_pct, 100);
        assert_eq!(eval.approval_pct, Some(80));
    }

    #[test]
    fn below_quorum_rejects_regardless_of_split() {
        // One voter of 50 out of 250 aggregate: 20% < 33%.
        let eval = engine().evaluate(&round_with(50, 0), 250);
        assert_eq!(eval.verdict, Verdict::Reject);
        assert!(!eval.quorum_met);
        assert_eq!(eval.quorum_pct, 20);
        assert_eq!(eval.approval_pct, None);
    }

    #[test]
    fn approval_boundary_is_inclusive() {
        // 66/100 participating stake approving == threshold → approve.
        let eval = engine().evaluate(&round_with(66, 34), 100);
        assert_eq!(eval.approval_pct, Some(66));
        assert_eq!(eval.verdict, Verdict::Approve);

        // 65% → reject.
        let eval = engine().evaluate(&round_with(65, 35), 100);
        assert_eq!(eval.approval_pct, Some(65));
        assert_eq!(eval.verdict, Verdict::Reject);
    }

    #[test]
    fn truncation_cannot_round_into_approval() {
        // 659/1000 = 65.9% truncates to 65 → reject.
        let eval = engine().evaluate(&round_with(659, 341), 1000);
        assert_eq!(eval.approval_pct, Some(65));
        assert_eq!(eval.verdict, Verdict::Reject);
    }

    #[test]
    fn quorum_boundary_is_inclusive() {
        // Exactly 33% participation meets quorum.
        let eval = engine().evaluate(&round_with(33, 0), 100);
        assert!(eval.quorum_met);
        assert_eq!(eval.verdict, Verdict::Approve); // 100% approval

        // 32% does not.
        let eval = engine().evaluate(&round_with(32, 0), 100);
        assert!(!eval.quorum_met);
    }

    #[test]
    fn empty_round_rejects_without_division() {
        let eval = engine().evaluate(&round_with(0, 0), 250);
        assert_eq!(eval.verdict, Verdict::Reject);
        assert!(!eval.quorum_met);
    }

    #[test]
    fn zero_aggregate_supply_rejects() {
        let eval = engine().evaluate(&round_with(10, 0), 0);
        assert_eq!(eval.verdict, Verdict::Reject);
        assert!(!eval.quorum_met);
    }

    proptest! {
        /// Quorum correctness: whenever participation is below the
        /// threshold, the verdict is reject regardless of the vote split.
        #[test]
        fn below_quorum_always_rejects(
            votes_for in 0u128..1_000_000,
            votes_against in 0u128..1_000_000,
            aggregate in 1u128..10_000_000,
        ) {
            let total = votes_for + votes_against;
            prop_assume!(total * 100 / aggregate < 33);

            let eval = engine().evaluate(&round_with(votes_for, votes_against), aggregate);
            prop_assert_eq!(eval.verdict, Verdict::Reject);
            prop_assert!(!eval.quorum_met);
        }

        /// With quorum met, the verdict tracks the inclusive approval
        /// threshold exactly.
        #[test]
        fn approval_tracks_threshold_when_quorum_met(
            votes_for in 0u128..1_000_000,
            votes_against in 0u128..1_000_000,
        ) {
            let total = votes_for + votes_against;
            prop_assume!(total > 0);

            // Aggregate equal to participation → quorum is always 100%.
            let eval = engine().evaluate(&round_with(votes_for, votes_against), total);
            let expected = if votes_for * 100 / total >= 66 {
                Verdict::Approve
            } else {
                Verdict::Reject
            };
            prop_assert_eq!(eval.verdict, expected);
        }
    }
}
