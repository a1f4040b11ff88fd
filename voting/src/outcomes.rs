//! Reward and slash distribution.
//!
//! Correct voters split a fixed share of the fee pool **equally** — the
//! protocol rewards participation, not size. Incorrect voters are slashed a
//! fixed percentage of their current stake, which *is* size-proportional.
//! The asymmetry is deliberate and preserved as specified.
//!
//! [`compute_distribution`] is pure; [`apply_distribution`] performs the
//! stake mutations through the Distributor capability. The ledger calls
//! both inside its finalize transition so payout and finalization commit
//! together.

use crate::engine::Verdict;
use crate::error::VotingError;
use crate::round::Vote;
use serde::{Deserialize, Serialize};
use veritas_stake::StakeLedger;
use veritas_types::{Address, Caller, ProtocolParams};

/// A computed distribution, not yet applied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Distribution {
    pub approved: bool,
    /// Equal-share payouts to correct voters.
    pub payouts: Vec<(Address, u128)>,
    /// Voters to be slashed (voted against the verdict).
    pub slashed_voters: Vec<Address>,
    /// Slash percentage to apply to each incorrect voter's current stake.
    pub slash_percentage_pct: u128,
    /// Portion of the pool retained by the fee treasury: the undistributed
    /// share plus any integer-division remainder.
    pub treasury_cut: u128,
    /// The escrowed pool this distribution was computed from.
    pub reward_pool: u128,
}

/// Result of applying a distribution to the stake ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedDistribution {
    /// Reward actually credited per correct voter.
    pub rewards: Vec<(Address, u128)>,
    /// Stake actually removed per slashed voter.
    pub slashes: Vec<(Address, u128)>,
    pub treasury_cut: u128,
}

/// Compute who gets paid and who gets slashed for a verdict.
///
/// Conservation holds exactly: `Σ payouts + treasury_cut == reward_pool`.
/// With zero correct voters the entire pool is retained by the treasury.
pub fn compute_distribution(
    verdict: Verdict,
    votes: &[Vote],
    reward_pool: u128,
    params: &ProtocolParams,
) -> Distribution {
    let approved = verdict.is_approve();

    let correct: Vec<&Vote> = votes.iter().filter(|v| v.approved == approved).collect();
    let slashed_voters: Vec<Address> = votes
        .iter()
        .filter(|v| v.approved != approved)
        .map(|v| v.voter.clone())
        .collect();

    let distributable = reward_pool * params.reward_percentage_pct / 100;
    let (payouts, paid_out) = if correct.is_empty() {
        (Vec::new(), 0)
    } else {
        let share = distributable / correct.len() as u128;
        let payouts: Vec<(Address, u128)> = correct
            .iter()
            .map(|v| (v.voter.clone(), share))
            .collect();
        let paid_out = share * correct.len() as u128;
        (payouts, paid_out)
    };

    Distribution {
        approved,
        payouts,
        slashed_voters,
        slash_percentage_pct: params.slash_percentage_pct,
        treasury_cut: reward_pool - paid_out,
        reward_pool,
    }
}

/// Apply a computed distribution through the stake ledger.
///
/// The caller must hold the Distributor capability; that is verified before
/// any mutation so a denied call leaves the ledger untouched. Slashing a
/// voter who has since unstaked to zero is a no-op by the stake ledger's
/// contract, so the application cannot fail half-way on ordinary input.
pub fn apply_distribution(
    distribution: &Distribution,
    stake: &mut StakeLedger,
    caller: &Caller,
) -> Result<AppliedDistribution, VotingError> {
    if !caller.has_role(veritas_types::Role::Distributor) {
        return Err(VotingError::Stake(veritas_stake::StakeError::NotAuthorized(
            "Distributor",
        )));
    }

    let mut slashes = Vec::with_capacity(distribution.slashed_voters.len());
    for voter in &distribution.slashed_voters {
        let removed = stake.slash(caller, voter, distribution.slash_percentage_pct)?;
        slashes.push((voter.clone(), removed));
    }

    let mut rewards = Vec::with_capacity(distribution.payouts.len());
    for (voter, amount) in &distribution.payouts {
        stake.credit_reward(caller, voter, *amount)?;
        rewards.push((voter.clone(), *amount));
    }

    Ok(AppliedDistribution {
        rewards,
        slashes,
        treasury_cut: distribution.treasury_cut,
    })
}
