//! Protocol parameters.
//!
//! All thresholds are whole percentages and all arithmetic downstream is
//! integer-only, so a configuration is reproducible across nodes.

use serde::{Deserialize, Serialize};

/// Raw units per whole fee unit. Fees and rewards are fixed-point `u128`.
pub const FEE_UNIT: u128 = 1_000_000_000;

/// Tunable parameters shared by the ledger-side components and the relay's
/// mirror (which needs the voting window to project round deadlines).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolParams {
    // ── Staking ──────────────────────────────────────────────────────────
    /// Minimum amount accepted by a single `stake` call (raw units).
    pub min_stake: u128,

    /// Seconds a stake is locked after the most recent stake call.
    /// Default: 7 days.
    pub stake_lock_secs: u64,

    // ── Questions ────────────────────────────────────────────────────────
    /// Minimum fee that must accompany a question (raw units).
    pub min_fee: u128,

    /// Maximum question length in bytes.
    pub max_question_len: usize,

    // ── Voting ───────────────────────────────────────────────────────────
    /// Length of the voting window that opens when an answer is recorded.
    pub voting_window_secs: u64,

    /// Minimum participation, as a percentage of the aggregate staked
    /// supply, for a round's outcome to be binding.
    pub quorum_threshold_pct: u128,

    /// Minimum share of participating stake that must approve, inclusive.
    pub approval_threshold_pct: u128,

    // ── Economics ────────────────────────────────────────────────────────
    /// Share of the fee pool distributed to correct voters (percent).
    /// The remainder is retained by the treasury.
    pub reward_percentage_pct: u128,

    /// Share of an incorrect voter's current stake that is slashed (percent).
    pub slash_percentage_pct: u128,
}

impl ProtocolParams {
    /// The reference configuration.
    pub fn reference() -> Self {
        Self {
            min_stake: FEE_UNIT,
            stake_lock_secs: 7 * 24 * 3600,
            min_fee: FEE_UNIT / 10,
            max_question_len: 2048,
            voting_window_secs: 24 * 3600,
            quorum_threshold_pct: 33,
            approval_threshold_pct: 66,
            reward_percentage_pct: 5,
            slash_percentage_pct: 20,
        }
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_thresholds_match_protocol_constants() {
        let p = ProtocolParams::reference();
        assert_eq!(p.quorum_threshold_pct, 33);
        assert_eq!(p.approval_threshold_pct, 66);
        assert_eq!(p.slash_percentage_pct, 20);
        assert_eq!(p.reward_percentage_pct, 5);
        assert_eq!(p.stake_lock_secs, 604_800);
    }
}
