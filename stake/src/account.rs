//! Per-participant stake account.

use serde::{Deserialize, Serialize};
use veritas_types::{Address, Timestamp};

/// A participant's staking state.
///
/// Created on first stake, never deleted — a fully slashed or fully
/// unstaked account remains at balance zero.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StakeAccount {
    pub owner: Address,
    /// Currently staked balance in raw units.
    pub staked_amount: u128,
    /// Reset on every stake call; unstaking is gated on this plus the
    /// configured lock period.
    pub stake_timestamp: Timestamp,
    /// Accumulated reward credits recorded by the distributor. Withdrawal is
    /// the ledger's payment concern, outside this core.
    pub reward_debt: u128,
}

impl StakeAccount {
    pub fn new(owner: Address, now: Timestamp) -> Self {
        Self {
            owner,
            staked_amount: 0,
            stake_timestamp: now,
            reward_debt: 0,
        }
    }

    /// Seconds until the lock expires, zero if already unlocked.
    pub fn lock_remaining(&self, lock_period_secs: u64, now: Timestamp) -> u64 {
        lock_period_secs.saturating_sub(self.stake_timestamp.elapsed(now))
    }
}
