//! The stake ledger — balances, lock-up gating, slash/credit surface.

use crate::account::StakeAccount;
use crate::error::StakeError;
use std::collections::HashMap;
use veritas_types::{Address, Caller, ProtocolParams, Role, Timestamp};

/// Tracks all stake accounts plus the aggregate staked supply.
///
/// The aggregate is maintained incrementally so quorum evaluation is O(1);
/// it is the denominator of the quorum calculation and must therefore stay
/// exactly in sync with the per-account balances.
pub struct StakeLedger {
    accounts: HashMap<Address, StakeAccount>,
    aggregate: u128,
    min_stake: u128,
    lock_period_secs: u64,
}

impl StakeLedger {
    pub fn new(params: &ProtocolParams) -> Self {
        Self {
            accounts: HashMap::new(),
            aggregate: 0,
            min_stake: params.min_stake,
            lock_period_secs: params.stake_lock_secs,
        }
    }

    /// Add stake for `owner`, creating the account on first use.
    ///
    /// Every successful stake resets the lock clock.
    pub fn stake(
        &mut self,
        owner: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), StakeError> {
        if amount < self.min_stake {
            return Err(StakeError::BelowMinimumStake {
                amount,
                min_stake: self.min_stake,
            });
        }
        let account = self
            .accounts
            .entry(owner.clone())
            .or_insert_with(|| StakeAccount::new(owner.clone(), now));
        account.staked_amount = account
            .staked_amount
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;
        account.stake_timestamp = now;
        self.aggregate = self.aggregate.checked_add(amount).ok_or(StakeError::Overflow)?;
        Ok(())
    }

    /// Withdraw stake once the lock period has elapsed.
    pub fn unstake(
        &mut self,
        owner: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), StakeError> {
        let lock_period = self.lock_period_secs;
        let account = self
            .accounts
            .get_mut(owner)
            .ok_or_else(|| StakeError::UnknownAccount(owner.to_string()))?;
        let remaining = account.lock_remaining(lock_period, now);
        if remaining > 0 {
            return Err(StakeError::LockActive {
                remaining_secs: remaining,
            });
        }
        if account.staked_amount < amount {
            return Err(StakeError::InsufficientStake {
                needed: amount,
                available: account.staked_amount,
            });
        }
        account.staked_amount -= amount;
        self.aggregate -= amount;
        Ok(())
    }

    /// Slash `percent` of the owner's *current* balance.
    ///
    /// Distributor capability required. A missing or empty account is a
    /// no-op returning zero, never an error — the distributor must be able
    /// to sweep a voter who already unstaked. Returns the amount removed.
    pub fn slash(
        &mut self,
        caller: &Caller,
        owner: &Address,
        percent: u128,
    ) -> Result<u128, StakeError> {
        if !caller.has_role(Role::Distributor) {
            return Err(StakeError::NotAuthorized("Distributor"));
        }
        if percent > 100 {
            return Err(StakeError::InvalidPercent(percent));
        }
        let Some(account) = self.accounts.get_mut(owner) else {
            return Ok(0);
        };
        let slashed = account.staked_amount * percent / 100;
        account.staked_amount -= slashed;
        self.aggregate -= slashed;
        Ok(slashed)
    }

    /// Record a reward credit on the owner's account.
    pub fn credit_reward(
        &mut self,
        caller: &Caller,
        owner: &Address,
        amount: u128,
    ) -> Result<(), StakeError> {
        if !caller.has_role(Role::Distributor) {
            return Err(StakeError::NotAuthorized("Distributor"));
        }
        let account = self
            .accounts
            .get_mut(owner)
            .ok_or_else(|| StakeError::UnknownAccount(owner.to_string()))?;
        account.reward_debt = account
            .reward_debt
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;
        Ok(())
    }

    /// Current staked balance, zero for unknown owners.
    pub fn balance_of(&self, owner: &Address) -> u128 {
        self.accounts
            .get(owner)
            .map(|a| a.staked_amount)
            .unwrap_or(0)
    }

    /// Aggregate staked supply across all accounts.
    pub fn total_staked(&self) -> u128 {
        self.aggregate
    }

    pub fn account(&self, owner: &Address) -> Option<&StakeAccount> {
        self.accounts.get(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_types::FEE_UNIT;

    fn addr(n: u8) -> Address {
        Address::new(format!("vrt_{:0>8}", n))
    }

    fn distributor() -> Caller {
        Caller::with_roles(addr(200), [Role::Distributor])
    }

    fn ledger() -> StakeLedger {
        let mut params = ProtocolParams::reference();
        params.min_stake = 10;
        params.stake_lock_secs = 100;
        StakeLedger::new(&params)
    }

    #[test]
    fn first_stake_creates_account() {
        let mut sl = ledger();
        sl.stake(&addr(1), 50, Timestamp::new(1000)).unwrap();
        assert_eq!(sl.balance_of(&addr(1)), 50);
        assert_eq!(sl.total_staked(), 50);
        assert_eq!(sl.account(&addr(1)).unwrap().stake_timestamp, Timestamp::new(1000));
    }

    #[test]
    fn stake_below_minimum_rejected() {
        let mut sl = ledger();
        let err = sl.stake(&addr(1), 9, Timestamp::new(0)).unwrap_err();
        assert!(matches!(
            err,
            StakeError::BelowMinimumStake { amount: 9, min_stake: 10 }
        ));
        assert_eq!(sl.balance_of(&addr(1)), 0);
    }

    #[test]
    fn restaking_resets_lock_clock() {
        let mut sl = ledger();
        sl.stake(&addr(1), 50, Timestamp::new(0)).unwrap();
        sl.stake(&addr(1), 50, Timestamp::new(90)).unwrap();

        // 100s lock from the second stake: at t=150 still locked.
        let err = sl.unstake(&addr(1), 10, Timestamp::new(150)).unwrap_err();
        assert!(matches!(err, StakeError::LockActive { remaining_secs: 40 }));
    }

    #[test]
    fn unstake_after_lock_succeeds() {
        let mut sl = ledger();
        sl.stake(&addr(1), 50, Timestamp::new(0)).unwrap();
        sl.unstake(&addr(1), 20, Timestamp::new(100)).unwrap();
        assert_eq!(sl.balance_of(&addr(1)), 30);
        assert_eq!(sl.total_staked(), 30);
    }

    #[test]
    fn unstake_more_than_staked_rejected() {
        let mut sl = ledger();
        sl.stake(&addr(1), 50, Timestamp::new(0)).unwrap();
        let err = sl.unstake(&addr(1), 60, Timestamp::new(200)).unwrap_err();
        assert!(matches!(
            err,
            StakeError::InsufficientStake { needed: 60, available: 50 }
        ));
    }

    #[test]
    fn slash_removes_percentage_of_current_balance() {
        let mut sl = ledger();
        sl.stake(&addr(1), 50, Timestamp::new(0)).unwrap();
        let slashed = sl.slash(&distributor(), &addr(1), 20).unwrap();
        assert_eq!(slashed, 10);
        assert_eq!(sl.balance_of(&addr(1)), 40);
        assert_eq!(sl.total_staked(), 40);
    }

    #[test]
    fn slash_requires_distributor_capability() {
        let mut sl = ledger();
        sl.stake(&addr(1), 50, Timestamp::new(0)).unwrap();
        let caller = Caller::participant(addr(2));
        let err = sl.slash(&caller, &addr(1), 20).unwrap_err();
        assert!(matches!(err, StakeError::NotAuthorized("Distributor")));
        assert_eq!(sl.balance_of(&addr(1)), 50);
    }

    #[test]
    fn slash_unknown_or_empty_account_is_noop() {
        let mut sl = ledger();
        assert_eq!(sl.slash(&distributor(), &addr(9), 20).unwrap(), 0);

        sl.stake(&addr(1), 10, Timestamp::new(0)).unwrap();
        sl.unstake(&addr(1), 10, Timestamp::new(100)).unwrap();
        assert_eq!(sl.slash(&distributor(), &addr(1), 20).unwrap(), 0);
        assert_eq!(sl.balance_of(&addr(1)), 0);
    }

    #[test]
    fn slash_never_goes_negative() {
        let mut sl = ledger();
        sl.stake(&addr(1), 10, Timestamp::new(0)).unwrap();
        let slashed = sl.slash(&distributor(), &addr(1), 100).unwrap();
        assert_eq!(slashed, 10);
        assert_eq!(sl.balance_of(&addr(1)), 0);
    }

    #[test]
    fn slash_percent_over_100_rejected() {
        let mut sl = ledger();
        let err = sl.slash(&distributor(), &addr(1), 101).unwrap_err();
        assert!(matches!(err, StakeError::InvalidPercent(101)));
    }

    #[test]
    fn credit_reward_accumulates() {
        let mut sl = ledger();
        sl.stake(&addr(1), 50, Timestamp::new(0)).unwrap();
        sl.credit_reward(&distributor(), &addr(1), 5).unwrap();
        sl.credit_reward(&distributor(), &addr(1), 7).unwrap();
        assert_eq!(sl.account(&addr(1)).unwrap().reward_debt, 12);
        // Credits do not touch the staked balance.
        assert_eq!(sl.balance_of(&addr(1)), 50);
    }

    #[test]
    fn credit_reward_requires_account() {
        let mut sl = ledger();
        let err = sl.credit_reward(&distributor(), &addr(1), 5).unwrap_err();
        assert!(matches!(err, StakeError::UnknownAccount(_)));
    }

    #[test]
    fn aggregate_tracks_all_accounts() {
        let mut sl = ledger();
        sl.stake(&addr(1), 100, Timestamp::new(0)).unwrap();
        sl.stake(&addr(2), 100, Timestamp::new(0)).unwrap();
        sl.stake(&addr(3), 50, Timestamp::new(0)).unwrap();
        assert_eq!(sl.total_staked(), 250);

        sl.slash(&distributor(), &addr(3), 20).unwrap();
        assert_eq!(sl.total_staked(), 240);
    }

    #[test]
    fn min_stake_uses_reference_default() {
        let sl = StakeLedger::new(&ProtocolParams::reference());
        assert_eq!(sl.min_stake, FEE_UNIT);
    }
}
