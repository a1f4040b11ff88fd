//! Stake ledger errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StakeError {
    #[error("stake amount {amount} is below the minimum {min_stake}")]
    BelowMinimumStake { amount: u128, min_stake: u128 },

    #[error("stake is locked for another {remaining_secs}s")]
    LockActive { remaining_secs: u64 },

    #[error("insufficient stake: need {needed}, have {available}")]
    InsufficientStake { needed: u128, available: u128 },

    #[error("no stake account for {0}")]
    UnknownAccount(String),

    #[error("caller lacks the {0} capability")]
    NotAuthorized(&'static str),

    #[error("slash percentage {0} exceeds 100")]
    InvalidPercent(u128),

    #[error("arithmetic overflow in stake accounting")]
    Overflow,
}
