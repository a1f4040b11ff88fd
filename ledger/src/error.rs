//! Ledger errors — a thin wrapper over the component errors so callers see
//! one type at the operation boundary.

use thiserror::Error;
use veritas_registry::RegistryError;
use veritas_stake::StakeError;
use veritas_voting::VotingError;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no voting round for question {0}")]
    NoSuchRound(String),

    #[error(transparent)]
    Stake(#[from] StakeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Voting(#[from] VotingError),
}
