//! Voting errors.

use thiserror::Error;
use veritas_stake::StakeError;

#[derive(Debug, Error)]
pub enum VotingError {
    #[error("caller has no stake, cannot vote")]
    NotStaked,

    #[error("{0} already voted in this round")]
    AlreadyVoted(String),

    #[error("voting window has ended")]
    VotingEnded,

    #[error("voting window is still open for another {remaining_secs}s")]
    VotingStillOpen { remaining_secs: u64 },

    #[error("round has already been finalized")]
    AlreadyFinalized,

    #[error("stake ledger rejected a distribution mutation: {0}")]
    Stake(#[from] StakeError),
}
