//! Voting core for the veritas protocol.
//!
//! Three pieces, kept deliberately separable:
//! - [`round`] — the per-question voting round state machine,
//! - [`engine`] — pure quorum/approval evaluation of a closed round,
//! - [`outcomes`] — reward/slash distribution computed from the verdict and
//!   applied through the stake ledger's capability surface.

pub mod engine;
pub mod error;
pub mod outcomes;
pub mod round;

pub use engine::{ConsensusEngine, Evaluation, Verdict};
pub use error::VotingError;
pub use outcomes::{AppliedDistribution, Distribution, compute_distribution, apply_distribution};
pub use round::{RoundPhase, Vote, VotingRound};
