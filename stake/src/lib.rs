//! Stake ledger for the veritas protocol.
//!
//! Tracks each participant's staked balance and lock-up timing, and exposes
//! the slash/credit surface the distributor uses after a verdict. Balances
//! are `u128` raw units; all mutations use checked arithmetic and refuse to
//! proceed rather than wrap.

pub mod account;
pub mod error;
pub mod ledger;

pub use account::StakeAccount;
pub use error::StakeError;
pub use ledger::StakeLedger;
