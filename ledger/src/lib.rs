//! The authoritative veritas ledger.
//!
//! Single writer for all authoritative state: it owns the stake ledger, the
//! question registry, and the per-question voting rounds, serialises every
//! mutation through `&mut self`, and appends one sequenced event per
//! accepted transition. The off-chain relay treats this event log as its
//! source of truth and can rebuild its mirror from it at any time.

pub mod error;
pub mod ledger;

pub use error::LedgerError;
pub use ledger::{FinalizeReport, Ledger};
