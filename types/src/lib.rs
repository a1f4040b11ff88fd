//! Shared types for the veritas protocol.
//!
//! Everything here is plain data: identifiers, timestamps, protocol
//! parameters, capability sets, and the ledger event vocabulary. No crate in
//! the workspace depends on anything below this one.

pub mod address;
pub mod caller;
pub mod event;
pub mod id;
pub mod params;
pub mod time;

pub use address::Address;
pub use caller::{Caller, Role};
pub use event::{LedgerEvent, SequencedEvent};
pub use id::{ContentHash, QuestionId};
pub use params::{ProtocolParams, FEE_UNIT};
pub use time::Timestamp;
