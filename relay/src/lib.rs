//! The veritas event relay.
//!
//! Polls the ledger's append-only event log, applies idempotent upserts into
//! a rebuildable read model, and drives the off-chain side of the lifecycle:
//! requesting AI answers, submitting them back through the relayer role, and
//! sweeping closed rounds into finalization. The relay never decides
//! verdicts — it mirrors state and kicks off side effects.
//!
//! Exactly one relay instance should run the loops at a time; the mirror
//! upserts stay safe under concurrent delivery regardless, since the ledger
//! log is consumed at-least-once.

pub mod backlog;
pub mod config;
pub mod error;
pub mod external;
pub mod inflight;
pub mod logging;
pub mod metrics;
pub mod mirror;
pub mod relay;
pub mod rpc;

pub use backlog::RetryBacklog;
pub use config::RelayConfig;
pub use error::RelayError;
pub use external::{
    build_services, AnswerStore, InferenceClient, InferenceRequest, InferenceResult,
    MockAnswerStore, MockInferenceClient, StoredAnswer,
};
pub use inflight::InflightTracker;
pub use metrics::RelayMetrics;
pub use mirror::{AnswerRow, Mirror, QuestionRow, RoundRow, VoteRow};
pub use relay::{EventRelay, RelayStatus};
pub use rpc::{AnswerSubmission, FinalizeAck, HttpLedgerRpc, LedgerRpc};
