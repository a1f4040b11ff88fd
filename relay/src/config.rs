//! Relay configuration with TOML file support.

use crate::error::RelayError;
use serde::{Deserialize, Serialize};

/// Configuration for a relay instance.
///
/// Can be loaded from a TOML file via [`RelayConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Base URL of the ledger RPC endpoint.
    #[serde(default = "default_ledger_rpc_url")]
    pub ledger_rpc_url: String,

    /// Base URL of the AI inference service.
    #[serde(default = "default_inference_url")]
    pub inference_url: String,

    /// Base URL of the content storage service.
    #[serde(default = "default_storage_url")]
    pub storage_url: String,

    /// Use the in-process mock collaborators instead of HTTP.
    /// Selected once at startup — there is no per-call branching.
    #[serde(default)]
    pub use_mock_services: bool,

    /// Seconds between event-log polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Seconds between finalization sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Seconds between backlog retry scans.
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,

    /// Maximum events fetched per poll.
    #[serde(default = "default_event_batch_size")]
    pub event_batch_size: usize,

    /// Capacity of the poll → applier channel. A full channel back-pressures
    /// the poller instead of growing without bound.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Timeout for outbound HTTP calls (ledger RPC, inference, storage).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Give up on a question's inference after this many attempts.
    #[serde(default = "default_max_inference_attempts")]
    pub max_inference_attempts: u32,

    /// First retry delay; doubles per attempt.
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_secs: u64,

    /// Backoff ceiling.
    #[serde(default = "default_retry_max_delay")]
    pub retry_max_delay_secs: u64,

    /// In-flight inference markers older than this are considered abandoned
    /// (e.g. a crash mid-request) and may be re-claimed.
    #[serde(default = "default_inflight_stale")]
    pub inflight_stale_secs: u64,

    /// Voting window used to project round deadlines into the mirror.
    /// Must match the ledger's protocol parameter.
    #[serde(default = "default_voting_window")]
    pub voting_window_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_ledger_rpc_url() -> String {
    "http://127.0.0.1:7091".to_string()
}

fn default_inference_url() -> String {
    "http://127.0.0.1:7092".to_string()
}

fn default_storage_url() -> String {
    "http://127.0.0.1:7093".to_string()
}

fn default_poll_interval() -> u64 {
    2
}

fn default_sweep_interval() -> u64 {
    10
}

fn default_retry_interval() -> u64 {
    15
}

fn default_event_batch_size() -> usize {
    256
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_inference_attempts() -> u32 {
    8
}

fn default_retry_base_delay() -> u64 {
    5
}

fn default_retry_max_delay() -> u64 {
    900
}

fn default_inflight_stale() -> u64 {
    600
}

fn default_voting_window() -> u64 {
    24 * 3600
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl RelayConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, RelayError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| RelayError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, RelayError> {
        toml::from_str(s).map_err(|e| RelayError::Config(e.to_string()))
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::from_toml_str("").expect("empty config parses to defaults")
    }
}
