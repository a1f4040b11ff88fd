//! The ledger RPC boundary.
//!
//! The relay reads the event log and writes answers/finalizations through
//! this trait. The HTTP implementation talks JSON with explicit timeouts;
//! tests drive an in-process implementation wrapping the ledger directly.

use crate::error::RelayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use veritas_types::{ContentHash, QuestionId, SequencedEvent};

/// An answer ready to be recorded on the ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: QuestionId,
    pub text: String,
    pub storage_hash: ContentHash,
    pub model_hash: ContentHash,
    pub input_hash: ContentHash,
    pub output_hash: ContentHash,
}

/// Outcome of a finalize call.
///
/// `AlreadyFinalized` is a first-class success so the sweep can race a
/// manual trigger (or another sweep tick) without treating the loss as an
/// error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalizeAck {
    Finalized { approved: bool },
    AlreadyFinalized,
}

/// Read/write surface of the ledger as seen by the relay.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Highest sequence number in the ledger's event log.
    async fn head_sequence(&self) -> Result<u64, RelayError>;

    /// Events with `sequence ≥ from`, up to `limit`, in order.
    async fn fetch_events(
        &self,
        from: u64,
        limit: usize,
    ) -> Result<Vec<SequencedEvent>, RelayError>;

    /// Record an answer (relayer role on the ledger side).
    async fn submit_answer(&self, submission: &AnswerSubmission) -> Result<(), RelayError>;

    /// Trigger finalization of a closed round.
    async fn finalize(&self, question_id: QuestionId) -> Result<FinalizeAck, RelayError>;
}

// ── HTTP implementation ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct HeadResponse {
    head_sequence: u64,
}

#[derive(Deserialize)]
struct EventsResponse {
    events: Vec<SequencedEvent>,
}

/// [`LedgerRpc`] over HTTP/JSON.
pub struct HttpLedgerRpc {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLedgerRpc {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RelayError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl LedgerRpc for HttpLedgerRpc {
    async fn head_sequence(&self) -> Result<u64, RelayError> {
        let resp: HeadResponse = self
            .client
            .get(self.url("/v1/events/head"))
            .send()
            .await
            .map_err(|e| RelayError::Rpc(e.to_string()))?
            .error_for_status()
            .map_err(|e| RelayError::Rpc(e.to_string()))?
            .json()
            .await
            .map_err(|e| RelayError::Rpc(e.to_string()))?;
        Ok(resp.head_sequence)
    }

    async fn fetch_events(
        &self,
        from: u64,
        limit: usize,
    ) -> Result<Vec<SequencedEvent>, RelayError> {
        let resp: EventsResponse = self
            .client
            .get(self.url("/v1/events"))
            .query(&[("from", from.to_string()), ("limit", limit.to_string())])
            .send()
            .await
            .map_err(|e| RelayError::Rpc(e.to_string()))?
            .error_for_status()
            .map_err(|e| RelayError::Rpc(e.to_string()))?
            .json()
            .await
            .map_err(|e| RelayError::Rpc(e.to_string()))?;
        Ok(resp.events)
    }

    async fn submit_answer(&self, submission: &AnswerSubmission) -> Result<(), RelayError> {
        self.client
            .post(self.url("/v1/answers"))
            .json(submission)
            .send()
            .await
            .map_err(|e| RelayError::Rpc(e.to_string()))?
            .error_for_status()
            .map_err(|e| RelayError::Rpc(e.to_string()))?;
        Ok(())
    }

    async fn finalize(&self, question_id: QuestionId) -> Result<FinalizeAck, RelayError> {
        let ack: FinalizeAck = self
            .client
            .post(self.url("/v1/finalize"))
            .json(&serde_json::json!({ "question_id": question_id }))
            .send()
            .await
            .map_err(|e| RelayError::Rpc(e.to_string()))?
            .error_for_status()
            .map_err(|e| RelayError::Rpc(e.to_string()))?
            .json()
            .await
            .map_err(|e| RelayError::Rpc(e.to_string()))?;
        Ok(ack)
    }
}
