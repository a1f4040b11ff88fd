//! External collaborator boundaries: AI inference and content storage.
//!
//! One interface each, two implementations each (HTTP and mock), selected
//! once at startup from configuration. A failure here never corrupts
//! registry state — the caller either retries through the backlog or leaves
//! the question pending.

use crate::config::RelayConfig;
use crate::error::RelayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use veritas_types::{ContentHash, QuestionId};

/// What the relay sends to the inference service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// Doubles as the idempotency key for the job.
    pub question_id: QuestionId,
    pub question_text: String,
    pub reference_urls: Vec<String>,
}

/// What comes back: the answer and its provenance hashes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceResult {
    pub answer_text: String,
    pub model_hash: ContentHash,
    pub input_hash: ContentHash,
    pub output_hash: ContentHash,
}

/// Receipt from the content store; `content_hash` is carried verbatim into
/// the recorded answer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredAnswer {
    pub content_hash: ContentHash,
    pub retrieval_url: String,
}

/// The AI compute boundary.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn submit_inference_job(
        &self,
        request: &InferenceRequest,
    ) -> Result<InferenceResult, RelayError>;
}

/// The content-addressed storage boundary. Write path only; retrieval is a
/// read concern outside the relay.
#[async_trait]
pub trait AnswerStore: Send + Sync {
    async fn store_answer(&self, payload: &[u8]) -> Result<StoredAnswer, RelayError>;
}

/// Build the collaborator pair the configuration asks for. The mock/real
/// decision happens exactly here, once.
pub fn build_services(
    config: &RelayConfig,
) -> Result<(Arc<dyn InferenceClient>, Arc<dyn AnswerStore>), RelayError> {
    if config.use_mock_services {
        Ok((
            Arc::new(MockInferenceClient::default()),
            Arc::new(MockAnswerStore),
        ))
    } else {
        Ok((
            Arc::new(HttpInferenceClient::new(
                &config.inference_url,
                config.request_timeout_secs,
            )?),
            Arc::new(HttpAnswerStore::new(
                &config.storage_url,
                config.request_timeout_secs,
            )?),
        ))
    }
}

// ── HTTP implementations ────────────────────────────────────────────────

pub struct HttpInferenceClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInferenceClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RelayError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn submit_inference_job(
        &self,
        request: &InferenceRequest,
    ) -> Result<InferenceResult, RelayError> {
        self.client
            .post(format!("{}/v1/inference", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| RelayError::Inference(e.to_string()))?
            .error_for_status()
            .map_err(|e| RelayError::Inference(e.to_string()))?
            .json()
            .await
            .map_err(|e| RelayError::Inference(e.to_string()))
    }
}

pub struct HttpAnswerStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnswerStore {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RelayError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AnswerStore for HttpAnswerStore {
    async fn store_answer(&self, payload: &[u8]) -> Result<StoredAnswer, RelayError> {
        self.client
            .post(format!("{}/v1/content", self.base_url))
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|e| RelayError::Storage(e.to_string()))?
            .error_for_status()
            .map_err(|e| RelayError::Storage(e.to_string()))?
            .json()
            .await
            .map_err(|e| RelayError::Storage(e.to_string()))
    }
}

// ── Mock implementations ────────────────────────────────────────────────

/// Deterministic in-process inference: answers are derived from the
/// question text, provenance hashes from fixed domain tags. Used by tests
/// and local development.
#[derive(Default)]
pub struct MockInferenceClient;

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn submit_inference_job(
        &self,
        request: &InferenceRequest,
    ) -> Result<InferenceResult, RelayError> {
        let answer_text = format!("mock answer: {}", request.question_text);
        Ok(InferenceResult {
            model_hash: ContentHash::of(b"mock-model"),
            input_hash: ContentHash::of(request.question_text.as_bytes()),
            output_hash: ContentHash::of(answer_text.as_bytes()),
            answer_text,
        })
    }
}

/// Content-addressed in-process storage: hashes the payload and fabricates
/// a retrieval URL from it.
pub struct MockAnswerStore;

#[async_trait]
impl AnswerStore for MockAnswerStore {
    async fn store_answer(&self, payload: &[u8]) -> Result<StoredAnswer, RelayError> {
        let content_hash = ContentHash::of(payload);
        Ok(StoredAnswer {
            retrieval_url: format!("mock://content/{content_hash}"),
            content_hash,
        })
    }
}
