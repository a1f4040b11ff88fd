//! The relay orchestrator: poll loop, applier, sweeps, and admin surface.

use crate::backlog::RetryBacklog;
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::external::{AnswerStore, InferenceClient, InferenceRequest};
use crate::inflight::InflightTracker;
use crate::metrics::RelayMetrics;
use crate::mirror::Mirror;
use crate::rpc::{AnswerSubmission, FinalizeAck, LedgerRpc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use veritas_store::MirrorStore;
use veritas_types::{Caller, LedgerEvent, QuestionId, Role, SequencedEvent, Timestamp};

/// Operational snapshot for the admin surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayStatus {
    pub is_running: bool,
    /// The persisted cursor — highest event sequence applied.
    pub last_processed_block: u64,
    pub backlog_size: usize,
}

/// The event relay.
///
/// A cheap-to-clone handle over shared state: every background task owns a
/// clone, and [`EventRelay::shutdown`] reaches all of them through the
/// broadcast channel. The poller feeds the applier through a bounded
/// channel, so a slow applier back-pressures polling instead of buffering
/// without limit.
#[derive(Clone)]
pub struct EventRelay {
    config: RelayConfig,
    rpc: Arc<dyn LedgerRpc>,
    inference: Arc<dyn InferenceClient>,
    answer_store: Arc<dyn AnswerStore>,
    mirror: Arc<Mirror>,
    inflight: Arc<InflightTracker>,
    backlog: Arc<Mutex<RetryBacklog>>,
    metrics: Arc<RelayMetrics>,
    shutdown_tx: broadcast::Sender<()>,
    running: Arc<AtomicBool>,
}

impl EventRelay {
    pub fn new(
        config: RelayConfig,
        rpc: Arc<dyn LedgerRpc>,
        inference: Arc<dyn InferenceClient>,
        answer_store: Arc<dyn AnswerStore>,
        store: Arc<dyn MirrorStore>,
    ) -> Self {
        let mirror = Arc::new(Mirror::new(Arc::clone(&store), config.voting_window_secs));
        let inflight = Arc::new(InflightTracker::new(store, config.inflight_stale_secs));
        let backlog = Arc::new(Mutex::new(RetryBacklog::new(
            config.queue_capacity,
            config.retry_base_delay_secs,
            config.retry_max_delay_secs,
            config.max_inference_attempts,
        )));
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            rpc,
            inference,
            answer_store,
            mirror,
            inflight,
            backlog,
            metrics: Arc::new(RelayMetrics::new()),
            shutdown_tx,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    // ── Admin surface ───────────────────────────────────────────────────

    pub async fn status(&self) -> RelayStatus {
        RelayStatus {
            is_running: self.running.load(Ordering::SeqCst),
            last_processed_block: self.mirror.cursor().unwrap_or(0),
            backlog_size: self.backlog.lock().await.len(),
        }
    }

    /// Rewind the cursor so the next polls replay from `from_sequence`.
    /// Replay is duplicate-safe: every mirror write is an upsert.
    pub fn resync(&self, caller: &Caller, from_sequence: u64) -> Result<(), RelayError> {
        if !caller.has_role(Role::Admin) {
            return Err(RelayError::NotAuthorized("Admin"));
        }
        let target = from_sequence.saturating_sub(1);
        self.mirror.set_cursor(target)?;
        self.metrics.cursor.set(target as i64);
        tracing::info!(from_sequence, "cursor rewound for resync");
        Ok(())
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
    }

    // ── Event application ───────────────────────────────────────────────

    /// Apply one event to the mirror, run its side effects, then advance
    /// the cursor. On error the cursor stays put and the next poll
    /// refetches the same range.
    pub async fn apply_event(&self, event: &SequencedEvent) -> Result<(), RelayError> {
        self.mirror.apply(event)?;
        self.metrics.events_processed.inc();

        match &event.event {
            LedgerEvent::QuestionSubmitted {
                question_id,
                text,
                reference_urls,
                ..
            } => {
                self.maybe_request_inference(*question_id, text.clone(), reference_urls.clone())
                    .await?;
            }
            LedgerEvent::AnswerSubmitted { question_id, .. } => {
                // The question is answered on the ledger: the in-flight
                // claim has served its purpose and any pending retry is moot.
                self.inflight.release(question_id)?;
                let mut backlog = self.backlog.lock().await;
                backlog.remove(question_id);
                self.metrics.backlog_size.set(backlog.len() as i64);
            }
            LedgerEvent::VoteCast { .. } | LedgerEvent::VotingFinalized { .. } => {}
        }

        // Strictly sequential advance: a redelivered older event leaves the
        // cursor alone, and an event past a gap (an earlier application
        // failed) cannot skip it — the next poll refetches from the gap.
        let cursor = self.mirror.cursor()?;
        if event.sequence == cursor + 1 {
            self.mirror.set_cursor(event.sequence)?;
            self.metrics.cursor.set(event.sequence as i64);
        }
        Ok(())
    }

    /// Fetch and apply the next batch. Returns how many events were applied.
    pub async fn poll_once(&self) -> Result<usize, RelayError> {
        let cursor = self.mirror.cursor()?;
        let events = self
            .rpc
            .fetch_events(cursor + 1, self.config.event_batch_size)
            .await?;
        let count = events.len();
        for event in &events {
            self.apply_event(event).await?;
        }
        Ok(count)
    }

    // ── Inference pipeline ──────────────────────────────────────────────

    /// Start an inference job for a question unless one is already in
    /// flight or an answer already exists. Fire-and-continue: the job runs
    /// detached, failure lands in the retry backlog.
    async fn maybe_request_inference(
        &self,
        question_id: QuestionId,
        question_text: String,
        reference_urls: Vec<String>,
    ) -> Result<(), RelayError> {
        if self.mirror.answer(&question_id)?.is_some() {
            return Ok(());
        }
        if let Some(question) = self.mirror.question(&question_id)? {
            if question.answered {
                return Ok(());
            }
        }
        if !self.inflight.try_claim(&question_id, Timestamp::now())? {
            tracing::debug!(question = %question_id, "inference already in flight");
            return Ok(());
        }

        self.metrics.inference_started.inc();
        let relay = self.clone();
        let request = InferenceRequest {
            question_id,
            question_text,
            reference_urls,
        };
        tokio::spawn(async move {
            if let Err(e) = relay.run_inference(&request).await {
                relay.handle_inference_failure(&request.question_id, e).await;
            }
        });
        Ok(())
    }

    async fn handle_inference_failure(&self, question_id: &QuestionId, error: RelayError) {
        tracing::warn!(question = %question_id, error = %error, "inference pipeline failed");
        self.metrics.inference_failed.inc();
        if let Err(e) = self.inflight.release(question_id) {
            tracing::error!(question = %question_id, error = %e, "failed to release in-flight marker");
        }
        let mut backlog = self.backlog.lock().await;
        if !backlog.push_failed(*question_id, Timestamp::now()) {
            tracing::warn!(question = %question_id, "retry backlog rejected entry");
        }
        self.metrics.backlog_size.set(backlog.len() as i64);
    }

    /// The inference pipeline body: compute → store → submit.
    ///
    /// On success the in-flight marker is left in place; it is released when
    /// the resulting `AnswerSubmitted` event comes back around, which keeps
    /// the idempotency window closed across the round-trip.
    pub async fn run_inference(&self, request: &InferenceRequest) -> Result<(), RelayError> {
        let result = self.inference.submit_inference_job(request).await?;
        let stored = self
            .answer_store
            .store_answer(result.answer_text.as_bytes())
            .await?;
        self.rpc
            .submit_answer(&AnswerSubmission {
                question_id: request.question_id,
                text: result.answer_text,
                storage_hash: stored.content_hash,
                model_hash: result.model_hash,
                input_hash: result.input_hash,
                output_hash: result.output_hash,
            })
            .await?;
        self.metrics.answers_submitted.inc();
        tracing::info!(question = %request.question_id, storage = %stored.retrieval_url, "answer submitted");
        Ok(())
    }

    /// Retry backlogged inference requests whose backoff has elapsed.
    pub async fn retry_once(&self, now: Timestamp) -> Result<usize, RelayError> {
        let due = {
            let mut backlog = self.backlog.lock().await;
            backlog.drain_due(now)
        };
        let mut attempted = 0;
        for entry in due {
            let id = entry.question_id;

            // The question may have been answered since the failure.
            let Some(question) = self.mirror.question(&id)? else {
                continue;
            };
            if question.answered || self.mirror.answer(&id)?.is_some() {
                continue;
            }
            if !self.inflight.try_claim(&id, now)? {
                continue;
            }

            attempted += 1;
            let request = InferenceRequest {
                question_id: id,
                question_text: question.text,
                reference_urls: question.reference_urls,
            };
            if let Err(e) = self.run_inference(&request).await {
                tracing::warn!(question = %id, attempts = entry.attempts, error = %e, "inference retry failed");
                self.metrics.inference_failed.inc();
                self.inflight.release(&id)?;
                let mut backlog = self.backlog.lock().await;
                if !backlog.reschedule(entry, now) {
                    tracing::warn!(question = %id, "giving up on inference after repeated failures");
                }
            }
        }
        let backlog = self.backlog.lock().await;
        self.metrics.backlog_size.set(backlog.len() as i64);
        Ok(attempted)
    }

    // ── Finalization sweep ──────────────────────────────────────────────

    /// Invoke finalization for every mirror round that is closed but not
    /// yet finalized. Racing another trigger is benign: the ledger answers
    /// `AlreadyFinalized` and the sweep moves on.
    pub async fn sweep_once(&self, now: Timestamp) -> Result<usize, RelayError> {
        let due = self.mirror.closed_unfinalized_rounds(now)?;
        let mut finalized = 0;
        for question_id in due {
            match self.rpc.finalize(question_id).await {
                Ok(FinalizeAck::Finalized { approved }) => {
                    finalized += 1;
                    self.metrics.rounds_finalized.inc();
                    tracing::info!(question = %question_id, approved, "round finalized");
                }
                Ok(FinalizeAck::AlreadyFinalized) => {
                    tracing::debug!(question = %question_id, "round was already finalized");
                }
                Err(e) => {
                    // Left unfinalized in the mirror; the next sweep retries.
                    tracing::warn!(question = %question_id, error = %e, "finalize call failed");
                }
            }
        }
        Ok(finalized)
    }

    // ── Background loops ────────────────────────────────────────────────

    /// Spawn the poller, applier, sweeper, and retrier. Everything stops on
    /// [`EventRelay::shutdown`].
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        self.running.store(true, Ordering::SeqCst);
        let (tx, mut rx) = mpsc::channel::<SequencedEvent>(self.config.queue_capacity);
        let mut handles = Vec::new();

        // Poller: fetch from the persisted cursor and push into the channel.
        // Refetching events the applier has not finished yet is harmless —
        // application is idempotent and the cursor only moves forward.
        let relay = self.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        handles.push(tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(relay.config.poll_interval_secs));
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        tracing::info!("poller shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let cursor = match relay.mirror.cursor() {
                            Ok(c) => c,
                            Err(e) => {
                                tracing::error!(error = %e, "cursor read failed");
                                continue;
                            }
                        };
                        match relay.rpc.fetch_events(cursor + 1, relay.config.event_batch_size).await {
                            Ok(events) => {
                                for event in events {
                                    if tx.send(event).await.is_err() {
                                        return;
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "event fetch failed, will retry");
                            }
                        }
                    }
                }
            }
        }));

        // Applier: drain the channel, apply, advance the cursor.
        let relay = self.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        handles.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        tracing::info!("applier shutting down");
                        break;
                    }
                    event = rx.recv() => {
                        let Some(event) = event else { break };
                        if let Err(e) = relay.apply_event(&event).await {
                            tracing::warn!(sequence = event.sequence, error = %e, "event application failed, cursor unadvanced");
                        }
                    }
                }
            }
        }));

        // Sweeper: push closed rounds into finalization.
        let relay = self.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        handles.push(tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(relay.config.sweep_interval_secs));
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        tracing::info!("sweeper shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = relay.sweep_once(Timestamp::now()).await {
                            tracing::warn!(error = %e, "finalization sweep failed");
                        }
                    }
                }
            }
        }));

        // Retrier: drain the inference backlog.
        let relay = self.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        handles.push(tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(relay.config.retry_interval_secs));
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        tracing::info!("retrier shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = relay.retry_once(Timestamp::now()).await {
                            tracing::warn!(error = %e, "backlog retry scan failed");
                        }
                    }
                }
            }
        }));

        handles
    }
}
