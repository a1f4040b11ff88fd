//! Ledger operations and the event log.

use crate::error::LedgerError;
use std::collections::HashMap;
use veritas_registry::{AnswerProof, FinalizeOutcome, QuestionRegistry};
use veritas_stake::StakeLedger;
use veritas_types::{
    Address, Caller, ContentHash, LedgerEvent, ProtocolParams, QuestionId, Role, SequencedEvent,
    Timestamp,
};
use veritas_voting::{
    apply_distribution, compute_distribution, AppliedDistribution, ConsensusEngine, Evaluation,
    VotingError, VotingRound,
};

/// Everything a finalize transition produced, for callers and tests; the
/// event log only carries the binary outcome.
#[derive(Clone, Debug)]
pub struct FinalizeReport {
    pub evaluation: Evaluation,
    pub applied: AppliedDistribution,
    pub outcome: FinalizeOutcome,
}

/// The authoritative ledger.
pub struct Ledger {
    params: ProtocolParams,
    stake: StakeLedger,
    registry: QuestionRegistry,
    rounds: HashMap<QuestionId, VotingRound>,
    engine: ConsensusEngine,
    /// Internal capability for distribution mutations; the distributor role
    /// is held by the ledger itself, never handed out.
    distributor: Caller,
    log: Vec<SequencedEvent>,
}

impl Ledger {
    pub fn new(params: ProtocolParams) -> Self {
        let engine = ConsensusEngine::new(&params);
        let stake = StakeLedger::new(&params);
        let registry = QuestionRegistry::new(&params);
        Self {
            params,
            stake,
            registry,
            rounds: HashMap::new(),
            engine,
            distributor: Caller::with_roles(
                Address::new("vrt_distributor"),
                [Role::Distributor],
            ),
            log: Vec::new(),
        }
    }

    fn emit(&mut self, event: LedgerEvent, now: Timestamp) {
        let sequence = self.log.len() as u64 + 1;
        self.log.push(SequencedEvent {
            sequence,
            timestamp: now,
            event,
        });
    }

    // ── Staking ─────────────────────────────────────────────────────────

    pub fn stake(
        &mut self,
        owner: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.stake.stake(owner, amount, now)?;
        Ok(())
    }

    pub fn unstake(
        &mut self,
        owner: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.stake.unstake(owner, amount, now)?;
        Ok(())
    }

    // ── Lifecycle operations ────────────────────────────────────────────

    /// Submit a question with its fee.
    pub fn submit_question(
        &mut self,
        asker: &Address,
        text: String,
        reference_urls: Vec<String>,
        fee: u128,
        now: Timestamp,
    ) -> Result<QuestionId, LedgerError> {
        let id =
            self.registry
                .submit(asker, text.clone(), reference_urls.clone(), fee, now)?;
        self.emit(
            LedgerEvent::QuestionSubmitted {
                question_id: id,
                asker: asker.clone(),
                text,
                reference_urls,
                fee,
            },
            now,
        );
        Ok(id)
    }

    /// Record the answer and open its voting round in one transition.
    pub fn submit_answer(
        &mut self,
        caller: &Caller,
        question_id: QuestionId,
        text: String,
        storage_hash: ContentHash,
        proof: AnswerProof,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.registry.record_answer(
            caller,
            question_id,
            text.clone(),
            storage_hash,
            proof,
            now,
        )?;
        self.rounds.insert(
            question_id,
            VotingRound::open(question_id, now, self.params.voting_window_secs),
        );
        self.emit(
            LedgerEvent::AnswerSubmitted {
                question_id,
                storage_hash,
                text,
            },
            now,
        );
        Ok(())
    }

    /// Cast a vote with the voter's stake snapshotted at this moment.
    pub fn cast_vote(
        &mut self,
        voter: &Address,
        question_id: QuestionId,
        approved: bool,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let weight = self.stake.balance_of(voter);
        let round = self
            .rounds
            .get_mut(&question_id)
            .ok_or_else(|| LedgerError::NoSuchRound(question_id.to_string()))?;
        round.cast_vote(voter.clone(), approved, weight, now)?;
        self.emit(
            LedgerEvent::VoteCast {
                question_id,
                voter: voter.clone(),
                approved,
                stake: weight,
            },
            now,
        );
        Ok(())
    }

    /// Evaluate a closed round and settle it.
    ///
    /// Every guard runs before the first mutation, and no step after the
    /// first mutation has a failure path, so the transition is
    /// all-or-nothing: either the round finalizes with its payouts and
    /// slashes applied and the event appended, or nothing changed.
    pub fn finalize(
        &mut self,
        caller: &Caller,
        question_id: QuestionId,
        now: Timestamp,
    ) -> Result<FinalizeReport, LedgerError> {
        if !caller.has_role(Role::Finalizer) {
            return Err(LedgerError::Registry(
                veritas_registry::RegistryError::NotAuthorized("Finalizer"),
            ));
        }
        let round = self
            .rounds
            .get(&question_id)
            .ok_or_else(|| LedgerError::NoSuchRound(question_id.to_string()))?;
        if self.registry.is_finalized(&question_id) {
            return Err(LedgerError::Voting(VotingError::AlreadyFinalized));
        }
        round.ensure_closed(now)?;

        let evaluation = self.engine.evaluate(round, self.stake.total_staked());
        let approve = evaluation.verdict.is_approve();

        // Pre-checked above; the registry guard cannot fire now.
        let outcome = self.registry.finalize(caller, question_id, approve)?;
        let reward_pool = match &outcome {
            FinalizeOutcome::Approved { reward_pool } => *reward_pool,
            // The fee went back to the asker; only slashing applies.
            FinalizeOutcome::Rejected { .. } => 0,
        };

        let round = self
            .rounds
            .get_mut(&question_id)
            .expect("round checked above");
        let distribution =
            compute_distribution(evaluation.verdict, round.votes(), reward_pool, &self.params);
        round.mark_finalized()?;

        let applied = apply_distribution(&distribution, &mut self.stake, &self.distributor)?;
        self.registry.deposit_treasury(applied.treasury_cut);

        self.emit(
            LedgerEvent::VotingFinalized {
                question_id,
                approved: approve,
            },
            now,
        );
        Ok(FinalizeReport {
            evaluation,
            applied,
            outcome,
        })
    }

    // ── Event log ───────────────────────────────────────────────────────

    /// Highest sequence number in the log, zero when empty.
    pub fn head_sequence(&self) -> u64 {
        self.log.len() as u64
    }

    /// Events with `sequence ≥ from`, up to `limit` of them.
    pub fn events_since(&self, from: u64, limit: usize) -> Vec<SequencedEvent> {
        let start = (from.saturating_sub(1)) as usize;
        self.log
            .iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect()
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn balance_of(&self, owner: &Address) -> u128 {
        self.stake.balance_of(owner)
    }

    pub fn total_staked(&self) -> u128 {
        self.stake.total_staked()
    }

    pub fn stake_ledger(&self) -> &StakeLedger {
        &self.stake
    }

    pub fn registry(&self) -> &QuestionRegistry {
        &self.registry
    }

    pub fn round(&self, id: &QuestionId) -> Option<&VotingRound> {
        self.rounds.get(id)
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }
}
