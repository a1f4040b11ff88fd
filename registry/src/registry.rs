//! The question registry — lifecycle and fee accounting.

use crate::error::RegistryError;
use crate::question::{Answer, AnswerProof, Question};
use std::collections::{HashMap, HashSet};
use veritas_types::{Address, Caller, ContentHash, ProtocolParams, QuestionId, Role, Timestamp};

/// A fee returned to the asker after a rejection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeRefund {
    pub asker: Address,
    pub amount: u128,
}

/// What a finalize call released.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// The escrowed fee became the reward pool.
    Approved { reward_pool: u128 },
    /// The full fee goes back to the asker.
    Rejected { refund: FeeRefund },
}

/// Owns questions, their single answers, and the escrowed fees.
pub struct QuestionRegistry {
    questions: HashMap<QuestionId, Question>,
    answers: HashMap<QuestionId, Answer>,
    escrow: HashMap<QuestionId, u128>,
    finalized: HashSet<QuestionId>,
    /// Per-asker submission count, the nonce in question-id derivation.
    submission_counts: HashMap<Address, u64>,
    treasury: u128,
    min_fee: u128,
    max_question_len: usize,
}

impl QuestionRegistry {
    pub fn new(params: &ProtocolParams) -> Self {
        Self {
            questions: HashMap::new(),
            answers: HashMap::new(),
            escrow: HashMap::new(),
            finalized: HashSet::new(),
            submission_counts: HashMap::new(),
            treasury: 0,
            min_fee: params.min_fee,
            max_question_len: params.max_question_len,
        }
    }

    /// Record a submission: validates the text and fee, derives the
    /// deterministic id, and escrows the fee.
    pub fn submit(
        &mut self,
        asker: &Address,
        text: String,
        reference_urls: Vec<String>,
        fee: u128,
        now: Timestamp,
    ) -> Result<QuestionId, RegistryError> {
        if text.is_empty() {
            return Err(RegistryError::EmptyQuestion);
        }
        if text.len() > self.max_question_len {
            return Err(RegistryError::QuestionTooLong {
                len: text.len(),
                max: self.max_question_len,
            });
        }
        if fee < self.min_fee {
            return Err(RegistryError::InsufficientFee {
                fee,
                min_fee: self.min_fee,
            });
        }

        let nonce = self.submission_counts.entry(asker.clone()).or_insert(0);
        let id = QuestionId::derive(asker, &text, now, *nonce);
        *nonce += 1;

        self.questions.insert(
            id,
            Question {
                id,
                asker: asker.clone(),
                text,
                reference_urls,
                fee,
                submitted_at: now,
                answered: false,
            },
        );
        self.escrow.insert(id, fee);
        Ok(id)
    }

    /// Record the single answer for a question. Relayer capability required.
    pub fn record_answer(
        &mut self,
        caller: &Caller,
        question_id: QuestionId,
        text: String,
        storage_hash: ContentHash,
        proof: AnswerProof,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        if !caller.has_role(Role::Relayer) {
            return Err(RegistryError::NotAuthorized("Relayer"));
        }
        let question = self
            .questions
            .get_mut(&question_id)
            .ok_or_else(|| RegistryError::NotFound(question_id.to_string()))?;
        if question.answered {
            return Err(RegistryError::AlreadyAnswered);
        }

        self.answers.insert(
            question_id,
            Answer {
                question_id,
                text,
                storage_hash,
                proof,
                relayer: caller.address.clone(),
                submitted_at: now,
                verified: false,
            },
        );
        question.answered = true;
        Ok(())
    }

    /// Settle the escrowed fee for a verdict. Finalizer capability required.
    ///
    /// One-shot: a second call fails with `AlreadyFinalized`, which is what
    /// makes the consensus evaluation single-invocation.
    pub fn finalize(
        &mut self,
        caller: &Caller,
        question_id: QuestionId,
        approve: bool,
    ) -> Result<FinalizeOutcome, RegistryError> {
        if !caller.has_role(Role::Finalizer) {
            return Err(RegistryError::NotAuthorized("Finalizer"));
        }
        let question = self
            .questions
            .get(&question_id)
            .ok_or_else(|| RegistryError::NotFound(question_id.to_string()))?;
        if self.finalized.contains(&question_id) {
            return Err(RegistryError::AlreadyFinalized);
        }
        if !question.answered {
            return Err(RegistryError::NotAnswered);
        }

        let fee = self.escrow.remove(&question_id).unwrap_or(0);
        self.finalized.insert(question_id);

        if approve {
            // The answer exists because `answered` is set with it.
            if let Some(answer) = self.answers.get_mut(&question_id) {
                answer.verified = true;
            }
            Ok(FinalizeOutcome::Approved { reward_pool: fee })
        } else {
            Ok(FinalizeOutcome::Rejected {
                refund: FeeRefund {
                    asker: question.asker.clone(),
                    amount: fee,
                },
            })
        }
    }

    /// Bank an undistributed remainder (or a whole unclaimed pool).
    pub fn deposit_treasury(&mut self, amount: u128) {
        self.treasury = self.treasury.saturating_add(amount);
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.get(id)
    }

    pub fn answer(&self, id: &QuestionId) -> Option<&Answer> {
        self.answers.get(id)
    }

    pub fn escrowed(&self, id: &QuestionId) -> u128 {
        self.escrow.get(id).copied().unwrap_or(0)
    }

    pub fn is_finalized(&self, id: &QuestionId) -> bool {
        self.finalized.contains(id)
    }

    pub fn treasury(&self) -> u128 {
        self.treasury
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}
