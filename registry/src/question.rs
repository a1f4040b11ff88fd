//! Question and answer records.

use serde::{Deserialize, Serialize};
use veritas_types::{Address, ContentHash, QuestionId, Timestamp};

/// A submitted question. Immutable except for the `answered` flag, which
/// flips exactly once when an answer is recorded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub asker: Address,
    pub text: String,
    pub reference_urls: Vec<String>,
    /// Escrowed fee in raw units.
    pub fee: u128,
    pub submitted_at: Timestamp,
    pub answered: bool,
}

/// Inference provenance recorded alongside an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerProof {
    pub model_hash: ContentHash,
    pub input_hash: ContentHash,
    pub output_hash: ContentHash,
}

/// The single answer to a question.
///
/// `verified` starts false and is set true only by an approving finalize —
/// that is the only mutation consensus may cause after creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub text: String,
    /// Content hash returned by the storage collaborator, stored verbatim.
    pub storage_hash: ContentHash,
    pub proof: AnswerProof,
    /// The relayer that recorded this answer.
    pub relayer: Address,
    pub submitted_at: Timestamp,
    pub verified: bool,
}
