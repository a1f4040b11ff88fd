//! Registry errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("question text is empty")]
    EmptyQuestion,

    #[error("question text is {len} bytes, maximum is {max}")]
    QuestionTooLong { len: usize, max: usize },

    #[error("fee {fee} is below the minimum {min_fee}")]
    InsufficientFee { fee: u128, min_fee: u128 },

    #[error("unknown question {0}")]
    NotFound(String),

    #[error("question already has an answer")]
    AlreadyAnswered,

    #[error("question has no answer to finalize")]
    NotAnswered,

    #[error("question has already been finalized")]
    AlreadyFinalized,

    #[error("caller lacks the {0} capability")]
    NotAuthorized(&'static str),
}
