//! Question registry for the veritas protocol.
//!
//! Owns the question → answer → finalized lifecycle and the fee money flow:
//! fees are escrowed on submission, released to the reward pool on approval,
//! refunded in full on rejection.

pub mod error;
pub mod question;
pub mod registry;

pub use error::RegistryError;
pub use question::{Answer, AnswerProof, Question};
pub use registry::{FeeRefund, FinalizeOutcome, QuestionRegistry};
