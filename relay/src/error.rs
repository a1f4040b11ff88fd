//! Relay errors.
//!
//! Transient infrastructure failures (`Rpc`, `Inference`, `Storage`) are
//! retried by the poll loop or the backlog scanner — they are never turned
//! into ledger-visible rejections.

use thiserror::Error;
use veritas_store::StoreError;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("ledger rpc error: {0}")]
    Rpc(String),

    #[error("inference service error: {0}")]
    Inference(String),

    #[error("content storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("row serialization error: {0}")]
    Serialization(String),

    #[error("caller lacks the {0} capability")]
    NotAuthorized(&'static str),
}
