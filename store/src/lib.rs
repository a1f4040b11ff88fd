//! Abstract storage for the relay's read model.
//!
//! Rows are opaque bytes so the store does not depend on the relay's row
//! schema (which would invert the dependency); the relay serialises and
//! deserialises its own types. Any backend implementing [`MirrorStore`]
//! works — the in-memory one ships here for tests and default wiring;
//! durable backends are a deployment concern.

pub mod error;
pub mod memory;
pub mod mirror;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use mirror::MirrorStore;
