//! Participant address type with `vrt_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A veritas participant address, conventionally prefixed with `vrt_`.
///
/// The ledger is the authority on identity; this type only carries the
/// string form around and offers a well-formedness check for input
/// validation at the boundary.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The standard prefix for veritas addresses.
    pub const PREFIX: &'static str = "vrt_";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the address carries the expected prefix and a non-empty body.
    pub fn is_wellformed(&self) -> bool {
        self.0.starts_with(Self::PREFIX) && self.0.len() > Self::PREFIX.len()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
