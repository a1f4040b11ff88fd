//! Capability sets for privileged operations.
//!
//! Instead of role mixins baked into the components, every privileged
//! operation takes an explicit [`Caller`] and checks the capability it
//! needs. Tests and the relay construct callers directly; a deployment
//! derives them from its authorization layer at the boundary.

use crate::address::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A capability a caller may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Operational administration (resync, start/stop).
    Admin,
    /// May record answers on behalf of the off-chain inference pipeline.
    Relayer,
    /// May slash and credit stake accounts during distribution.
    Distributor,
    /// May trigger finalization of a closed round.
    Finalizer,
}

/// An authenticated caller and the capabilities it holds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Caller {
    pub address: Address,
    pub roles: HashSet<Role>,
}

impl Caller {
    /// A caller with no capabilities (a regular participant).
    pub fn participant(address: Address) -> Self {
        Self {
            address,
            roles: HashSet::new(),
        }
    }

    /// A caller holding the given capabilities.
    pub fn with_roles(address: Address, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            address,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_has_no_capabilities() {
        let c = Caller::participant(Address::new("vrt_x"));
        assert!(!c.has_role(Role::Relayer));
        assert!(!c.has_role(Role::Distributor));
    }

    #[test]
    fn with_roles_grants_exactly_those() {
        let c = Caller::with_roles(Address::new("vrt_x"), [Role::Relayer, Role::Finalizer]);
        assert!(c.has_role(Role::Relayer));
        assert!(c.has_role(Role::Finalizer));
        assert!(!c.has_role(Role::Admin));
    }
}
