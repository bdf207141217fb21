//! Supply chain roles and role-indexed storage.
//!
//! The four tiers of the chain are fixed. Orders flow upstream
//! (Customer → Retailer → Wholesaler → Distributor → Factory) and goods flow
//! back downstream. `RoleMap` gives O(1) access to per-role state with
//! compile-time exhaustiveness over the four roles, replacing any string-keyed
//! lookup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four playable tiers of the supply chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Retailer,
    Wholesaler,
    Distributor,
    Factory,
}

impl Role {
    /// All roles in downstream-to-upstream order.
    pub const ALL: [Role; 4] = [
        Role::Retailer,
        Role::Wholesaler,
        Role::Distributor,
        Role::Factory,
    ];

    /// Position in the chain (Retailer = 0 … Factory = 3).
    pub fn index(self) -> usize {
        match self {
            Role::Retailer => 0,
            Role::Wholesaler => 1,
            Role::Distributor => 2,
            Role::Factory => 3,
        }
    }

    /// The tier this role ships goods to, if any.
    ///
    /// The Retailer ships to the external customer, which is not a `Role`.
    pub fn downstream(self) -> Option<Role> {
        match self {
            Role::Retailer => None,
            Role::Wholesaler => Some(Role::Retailer),
            Role::Distributor => Some(Role::Wholesaler),
            Role::Factory => Some(Role::Distributor),
        }
    }

    /// The tier this role orders from, if any.
    ///
    /// The Factory has no upstream supplier; it produces.
    pub fn upstream(self) -> Option<Role> {
        match self {
            Role::Retailer => Some(Role::Wholesaler),
            Role::Wholesaler => Some(Role::Distributor),
            Role::Distributor => Some(Role::Factory),
            Role::Factory => None,
        }
    }

    /// Stable display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Retailer => "Retailer",
            Role::Wholesaler => "Wholesaler",
            Role::Distributor => "Distributor",
            Role::Factory => "Factory",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A party that can place an order: the external customer or a chain role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderParty {
    /// The external end customer (demand source, Retailer's buyer).
    Customer,
    Role(Role),
}

impl OrderParty {
    /// The role this party orders from, if the party participates in the
    /// order flow at all.
    pub fn orders_from(self) -> Option<Role> {
        match self {
            OrderParty::Customer => Some(Role::Retailer),
            OrderParty::Role(role) => role.upstream(),
        }
    }
}

impl std::fmt::Display for OrderParty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderParty::Customer => f.write_str("Customer"),
            OrderParty::Role(role) => f.write_str(role.as_str()),
        }
    }
}

/// Error raised when an order names a (sender, recipient) pair that is not
/// adjacent in the chain.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid order flow: {sender} cannot order from {recipient}")]
pub struct InvalidFlow {
    pub sender: OrderParty,
    pub recipient: Role,
}

/// Validate that `sender` is exactly one tier downstream of `recipient`.
pub fn validate_order_flow(sender: OrderParty, recipient: Role) -> Result<(), InvalidFlow> {
    if sender.orders_from() == Some(recipient) {
        Ok(())
    } else {
        Err(InvalidFlow { sender, recipient })
    }
}

/// Fixed-size map keyed by `Role`.
///
/// # Example
/// ```
/// use beergame_simulator_core_rs::models::role::{Role, RoleMap};
///
/// let mut inventories = RoleMap::new(|_| 12u32);
/// inventories[Role::Retailer] -= 4;
/// assert_eq!(inventories[Role::Retailer], 8);
/// assert_eq!(inventories[Role::Factory], 12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMap<T> {
    slots: [T; 4],
}

impl<T> RoleMap<T> {
    /// Build a map by calling `init` once per role, in chain order.
    pub fn new(mut init: impl FnMut(Role) -> T) -> Self {
        Self {
            slots: [
                init(Role::Retailer),
                init(Role::Wholesaler),
                init(Role::Distributor),
                init(Role::Factory),
            ],
        }
    }

    pub fn get(&self, role: Role) -> &T {
        &self.slots[role.index()]
    }

    pub fn get_mut(&mut self, role: Role) -> &mut T {
        &mut self.slots[role.index()]
    }

    /// Iterate entries in downstream-to-upstream order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &T)> {
        Role::ALL.iter().map(move |&role| (role, self.get(role)))
    }
}

impl<T: Default> Default for RoleMap<T> {
    fn default() -> Self {
        Self::new(|_| T::default())
    }
}

impl<T> std::ops::Index<Role> for RoleMap<T> {
    type Output = T;

    fn index(&self, role: Role) -> &T {
        self.get(role)
    }
}

impl<T> std::ops::IndexMut<Role> for RoleMap<T> {
    fn index_mut(&mut self, role: Role) -> &mut T {
        self.get_mut(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_adjacency() {
        assert_eq!(Role::Retailer.upstream(), Some(Role::Wholesaler));
        assert_eq!(Role::Factory.upstream(), None);
        assert_eq!(Role::Factory.downstream(), Some(Role::Distributor));
        assert_eq!(Role::Retailer.downstream(), None);
    }

    #[test]
    fn test_validate_order_flow_accepts_adjacent_pairs() {
        assert!(validate_order_flow(OrderParty::Customer, Role::Retailer).is_ok());
        assert!(validate_order_flow(OrderParty::Role(Role::Retailer), Role::Wholesaler).is_ok());
        assert!(validate_order_flow(OrderParty::Role(Role::Distributor), Role::Factory).is_ok());
    }

    #[test]
    fn test_validate_order_flow_rejects_skipped_tiers() {
        // Customer cannot order straight from the Factory.
        assert!(validate_order_flow(OrderParty::Customer, Role::Factory).is_err());
        // Retailer cannot skip the Wholesaler.
        assert!(validate_order_flow(OrderParty::Role(Role::Retailer), Role::Distributor).is_err());
        // Factory has no supplier.
        assert!(validate_order_flow(OrderParty::Role(Role::Factory), Role::Retailer).is_err());
    }

    #[test]
    fn test_role_map_indexing() {
        let map = RoleMap::new(|role| role.index() * 10);
        assert_eq!(map[Role::Retailer], 0);
        assert_eq!(map[Role::Factory], 30);

        let collected: Vec<Role> = map.iter().map(|(r, _)| r).collect();
        assert_eq!(collected, Role::ALL.to_vec());
    }
}
