//! Identifier types for sale participants and ledgers
//!
//! Accounts use UUID v7 so freshly generated identities sort by creation time.
//! The nil UUID is reserved as the null identity: it can never hold the
//! administrator role, be whitelisted, or name a ledger.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an account (participant, administrator, contract or ledger)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Create a new AccountId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The null identity
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Create from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Deterministic identity, handy for fixtures and config files
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Get inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_creation() {
        let id1 = AccountId::new();
        let id2 = AccountId::new();
        assert_ne!(id1, id2, "AccountIds should be unique");
        assert!(!id1.is_nil());
    }

    #[test]
    fn test_nil_account() {
        assert!(AccountId::nil().is_nil());
        assert!(AccountId::from_u128(0).is_nil());
        assert!(!AccountId::from_u128(7).is_nil());
    }

    #[test]
    fn test_default_is_not_nil() {
        assert!(!AccountId::default().is_nil());
    }

    #[test]
    fn test_account_id_serialization() {
        let id = AccountId::from_u128(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-00000000002a\"");

        let deserialized: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
