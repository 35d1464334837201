//! Participant whitelist
//!
//! Membership is a plain flag per identity; identities never written are not
//! members. Add and remove set the flag directly, so repeating either is a
//! no-op. Batch insertion validates every identity before touching the set.

use std::collections::HashSet;

use types::ids::AccountId;

use crate::errors::SaleError;

#[derive(Debug, Clone)]
pub struct Whitelist {
    /// Custody account of the owning sale; never admissible as a buyer
    sale: AccountId,
    members: HashSet<AccountId>,
}

impl Whitelist {
    /// Empty whitelist for the sale holding custody at `sale`.
    pub fn new(sale: AccountId) -> Self {
        Self {
            sale,
            members: HashSet::new(),
        }
    }

    fn admissible(&self, identity: &AccountId) -> bool {
        !identity.is_nil() && *identity != self.sale
    }

    /// Add one identity. Returns `true` if it was not already a member.
    pub fn add(&mut self, identity: AccountId) -> Result<bool, SaleError> {
        if !self.admissible(&identity) {
            return Err(SaleError::InvalidIdentity);
        }
        Ok(self.members.insert(identity))
    }

    /// Add a batch atomically: a single inadmissible identity rejects the
    /// whole batch and leaves the set unchanged. Returns the identities newly
    /// added, in input order and without repeats.
    pub fn add_many(&mut self, identities: &[AccountId]) -> Result<Vec<AccountId>, SaleError> {
        if !identities.iter().all(|id| self.admissible(id)) {
            return Err(SaleError::InvalidIdentity);
        }
        Ok(identities
            .iter()
            .copied()
            .filter(|id| self.members.insert(*id))
            .collect())
    }

    /// Remove one identity. Returns `true` if it was a member.
    pub fn remove(&mut self, identity: &AccountId) -> bool {
        self.members.remove(identity)
    }

    pub fn contains(&self, identity: &AccountId) -> bool {
        self.members.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
