//! Security primitives for the sale contract
//!
//! Provides the reentrancy guard and the single-administrator access control
//! checked at the top of every privileged entry point.
//!
//! Both primitives use interior mutability: sale entry points take `&self`
//! so an external collaborator holding a handle to the sale can attempt a
//! nested call mid-transfer, and the guard must observe that attempt.

use std::cell::Cell;

use types::ids::AccountId;

use crate::errors::SaleError;

/// Reentrancy guard preventing nested calls into protected functions.
///
/// A contract function acquires the guard before executing state-changing
/// logic and releases it on completion. Any nested call attempt fails.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    locked: Cell<bool>,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self {
            locked: Cell::new(false),
        }
    }

    /// Acquire the guard. Returns `true` if successfully acquired.
    /// Returns `false` if already locked (reentrancy attempt).
    pub fn acquire(&self) -> bool {
        if self.locked.get() {
            return false;
        }
        self.locked.set(true);
        true
    }

    /// Release the guard.
    pub fn release(&self) {
        self.locked.set(false);
    }

    /// Check if currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    /// Acquire a scoped lock released when the returned value drops,
    /// on every exit path including early `?` returns.
    pub fn enter(&self) -> Result<ReentrancyLock<'_>, SaleError> {
        if !self.acquire() {
            return Err(SaleError::Reentrancy);
        }
        Ok(ReentrancyLock { guard: self })
    }
}

/// Scoped hold on a [`ReentrancyGuard`].
#[derive(Debug)]
#[must_use = "the guard is released as soon as the lock is dropped"]
pub struct ReentrancyLock<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for ReentrancyLock<'_> {
    fn drop(&mut self) {
        self.guard.release();
    }
}

/// Single-administrator access control.
///
/// The administrator may transfer the role to another non-null identity or
/// renounce it, after which no caller passes the admin check.
#[derive(Debug)]
pub struct AccessControl {
    admin: Cell<Option<AccountId>>,
}

impl AccessControl {
    /// Create access control with an initial admin.
    pub fn new(admin: AccountId) -> Self {
        Self {
            admin: Cell::new(Some(admin)),
        }
    }

    /// Check if a caller is admin.
    pub fn is_admin(&self, caller: &AccountId) -> bool {
        self.admin.get().map_or(false, |admin| admin == *caller)
    }

    /// Return the admin identity if `caller` holds the role.
    pub fn ensure_admin(&self, caller: &AccountId) -> Result<AccountId, SaleError> {
        match self.admin.get() {
            Some(admin) if admin == *caller => Ok(admin),
            _ => Err(SaleError::Unauthorized),
        }
    }

    /// Transfer admin to a new identity. Returns the previous admin.
    pub fn transfer_admin(
        &self,
        current_admin: &AccountId,
        new_admin: AccountId,
    ) -> Result<AccountId, SaleError> {
        let previous = self.ensure_admin(current_admin)?;
        if new_admin.is_nil() {
            return Err(SaleError::InvalidIdentity);
        }
        self.admin.set(Some(new_admin));
        Ok(previous)
    }

    /// Give up the role permanently. Returns the previous admin.
    pub fn renounce_admin(&self, current_admin: &AccountId) -> Result<AccountId, SaleError> {
        let previous = self.ensure_admin(current_admin)?;
        self.admin.set(None);
        Ok(previous)
    }

    /// Get the current admin identifier, `None` once renounced.
    pub fn admin(&self) -> Option<AccountId> {
        self.admin.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- ReentrancyGuard tests ---

    #[test]
    fn test_reentrancy_guard_acquire_release() {
        let guard = ReentrancyGuard::new();
        assert!(!guard.is_locked());
        assert!(guard.acquire());
        assert!(guard.is_locked());
        guard.release();
        assert!(!guard.is_locked());
    }

    #[test]
    fn test_reentrancy_guard_double_acquire_fails() {
        let guard = ReentrancyGuard::new();
        assert!(guard.acquire());
        assert!(!guard.acquire(), "Second acquire must fail");
    }

    #[test]
    fn test_scoped_lock_releases_on_drop() {
        let guard = ReentrancyGuard::new();
        {
            let _lock = guard.enter().unwrap();
            assert!(guard.is_locked());
            assert_eq!(guard.enter().unwrap_err(), SaleError::Reentrancy);
        }
        assert!(!guard.is_locked());
        assert!(guard.enter().is_ok());
    }

    #[test]
    fn test_scoped_lock_releases_on_early_return() {
        fn guarded(guard: &ReentrancyGuard, fail: bool) -> Result<(), SaleError> {
            let _lock = guard.enter()?;
            if fail {
                return Err(SaleError::ZeroAmount);
            }
            Ok(())
        }

        let guard = ReentrancyGuard::new();
        assert_eq!(guarded(&guard, true), Err(SaleError::ZeroAmount));
        assert!(!guard.is_locked());
        assert_eq!(guarded(&guard, false), Ok(()));
    }

    // --- AccessControl tests ---

    #[test]
    fn test_access_control_admin() {
        let alice = AccountId::from_u128(1);
        let bob = AccountId::from_u128(2);
        let ac = AccessControl::new(alice);
        assert!(ac.is_admin(&alice));
        assert!(!ac.is_admin(&bob));
        assert_eq!(ac.ensure_admin(&bob), Err(SaleError::Unauthorized));
    }

    #[test]
    fn test_access_control_transfer_admin() {
        let alice = AccountId::from_u128(1);
        let bob = AccountId::from_u128(2);
        let ac = AccessControl::new(alice);
        assert_eq!(ac.transfer_admin(&alice, bob), Ok(alice));
        assert!(ac.is_admin(&bob));
        assert!(!ac.is_admin(&alice));
        assert_eq!(ac.admin(), Some(bob));
    }

    #[test]
    fn test_access_control_transfer_to_nil_rejected() {
        let alice = AccountId::from_u128(1);
        let ac = AccessControl::new(alice);
        assert_eq!(
            ac.transfer_admin(&alice, AccountId::nil()),
            Err(SaleError::InvalidIdentity)
        );
        assert_eq!(ac.admin(), Some(alice));
    }

    #[test]
    fn test_access_control_non_admin_cannot_transfer() {
        let alice = AccountId::from_u128(1);
        let eve = AccountId::from_u128(66);
        let ac = AccessControl::new(alice);
        assert_eq!(ac.transfer_admin(&eve, eve), Err(SaleError::Unauthorized));
    }

    #[test]
    fn test_access_control_renounce() {
        let alice = AccountId::from_u128(1);
        let ac = AccessControl::new(alice);
        assert_eq!(ac.renounce_admin(&alice), Ok(alice));
        assert_eq!(ac.admin(), None);
        assert!(!ac.is_admin(&alice));
        assert_eq!(ac.renounce_admin(&alice), Err(SaleError::Unauthorized));
    }
}
