//! Ledger collaborators: fungible asset and host environment
//!
//! The sale depends on two external capabilities:
//! - `FungibleAsset`: balance query, transfer, allowance-based transfer-from
//! - `Environment`: current time and native payment-currency transfers
//!
//! In-memory implementations back tests and local simulation. Both keep
//! balances in a `BalanceBook` with overflow/underflow-checked credit and
//! debit.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use types::ids::AccountId;
use types::numeric::Amount;
use types::time::{unix_now, Timestamp};

use crate::errors::LedgerError;

/// A standard transferable-balance token ledger.
///
/// Methods take `&self`; implementations own their state and may call back
/// into other contracts while a transfer is in flight.
pub trait FungibleAsset {
    /// Address of the ledger itself. The nil identity marks a null handle.
    fn address(&self) -> AccountId;

    fn balance_of(&self, owner: &AccountId) -> Amount;

    /// Move `amount` from `from` (the calling account) to `to`.
    fn transfer(&self, from: AccountId, to: AccountId, amount: Amount) -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance previously granted by `from`.
    fn transfer_from(
        &self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;
}

/// Host execution environment: clock and native payment currency.
pub trait Environment {
    fn now(&self) -> Timestamp;

    fn native_balance(&self, owner: &AccountId) -> Amount;

    fn transfer_native(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;
}

/// Balance table with checked arithmetic.
#[derive(Debug, Default)]
pub struct BalanceBook {
    balances: RefCell<HashMap<AccountId, Amount>>,
}

impl BalanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, owner: &AccountId) -> Amount {
        self.balances.borrow().get(owner).copied().unwrap_or(0)
    }

    /// Add `amount` to `owner`, checking for overflow.
    pub fn credit(&self, owner: AccountId, amount: Amount) -> Result<(), LedgerError> {
        let mut balances = self.balances.borrow_mut();
        let current = balances.entry(owner).or_insert(0);
        *current = current.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Subtract `amount` from `owner`, rejecting overdraw.
    pub fn debit(&self, owner: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        let mut balances = self.balances.borrow_mut();
        let available = balances.get(owner).copied().unwrap_or(0);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                required: amount,
                available,
            })?;
        balances.insert(*owner, remaining);
        Ok(())
    }

    /// Atomic move: both legs are checked before either is applied.
    pub fn move_funds(
        &self,
        from: &AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        if *from != to {
            self.balance_of(&to)
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;
        }
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    /// Sum of all balances; `None` on overflow.
    pub fn total(&self) -> Option<Amount> {
        self.balances
            .borrow()
            .values()
            .try_fold(0u128, |acc, v| acc.checked_add(*v))
    }
}

// ───────────────────────── In-memory asset ─────────────────────────

/// In-memory fungible asset with allowances.
#[derive(Debug)]
pub struct InMemoryAsset {
    address: AccountId,
    book: BalanceBook,
    /// (owner, spender) -> remaining allowance
    allowances: RefCell<HashMap<(AccountId, AccountId), Amount>>,
}

impl InMemoryAsset {
    pub fn new(address: AccountId) -> Self {
        Self {
            address,
            book: BalanceBook::new(),
            allowances: RefCell::new(HashMap::new()),
        }
    }

    /// Issue new units to `to`.
    pub fn mint(&self, to: AccountId, amount: Amount) -> Result<(), LedgerError> {
        self.book
            .total()
            .and_then(|supply| supply.checked_add(amount))
            .ok_or(LedgerError::Overflow)?;
        self.book.credit(to, amount)
    }

    /// Set the allowance `spender` may move out of `owner`'s balance.
    pub fn approve(&self, owner: AccountId, spender: AccountId, amount: Amount) {
        self.allowances.borrow_mut().insert((owner, spender), amount);
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .borrow()
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }
}

impl FungibleAsset for InMemoryAsset {
    fn address(&self) -> AccountId {
        self.address
    }

    fn balance_of(&self, owner: &AccountId) -> Amount {
        self.book.balance_of(owner)
    }

    fn transfer(&self, from: AccountId, to: AccountId, amount: Amount) -> Result<(), LedgerError> {
        self.book.move_funds(&from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let allowed = self.allowance(&from, &spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                required: amount,
                available: allowed,
            });
        }
        self.book.move_funds(&from, to, amount)?;
        self.allowances
            .borrow_mut()
            .insert((from, spender), allowed - amount);
        Ok(())
    }
}

// ───────────────────────── In-memory host ─────────────────────────

/// In-memory host: native currency balances and a clock.
///
/// The clock is manual by default (`set_time`, `advance`); a host created
/// with `with_system_clock` reads wall-clock time instead.
#[derive(Debug)]
pub struct InMemoryHost {
    manual_time: Cell<Option<Timestamp>>,
    book: BalanceBook,
}

impl InMemoryHost {
    /// Host with a manual clock starting at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            manual_time: Cell::new(Some(now)),
            book: BalanceBook::new(),
        }
    }

    /// Host reading the system clock.
    pub fn with_system_clock() -> Self {
        Self {
            manual_time: Cell::new(None),
            book: BalanceBook::new(),
        }
    }

    /// Pin the clock to `now` (switches a system-clock host to manual).
    pub fn set_time(&self, now: Timestamp) {
        self.manual_time.set(Some(now));
    }

    /// Move the clock forward by `seconds`.
    pub fn advance(&self, seconds: i64) {
        self.set_time(self.now().saturating_add(seconds));
    }

    /// Fund `owner` with native currency.
    pub fn credit(&self, owner: AccountId, amount: Amount) -> Result<(), LedgerError> {
        self.book.credit(owner, amount)
    }
}

impl Environment for InMemoryHost {
    fn now(&self) -> Timestamp {
        self.manual_time.get().unwrap_or_else(unix_now)
    }

    fn native_balance(&self, owner: &AccountId) -> Amount {
        self.book.balance_of(owner)
    }

    fn transfer_native(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.book.move_funds(&from, to, amount)
    }
}
