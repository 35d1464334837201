//! Token sale: window-gated, whitelist-gated exchange of payment currency
//! for a deposited fungible asset at an administrator-set rate.
//!
//! Every state-changing entry point:
//! 1. Acquires the reentrancy guard (released on every exit path)
//! 2. Checks access control (admin-only operations)
//! 3. Validates arguments and state
//! 4. Applies accounting effects before any external sub-call
//! 5. Rolls accounting back if a sub-call fails
//!
//! Entry points take `&self`: state lives in `Cell`/`RefCell` so that a
//! collaborator holding a handle to the sale can attempt a nested call,
//! which the guard rejects. No `RefCell` borrow is held across a sub-call.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, error, info, warn};
use types::ids::AccountId;
use types::numeric::{Amount, ExchangeRate};
use types::time::{to_rfc3339, Timestamp};
use uuid::Uuid;

use crate::config::{validate_rate, SaleConfig, SaleWindow, ValidatedConfig};
use crate::errors::SaleError;
use crate::events::{
    AdminTransferred, AssetDeposited, AssetWithdrawn, BatchWhitelisted, PaymentWithdrawn,
    RateUpdated, RefundClaimed, RefundDeferred, RemovedFromWhitelist, SaleEvent, TokensPurchased,
    Whitelisted, WindowUpdated,
};
use crate::ledger::{Environment, FungibleAsset};
use crate::security::{AccessControl, ReentrancyGuard};
use crate::whitelist::Whitelist;

/// The sale ledger.
///
/// Holds custody of two balances under its own `address`: the asset on the
/// asset ledger, and payment currency on the host environment.
pub struct TokenSale {
    /// Custody account of the sale on both ledgers
    address: AccountId,
    asset: Rc<dyn FungibleAsset>,
    env: Rc<dyn Environment>,
    exchange_rate: Cell<ExchangeRate>,
    window: Cell<SaleWindow>,
    /// Lifetime payment raised; never decremented by withdrawals
    collected: Cell<Amount>,
    whitelist: RefCell<Whitelist>,
    /// Payments held for buyers whose purchase failed and whose refund
    /// could not be sent; excluded from `withdraw_payment`
    refunds: RefCell<HashMap<AccountId, Amount>>,
    access_control: AccessControl,
    reentrancy_guard: ReentrancyGuard,
    /// Emitted events log (append-only)
    events: RefCell<Vec<SaleEvent>>,
}

impl TokenSale {
    /// Create a sale administered by `creator`.
    ///
    /// Rejects a null asset handle, a null sale address, a zero rate, a
    /// window that does not start strictly in the future, and a window whose
    /// start is not before its end. On failure no sale exists.
    pub fn create(
        creator: AccountId,
        address: AccountId,
        asset: Rc<dyn FungibleAsset>,
        env: Rc<dyn Environment>,
        config: &SaleConfig,
    ) -> Result<Self, SaleError> {
        if asset.address().is_nil() {
            return Err(SaleError::InvalidAsset);
        }
        if address.is_nil() {
            return Err(SaleError::InvalidAddress);
        }
        if creator.is_nil() {
            return Err(SaleError::InvalidIdentity);
        }
        let ValidatedConfig {
            exchange_rate,
            window,
        } = config.validate(env.now())?;

        info!(
            sale = %address,
            admin = %creator,
            asset = %asset.address(),
            rate = exchange_rate.get(),
            window_start = %to_rfc3339(window.start),
            window_end = %to_rfc3339(window.end),
            "Token sale created"
        );

        Ok(Self {
            address,
            asset,
            env,
            exchange_rate: Cell::new(exchange_rate),
            window: Cell::new(window),
            collected: Cell::new(0),
            whitelist: RefCell::new(Whitelist::new(address)),
            refunds: RefCell::new(HashMap::new()),
            access_control: AccessControl::new(creator),
            reentrancy_guard: ReentrancyGuard::new(),
            events: RefCell::new(Vec::new()),
        })
    }

    // ───────────────────────── Exchange ─────────────────────────

    /// Exchange `payment_amount` of payment currency for asset at the
    /// current rate.
    ///
    /// Checks in order: window open, non-zero payment, caller whitelisted,
    /// quote does not overflow, inventory covers the quote. `collected` is
    /// incremented before the payment is settled and the asset is sent;
    /// a failed sub-call refunds what already moved and restores it. If the
    /// refund itself fails the payment is held for `claim_refund` and the
    /// call returns `RefundDeferred`.
    pub fn exchange(
        &self,
        caller: AccountId,
        payment_amount: Amount,
    ) -> Result<SaleEvent, SaleError> {
        self.guarded("exchange", caller, || {
            let now = self.env.now();
            if !self.window.get().is_open(now) {
                return Err(SaleError::SaleNotOpen);
            }
            if payment_amount == 0 {
                return Err(SaleError::ZeroAmount);
            }
            if !self.whitelist.borrow().contains(&caller) {
                return Err(SaleError::NotWhitelisted);
            }
            let asset_amount = self.quote(payment_amount)?;
            let available = self.asset_inventory();
            if available < asset_amount {
                return Err(SaleError::InsufficientInventory {
                    required: asset_amount,
                    available,
                });
            }

            // Effects
            let collected_before = self.collected.get();
            let collected_after = collected_before
                .checked_add(payment_amount)
                .ok_or(SaleError::Overflow)?;
            self.collected.set(collected_after);

            // Interactions
            if let Err(err) = self
                .env
                .transfer_native(caller, self.address, payment_amount)
            {
                self.collected.set(collected_before);
                return Err(SaleError::PaymentFailed(err));
            }
            if let Err(err) = self.asset.transfer(self.address, caller, asset_amount) {
                self.collected.set(collected_before);
                if let Err(refund_err) =
                    self.env
                        .transfer_native(self.address, caller, payment_amount)
                {
                    error!(
                        buyer = %caller,
                        payment_amount = payment_amount,
                        error = %refund_err,
                        "Refund after failed asset transfer did not settle, holding for claim"
                    );
                    self.defer_refund(caller, payment_amount);
                    return Err(SaleError::RefundDeferred {
                        amount: payment_amount,
                        cause: err,
                    });
                }
                return Err(SaleError::AssetTransferFailed(err));
            }

            Ok(self.emit(SaleEvent::TokensPurchased(TokensPurchased {
                purchase_id: Uuid::now_v7(),
                buyer: caller,
                asset_amount,
                payment_amount,
                purchased_at: now,
            })))
        })
    }

    /// Asset units `payment_amount` buys at the current rate.
    pub fn quote(&self, payment_amount: Amount) -> Result<Amount, SaleError> {
        self.exchange_rate
            .get()
            .checked_quote(payment_amount)
            .ok_or(SaleError::Overflow)
    }

    /// Reject payment sent outside `exchange`.
    pub fn receive(&self, sender: AccountId, amount: Amount) -> Result<(), SaleError> {
        Err(self.reject_direct_transfer(sender, amount))
    }

    pub(crate) fn reject_direct_transfer(&self, sender: AccountId, amount: Amount) -> SaleError {
        let err = SaleError::DirectTransferRejected { amount };
        log_rejection("receive", &sender, &err);
        err
    }

    // ───────────────────────── Whitelist ─────────────────────────

    /// Whitelist one identity. Admin-only. Returns `true` if membership
    /// changed; re-adding a member emits nothing.
    /// The null identity and the sale's own address are rejected.
    pub fn add_to_whitelist(
        &self,
        caller: AccountId,
        identity: AccountId,
    ) -> Result<bool, SaleError> {
        self.guarded("add_to_whitelist", caller, || {
            self.access_control.ensure_admin(&caller)?;
            let added = self.whitelist.borrow_mut().add(identity)?;
            if added {
                self.emit(SaleEvent::Whitelisted(Whitelisted { identity }));
            }
            Ok(added)
        })
    }

    /// Whitelist a batch as one operation. Admin-only. Either every identity
    /// is applied or none is. Returns the number of new members.
    pub fn add_many_to_whitelist(
        &self,
        caller: AccountId,
        identities: &[AccountId],
    ) -> Result<usize, SaleError> {
        self.guarded("add_many_to_whitelist", caller, || {
            self.access_control.ensure_admin(&caller)?;
            let mut added = self.whitelist.borrow_mut().add_many(identities)?;
            added.sort();
            let count = added.len();
            if count > 0 {
                self.emit(SaleEvent::BatchWhitelisted(BatchWhitelisted { identities: added }));
            }
            Ok(count)
        })
    }

    /// Remove one identity. Admin-only. Returns `true` if membership changed.
    pub fn remove_from_whitelist(
        &self,
        caller: AccountId,
        identity: AccountId,
    ) -> Result<bool, SaleError> {
        self.guarded("remove_from_whitelist", caller, || {
            self.access_control.ensure_admin(&caller)?;
            let removed = self.whitelist.borrow_mut().remove(&identity);
            if removed {
                self.emit(SaleEvent::RemovedFromWhitelist(RemovedFromWhitelist { identity }));
            }
            Ok(removed)
        })
    }

    pub fn is_whitelisted(&self, identity: &AccountId) -> bool {
        self.whitelist.borrow().contains(identity)
    }

    pub fn whitelist_len(&self) -> usize {
        self.whitelist.borrow().len()
    }

    // ───────────────────────── Configuration ─────────────────────────

    /// Move the sale window. Admin-only; same constraints as construction.
    pub fn update_window(
        &self,
        caller: AccountId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<SaleEvent, SaleError> {
        self.guarded("update_window", caller, || {
            self.access_control.ensure_admin(&caller)?;
            let window = SaleWindow::new(start, end, self.env.now())?;
            self.window.set(window);
            Ok(self.emit(SaleEvent::WindowUpdated(WindowUpdated { start, end })))
        })
    }

    /// Change the exchange rate. Admin-only; zero rejected.
    pub fn update_exchange_rate(
        &self,
        caller: AccountId,
        new_rate: u128,
    ) -> Result<SaleEvent, SaleError> {
        self.guarded("update_exchange_rate", caller, || {
            self.access_control.ensure_admin(&caller)?;
            let rate = validate_rate(new_rate)?;
            self.exchange_rate.set(rate);
            Ok(self.emit(SaleEvent::RateUpdated(RateUpdated { rate })))
        })
    }

    // ───────────────────────── Custody ─────────────────────────

    /// Pull `amount` of asset from the admin into sale custody. Requires the
    /// admin to have approved the sale address on the asset ledger.
    pub fn deposit_asset(&self, caller: AccountId, amount: Amount) -> Result<SaleEvent, SaleError> {
        self.guarded("deposit_asset", caller, || {
            let admin = self.access_control.ensure_admin(&caller)?;
            if amount == 0 {
                return Err(SaleError::InvalidAmount);
            }
            self.asset
                .transfer_from(self.address, admin, self.address, amount)
                .map_err(SaleError::DepositFailed)?;
            Ok(self.emit(SaleEvent::AssetDeposited(AssetDeposited { from: admin, amount })))
        })
    }

    /// Send the held payment-currency balance, less refunds owed to
    /// buyers, to the admin.
    ///
    /// `collected` is left as is: it records funds ever raised.
    pub fn withdraw_payment(&self, caller: AccountId) -> Result<SaleEvent, SaleError> {
        self.guarded("withdraw_payment", caller, || {
            let admin = self.access_control.ensure_admin(&caller)?;
            let amount = self.withdrawable_payment();
            if amount == 0 {
                return Err(SaleError::NoFunds);
            }
            self.env
                .transfer_native(self.address, admin, amount)
                .map_err(SaleError::TransferFailed)?;
            Ok(self.emit(SaleEvent::PaymentWithdrawn(PaymentWithdrawn { to: admin, amount })))
        })
    }

    /// Return `amount` of unsold asset to the admin.
    pub fn withdraw_asset(
        &self,
        caller: AccountId,
        amount: Amount,
    ) -> Result<SaleEvent, SaleError> {
        self.guarded("withdraw_asset", caller, || {
            let admin = self.access_control.ensure_admin(&caller)?;
            if amount == 0 {
                return Err(SaleError::InvalidAmount);
            }
            let available = self.asset_inventory();
            if amount > available {
                return Err(SaleError::InsufficientInventory {
                    required: amount,
                    available,
                });
            }
            self.asset
                .transfer(self.address, admin, amount)
                .map_err(SaleError::AssetTransferFailed)?;
            Ok(self.emit(SaleEvent::AssetWithdrawn(AssetWithdrawn { to: admin, amount })))
        })
    }

    // ───────────────────────── Refunds ─────────────────────────

    /// Pay out the refund held for `caller`. Open to any caller with a
    /// balance owed, at any time; `NoFunds` otherwise.
    pub fn claim_refund(&self, caller: AccountId) -> Result<SaleEvent, SaleError> {
        self.guarded("claim_refund", caller, || {
            let amount = self
                .refunds
                .borrow_mut()
                .remove(&caller)
                .ok_or(SaleError::NoFunds)?;
            if let Err(err) = self.env.transfer_native(self.address, caller, amount) {
                self.refunds.borrow_mut().insert(caller, amount);
                return Err(SaleError::TransferFailed(err));
            }
            Ok(self.emit(SaleEvent::RefundClaimed(RefundClaimed { to: caller, amount })))
        })
    }

    fn defer_refund(&self, buyer: AccountId, amount: Amount) {
        {
            let mut refunds = self.refunds.borrow_mut();
            let owed = refunds.entry(buyer).or_insert(0);
            *owed = owed.saturating_add(amount);
        }
        self.emit(SaleEvent::RefundDeferred(RefundDeferred { buyer, amount }));
    }

    // ───────────────────────── Access Control ─────────────────────────

    /// Hand the admin role to `new_admin` (non-null).
    pub fn transfer_admin(
        &self,
        caller: AccountId,
        new_admin: AccountId,
    ) -> Result<SaleEvent, SaleError> {
        self.guarded("transfer_admin", caller, || {
            let previous_admin = self.access_control.transfer_admin(&caller, new_admin)?;
            Ok(self.emit(SaleEvent::AdminTransferred(AdminTransferred {
                previous_admin,
                new_admin: Some(new_admin),
            })))
        })
    }

    /// Give up the admin role; every admin-only operation rejects afterwards.
    pub fn renounce_admin(&self, caller: AccountId) -> Result<SaleEvent, SaleError> {
        self.guarded("renounce_admin", caller, || {
            let previous_admin = self.access_control.renounce_admin(&caller)?;
            Ok(self.emit(SaleEvent::AdminTransferred(AdminTransferred {
                previous_admin,
                new_admin: None,
            })))
        })
    }

    pub fn admin(&self) -> Option<AccountId> {
        self.access_control.admin()
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn address(&self) -> AccountId {
        self.address
    }

    pub fn asset_address(&self) -> AccountId {
        self.asset.address()
    }

    pub fn exchange_rate(&self) -> ExchangeRate {
        self.exchange_rate.get()
    }

    pub fn window(&self) -> SaleWindow {
        self.window.get()
    }

    /// Window gate against the host's current time.
    pub fn is_open(&self) -> bool {
        self.window.get().is_open(self.env.now())
    }

    /// Lifetime payment raised.
    pub fn collected(&self) -> Amount {
        self.collected.get()
    }

    /// Asset held in sale custody.
    pub fn asset_inventory(&self) -> Amount {
        self.asset.balance_of(&self.address)
    }

    /// Payment currency held in sale custody.
    pub fn payment_balance(&self) -> Amount {
        self.env.native_balance(&self.address)
    }

    /// Refund held for `buyer`.
    pub fn refund_owed(&self, buyer: &AccountId) -> Amount {
        self.refunds.borrow().get(buyer).copied().unwrap_or(0)
    }

    /// Sum of refunds held for all buyers.
    pub fn refunds_outstanding(&self) -> Amount {
        self.refunds
            .borrow()
            .values()
            .fold(0, |total: Amount, owed| total.saturating_add(*owed))
    }

    /// Payment currency the admin may withdraw.
    pub fn withdrawable_payment(&self) -> Amount {
        self.payment_balance()
            .saturating_sub(self.refunds_outstanding())
    }

    /// True while a guarded operation is executing.
    pub fn is_locked(&self) -> bool {
        self.reentrancy_guard.is_locked()
    }

    // ───────────────────────── Events ─────────────────────────

    /// Snapshot of all emitted events.
    pub fn events(&self) -> Vec<SaleEvent> {
        self.events.borrow().clone()
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&self) -> Vec<SaleEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub(crate) fn event_count(&self) -> usize {
        self.events.borrow().len()
    }

    pub(crate) fn events_since(&self, mark: usize) -> Vec<SaleEvent> {
        self.events.borrow().iter().skip(mark).cloned().collect()
    }

    fn emit(&self, event: SaleEvent) -> SaleEvent {
        info!(sale = %self.address, event = event.label(), "Sale event emitted");
        self.events.borrow_mut().push(event.clone());
        event
    }

    // ───────────────────────── Internal Guards ─────────────────────────

    /// Run `op` holding the reentrancy lock, logging any rejection.
    fn guarded<T>(
        &self,
        op: &'static str,
        caller: AccountId,
        body: impl FnOnce() -> Result<T, SaleError>,
    ) -> Result<T, SaleError> {
        self.reentrancy_guard
            .enter()
            .and_then(|_lock| body())
            .map_err(|err| {
                log_rejection(op, &caller, &err);
                err
            })
    }
}

fn log_rejection(op: &'static str, caller: &AccountId, err: &SaleError) {
    match err {
        SaleError::Unauthorized
        | SaleError::Reentrancy
        | SaleError::DirectTransferRejected { .. }
        | SaleError::PaymentFailed(_)
        | SaleError::AssetTransferFailed(_)
        | SaleError::TransferFailed(_)
        | SaleError::DepositFailed(_)
        | SaleError::RefundDeferred { .. } => {
            warn!(op = op, caller = %caller, code = err.code(), error = %err, "Sale call rejected");
        }
        _ => {
            debug!(
                op = op,
                caller = %caller,
                code = err.code(),
                error = %err,
                "Sale call rejected"
            );
        }
    }
}

impl fmt::Debug for TokenSale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSale")
            .field("address", &self.address)
            .field("asset", &self.asset.address())
            .field("exchange_rate", &self.exchange_rate.get())
            .field("window", &self.window.get())
            .field("collected", &self.collected.get())
            .field("refunds_outstanding", &self.refunds_outstanding())
            .field("admin", &self.access_control.admin())
            .field("whitelist_len", &self.whitelist_len())
            .field("locked", &self.reentrancy_guard.is_locked())
            .finish_non_exhaustive()
    }
}
