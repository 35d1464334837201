//! Call dispatch: the sale's external entry surface
//!
//! A call names an entry point and may carry attached payment currency.
//! Only `exchange` is payable: value attached to any other call, or to a
//! call that does not decode to a known entry point, is rejected outright.

use serde::{Deserialize, Serialize};
use types::ids::AccountId;
use types::numeric::Amount;
use types::time::Timestamp;

use crate::errors::SaleError;
use crate::events::SaleEvent;
use crate::sale::TokenSale;

/// Caller identity and attached payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: AccountId,
    pub value: Amount,
}

impl CallContext {
    /// A call with no attached payment.
    pub fn new(caller: AccountId) -> Self {
        Self { caller, value: 0 }
    }

    /// A call carrying `value` of payment currency.
    pub fn with_value(caller: AccountId, value: Amount) -> Self {
        Self { caller, value }
    }
}

/// Every entry point of the sale.
///
/// JSON form: unit calls are bare strings (`"exchange"`), calls with
/// arguments are single-key objects (`{"withdraw_asset": {"amount": 5}}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleCall {
    /// Payable; the attached value is the payment amount.
    Exchange,
    AddToWhitelist { identity: AccountId },
    AddManyToWhitelist { identities: Vec<AccountId> },
    RemoveFromWhitelist { identity: AccountId },
    UpdateWindow { start: Timestamp, end: Timestamp },
    UpdateExchangeRate { rate: u128 },
    DepositAsset { amount: Amount },
    WithdrawPayment,
    WithdrawAsset { amount: Amount },
    ClaimRefund,
    TransferAdmin { new_admin: AccountId },
    RenounceAdmin,
}

impl SaleCall {
    pub fn is_payable(&self) -> bool {
        matches!(self, SaleCall::Exchange)
    }
}

impl TokenSale {
    /// Route a typed call. Returns the events the call emitted.
    pub fn dispatch(&self, ctx: CallContext, call: SaleCall) -> Result<Vec<SaleEvent>, SaleError> {
        if ctx.value > 0 && !call.is_payable() {
            return Err(self.reject_direct_transfer(ctx.caller, ctx.value));
        }

        let mark = self.event_count();
        let caller = ctx.caller;
        match call {
            SaleCall::Exchange => {
                self.exchange(caller, ctx.value)?;
            }
            SaleCall::AddToWhitelist { identity } => {
                self.add_to_whitelist(caller, identity)?;
            }
            SaleCall::AddManyToWhitelist { identities } => {
                self.add_many_to_whitelist(caller, &identities)?;
            }
            SaleCall::RemoveFromWhitelist { identity } => {
                self.remove_from_whitelist(caller, identity)?;
            }
            SaleCall::UpdateWindow { start, end } => {
                self.update_window(caller, start, end)?;
            }
            SaleCall::UpdateExchangeRate { rate } => {
                self.update_exchange_rate(caller, rate)?;
            }
            SaleCall::DepositAsset { amount } => {
                self.deposit_asset(caller, amount)?;
            }
            SaleCall::WithdrawPayment => {
                self.withdraw_payment(caller)?;
            }
            SaleCall::WithdrawAsset { amount } => {
                self.withdraw_asset(caller, amount)?;
            }
            SaleCall::ClaimRefund => {
                self.claim_refund(caller)?;
            }
            SaleCall::TransferAdmin { new_admin } => {
                self.transfer_admin(caller, new_admin)?;
            }
            SaleCall::RenounceAdmin => {
                self.renounce_admin(caller)?;
            }
        }
        Ok(self.events_since(mark))
    }

    /// Decode a JSON call and route it.
    ///
    /// A call that matches no entry point is `UnknownCall`, or
    /// `DirectTransferRejected` if it carries payment.
    pub fn dispatch_json(&self, ctx: CallContext, raw: &str) -> Result<Vec<SaleEvent>, SaleError> {
        match serde_json::from_str::<SaleCall>(raw) {
            Ok(call) => self.dispatch(ctx, call),
            Err(_) if ctx.value > 0 => Err(self.reject_direct_transfer(ctx.caller, ctx.value)),
            Err(err) => Err(SaleError::UnknownCall {
                reason: err.to_string(),
            }),
        }
    }
}
