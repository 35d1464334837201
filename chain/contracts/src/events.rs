//! Contract events
//!
//! Events are immutable records emitted by sale operations, intended for
//! external monitoring. They are not required for correctness.

use serde::{Deserialize, Serialize};
use types::ids::AccountId;
use types::numeric::{Amount, ExchangeRate};
use types::time::Timestamp;
use uuid::Uuid;

/// Tokens purchased through `exchange`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensPurchased {
    pub purchase_id: Uuid,
    pub buyer: AccountId,
    pub asset_amount: Amount,
    pub payment_amount: Amount,
    pub purchased_at: Timestamp,
}

/// Sale window moved by the administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowUpdated {
    pub start: Timestamp,
    pub end: Timestamp,
}

/// Exchange rate changed by the administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateUpdated {
    pub rate: ExchangeRate,
}

/// A single identity added to the whitelist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitelisted {
    pub identity: AccountId,
}

/// A batch of identities added to the whitelist in one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchWhitelisted {
    pub identities: Vec<AccountId>,
}

/// A single identity removed from the whitelist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedFromWhitelist {
    pub identity: AccountId,
}

/// Asset pulled from the administrator into sale custody
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDeposited {
    pub from: AccountId,
    pub amount: Amount,
}

/// Unsold asset returned to the administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetWithdrawn {
    pub to: AccountId,
    pub amount: Amount,
}

/// Held payment currency swept to the administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentWithdrawn {
    pub to: AccountId,
    pub amount: Amount,
}

/// Payment kept for a buyer after a failed purchase could not be refunded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundDeferred {
    pub buyer: AccountId,
    pub amount: Amount,
}

/// Deferred refund paid out to its buyer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundClaimed {
    pub to: AccountId,
    pub amount: Amount,
}

/// Administrator role moved or renounced (`new_admin == None`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminTransferred {
    pub previous_admin: AccountId,
    pub new_admin: Option<AccountId>,
}

/// Enum wrapper for all sale events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleEvent {
    TokensPurchased(TokensPurchased),
    WindowUpdated(WindowUpdated),
    RateUpdated(RateUpdated),
    Whitelisted(Whitelisted),
    BatchWhitelisted(BatchWhitelisted),
    RemovedFromWhitelist(RemovedFromWhitelist),
    AssetDeposited(AssetDeposited),
    AssetWithdrawn(AssetWithdrawn),
    PaymentWithdrawn(PaymentWithdrawn),
    RefundDeferred(RefundDeferred),
    RefundClaimed(RefundClaimed),
    AdminTransferred(AdminTransferred),
}

impl SaleEvent {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            SaleEvent::TokensPurchased(_) => "tokens_purchased",
            SaleEvent::WindowUpdated(_) => "window_updated",
            SaleEvent::RateUpdated(_) => "rate_updated",
            SaleEvent::Whitelisted(_) => "whitelisted",
            SaleEvent::BatchWhitelisted(_) => "batch_whitelisted",
            SaleEvent::RemovedFromWhitelist(_) => "removed_from_whitelist",
            SaleEvent::AssetDeposited(_) => "asset_deposited",
            SaleEvent::AssetWithdrawn(_) => "asset_withdrawn",
            SaleEvent::PaymentWithdrawn(_) => "payment_withdrawn",
            SaleEvent::RefundDeferred(_) => "refund_deferred",
            SaleEvent::RefundClaimed(_) => "refund_claimed",
            SaleEvent::AdminTransferred(_) => "admin_transferred",
        }
    }
}
