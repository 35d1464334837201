//! Contract-specific error types
//!
//! Error taxonomy for the sale: configuration, authorization, state and
//! external-call failures. Every variant maps to a stable reason code so
//! callers can assert on the specific cause.

use thiserror::Error;
use types::numeric::Amount;
use types::time::Timestamp;

/// Sale contract errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaleError {
    // ── Configuration ──
    #[error("Invalid asset: ledger address is null")]
    InvalidAsset,

    #[error("Invalid sale address: address is null")]
    InvalidAddress,

    #[error("Exchange rate must be greater than zero")]
    ZeroRate,

    #[error("Window start {start} is not in the future (now {now})")]
    StartNotInFuture { start: Timestamp, now: Timestamp },

    #[error("Invalid window: start {start} must be before end {end}")]
    InvalidWindow { start: Timestamp, end: Timestamp },

    // ── Authorization ──
    #[error("Unauthorized: caller is not admin")]
    Unauthorized,

    #[error("not authorized: caller is not whitelisted")]
    NotWhitelisted,

    #[error("Invalid identity: null account")]
    InvalidIdentity,

    // ── State ──
    #[error("sale not open")]
    SaleNotOpen,

    #[error("zero amount")]
    ZeroAmount,

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("insufficient asset inventory: required {required}, available {available}")]
    InsufficientInventory { required: Amount, available: Amount },

    #[error("no funds")]
    NoFunds,

    #[error("Reentrancy detected")]
    Reentrancy,

    #[error("Direct transfer of {amount} rejected: payment accepted only through exchange")]
    DirectTransferRejected { amount: Amount },

    #[error("Unknown call: {reason}")]
    UnknownCall { reason: String },

    // ── External calls ──
    #[error("payment failed: {0}")]
    PaymentFailed(#[source] LedgerError),

    #[error("asset transfer failed: {0}")]
    AssetTransferFailed(#[source] LedgerError),

    #[error("transfer failed: {0}")]
    TransferFailed(#[source] LedgerError),

    #[error("deposit failed: {0}")]
    DepositFailed(#[source] LedgerError),

    /// Asset delivery and the payment refund both failed; the payment is
    /// held for the buyer to claim.
    #[error("asset transfer failed, refund of {amount} held for claim: {cause}")]
    RefundDeferred {
        amount: Amount,
        #[source]
        cause: LedgerError,
    },
}

impl SaleError {
    /// Stable machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            SaleError::InvalidAsset => "INVALID_ASSET",
            SaleError::InvalidAddress => "INVALID_ADDRESS",
            SaleError::ZeroRate => "ZERO_RATE",
            SaleError::StartNotInFuture { .. } => "START_NOT_IN_FUTURE",
            SaleError::InvalidWindow { .. } => "INVALID_WINDOW",
            SaleError::Unauthorized => "UNAUTHORIZED",
            SaleError::NotWhitelisted => "NOT_WHITELISTED",
            SaleError::InvalidIdentity => "INVALID_IDENTITY",
            SaleError::SaleNotOpen => "SALE_NOT_OPEN",
            SaleError::ZeroAmount => "ZERO_AMOUNT",
            SaleError::InvalidAmount => "INVALID_AMOUNT",
            SaleError::Overflow => "OVERFLOW",
            SaleError::InsufficientInventory { .. } => "INSUFFICIENT_INVENTORY",
            SaleError::NoFunds => "NO_FUNDS",
            SaleError::Reentrancy => "REENTRANCY",
            SaleError::DirectTransferRejected { .. } => "DIRECT_TRANSFER_REJECTED",
            SaleError::UnknownCall { .. } => "UNKNOWN_CALL",
            SaleError::PaymentFailed(_) => "PAYMENT_FAILED",
            SaleError::AssetTransferFailed(_) => "ASSET_TRANSFER_FAILED",
            SaleError::TransferFailed(_) => "TRANSFER_FAILED",
            SaleError::DepositFailed(_) => "DEPOSIT_FAILED",
            SaleError::RefundDeferred { .. } => "REFUND_DEFERRED",
        }
    }
}

/// Failures reported by a ledger collaborator (asset or native currency)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    #[error("Insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance { required: Amount, available: Amount },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,

    #[error("Transfer rejected: {reason}")]
    Rejected { reason: String },
}

/// Errors loading a sale configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_reason_strings() {
        assert_eq!(SaleError::SaleNotOpen.to_string(), "sale not open");
        assert_eq!(SaleError::ZeroAmount.to_string(), "zero amount");
        assert_eq!(SaleError::NoFunds.to_string(), "no funds");
        assert!(SaleError::NotWhitelisted.to_string().starts_with("not authorized"));
        assert!(SaleError::InsufficientInventory { required: 10, available: 3 }
            .to_string()
            .starts_with("insufficient asset inventory"));
    }

    #[test]
    fn test_codes_are_distinct() {
        let ledger = LedgerError::Overflow;
        let all = [
            SaleError::InvalidAsset,
            SaleError::InvalidAddress,
            SaleError::ZeroRate,
            SaleError::StartNotInFuture { start: 0, now: 0 },
            SaleError::InvalidWindow { start: 0, end: 0 },
            SaleError::Unauthorized,
            SaleError::NotWhitelisted,
            SaleError::InvalidIdentity,
            SaleError::SaleNotOpen,
            SaleError::ZeroAmount,
            SaleError::InvalidAmount,
            SaleError::Overflow,
            SaleError::InsufficientInventory { required: 0, available: 0 },
            SaleError::NoFunds,
            SaleError::Reentrancy,
            SaleError::DirectTransferRejected { amount: 0 },
            SaleError::UnknownCall { reason: String::new() },
            SaleError::PaymentFailed(ledger.clone()),
            SaleError::AssetTransferFailed(ledger.clone()),
            SaleError::TransferFailed(ledger.clone()),
            SaleError::DepositFailed(ledger.clone()),
            SaleError::RefundDeferred { amount: 0, cause: ledger },
        ];
        let codes: std::collections::HashSet<_> = all.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_external_error_keeps_source() {
        let err = SaleError::TransferFailed(LedgerError::Rejected {
            reason: "frozen".to_string(),
        });
        assert!(err.to_string().starts_with("transfer failed"));
        assert!(err.source().unwrap().to_string().contains("frozen"));
    }

    #[test]
    fn test_refund_deferred_names_amount_and_cause() {
        let err = SaleError::RefundDeferred {
            amount: 5,
            cause: LedgerError::Rejected {
                reason: "frozen".to_string(),
            },
        };
        assert!(err.to_string().contains("refund of 5 held for claim"));
        assert!(err.source().unwrap().to_string().contains("frozen"));
        assert_eq!(err.code(), "REFUND_DEFERRED");
    }

    #[test]
    fn test_config_error_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
