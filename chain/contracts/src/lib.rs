//! Token Sale Contract Logic
//!
//! This crate implements a time-boxed, whitelist-gated token sale: an
//! administrator deposits a fixed supply of a fungible asset, whitelisted
//! participants exchange payment currency for it at an administrator-set rate
//! while the sale window is open, and the administrator later withdraws the
//! collected payment and any unsold asset.
//!
//! # Modules
//! - `errors`: Sale, ledger and config error types
//! - `events`: Events emitted by sale operations
//! - `security`: Reentrancy guard and single-administrator access control
//! - `config`: Sale configuration and the window gate
//! - `ledger`: Asset and host collaborator traits with in-memory implementations
//! - `whitelist`: Participant whitelist
//! - `sale`: The sale state machine
//! - `dispatch`: Call routing and direct-transfer rejection
//!
//! # Version
//! v0.1.0: initial implementation

pub mod errors;
pub mod events;
pub mod security;
pub mod config;
pub mod ledger;
pub mod whitelist;
pub mod sale;
pub mod dispatch;

pub use config::{SaleConfig, SaleWindow};
pub use dispatch::{CallContext, SaleCall};
pub use errors::{ConfigError, LedgerError, SaleError};
pub use events::SaleEvent;
pub use ledger::{Environment, FungibleAsset, InMemoryAsset, InMemoryHost};
pub use sale::TokenSale;

/// Contract ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
