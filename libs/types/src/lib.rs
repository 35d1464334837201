//! Types library for the token sale contracts
//!
//! Shared identifier, amount and time types used by the sale contract and
//! its ledger collaborators.
//!
//! # Modules
//! - `ids`: Account identifiers (`AccountId`), nil-aware
//! - `numeric`: Integer amounts in smallest units and the exchange rate
//! - `time`: Unix-second timestamps
//! - `errors`: Error taxonomy for numeric construction

// Public modules
pub mod ids;
pub mod numeric;
pub mod time;
pub mod errors;
