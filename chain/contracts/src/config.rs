//! Sale configuration and the window gate
//!
//! `SaleConfig` carries the administrator-tunable parameters. The same
//! validation runs at construction and on every window or rate update:
//! the rate is non-zero, the window starts strictly in the future and ends
//! after it starts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use types::numeric::ExchangeRate;
use types::time::Timestamp;

use crate::errors::{ConfigError, SaleError};

/// Inclusive `[start, end]` interval during which exchange is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl SaleWindow {
    /// Validate a new window against the current time.
    ///
    /// Rejects a start at or before `now`, so a window can never be set
    /// already open or already closed.
    pub fn new(start: Timestamp, end: Timestamp, now: Timestamp) -> Result<Self, SaleError> {
        if start <= now {
            return Err(SaleError::StartNotInFuture { start, now });
        }
        if start >= end {
            return Err(SaleError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// `start <= now <= end`
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.start <= now && now <= self.end
    }
}

/// Construction parameters of a sale.
///
/// The rate is kept raw so that a zero rate surfaces as
/// [`SaleError::ZeroRate`] during validation rather than as a parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleConfig {
    /// Asset units granted per payment unit
    pub exchange_rate: u128,
    /// Unix seconds, inclusive
    pub window_start: Timestamp,
    /// Unix seconds, inclusive
    pub window_end: Timestamp,
}

/// A config that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub exchange_rate: ExchangeRate,
    pub window: SaleWindow,
}

impl SaleConfig {
    pub fn new(exchange_rate: u128, window_start: Timestamp, window_end: Timestamp) -> Self {
        Self {
            exchange_rate,
            window_start,
            window_end,
        }
    }

    /// Parse a JSON config.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Check rate and window constraints at time `now`.
    pub fn validate(&self, now: Timestamp) -> Result<ValidatedConfig, SaleError> {
        let exchange_rate = validate_rate(self.exchange_rate)?;
        let window = SaleWindow::new(self.window_start, self.window_end, now)?;
        Ok(ValidatedConfig {
            exchange_rate,
            window,
        })
    }
}

/// Non-zero rate check shared with rate updates.
pub fn validate_rate(raw: u128) -> Result<ExchangeRate, SaleError> {
    ExchangeRate::new(raw).ok_or(SaleError::ZeroRate)
}
