//! Run configuration
//!
//! Everything the operator maintains between runs lives here rather than in
//! code; the binary fills it from flags and environment variables.

use std::path::PathBuf;

use agent_core::provider::DEFAULT_MODEL;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::document::Markers;
use crate::error::{Result, TrackerError};
use crate::exchange::COINGECKO_BASE_URL;

pub const DEFAULT_STATE_FILE: &str = "blackrock_ibit_tracker.html";

/// Subtracted from the configured holdings when the previous value is unreadable
pub const DEFAULT_FALLBACK_OFFSET: Decimal = dec!(500);

#[derive(Clone, Debug)]
pub struct TrackerConfig {
    /// HTML page holding the data and narrative regions
    pub state_path: PathBuf,

    /// Current total holdings reported by the fund (operator-maintained)
    pub holdings: Decimal,

    pub fallback_offset: Decimal,

    /// Price service asset id
    pub coin_id: String,

    /// Price service quote currency
    pub vs_currency: String,

    pub price_base_url: String,

    /// Text-generation model identifier
    pub model: String,

    pub markers: Markers,

    /// Abort instead of writing a placeholder narrative
    pub require_narrative: bool,

    /// Run every stage but skip the write
    pub dry_run: bool,
}

impl TrackerConfig {
    pub fn new(state_path: impl Into<PathBuf>, holdings: Decimal) -> Self {
        Self {
            state_path: state_path.into(),
            holdings,
            fallback_offset: DEFAULT_FALLBACK_OFFSET,
            coin_id: "bitcoin".into(),
            vs_currency: "usd".into(),
            price_base_url: COINGECKO_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            markers: Markers::default(),
            require_narrative: false,
            dry_run: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.holdings <= Decimal::ZERO {
            return Err(TrackerError::Config(format!(
                "holdings must be positive, got {}",
                self.holdings
            )));
        }
        if self.fallback_offset.is_sign_negative() {
            return Err(TrackerError::Config(format!(
                "fallback offset must not be negative, got {}",
                self.fallback_offset
            )));
        }
        if self.coin_id.trim().is_empty() || self.vs_currency.trim().is_empty() {
            return Err(TrackerError::Config("coin id and quote currency are required".into()));
        }
        if self.model.trim().is_empty() {
            return Err(TrackerError::Config("model identifier is required".into()));
        }
        Ok(())
    }
}
