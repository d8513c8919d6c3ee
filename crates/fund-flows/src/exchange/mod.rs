//! Price Sources
//!
//! Abstractions and implementations for spot price lookups.

mod coingecko;
mod fixed;

pub use coingecko::{CoinGeckoClient, COINGECKO_BASE_URL};
pub use fixed::FixedPriceSource;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Result;

/// Price source trait (Strategy pattern)
///
/// Implementations must only return strictly positive prices; anything else
/// is `TrackerError::PriceUnavailable`.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current price of `coin_id` quoted in `vs_currency`
    async fn spot_price(&self, coin_id: &str, vs_currency: &str) -> Result<Decimal>;

    /// Source name
    fn name(&self) -> &str;
}
