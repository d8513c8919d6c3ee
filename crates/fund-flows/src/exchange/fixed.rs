//! Fixed Price Source
//!
//! For tests and offline runs. Returns a configured price, or reports the
//! price as unavailable.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::PriceSource;
use crate::error::{Result, TrackerError};

/// Price source with a static answer
#[derive(Clone, Debug)]
pub struct FixedPriceSource {
    price: Option<Decimal>,
}

impl FixedPriceSource {
    pub const fn new(price: Decimal) -> Self {
        Self { price: Some(price) }
    }

    /// A source whose response carries no price
    pub const fn unavailable() -> Self {
        Self { price: None }
    }
}

#[async_trait]
impl PriceSource for FixedPriceSource {
    async fn spot_price(&self, coin_id: &str, vs_currency: &str) -> Result<Decimal> {
        match self.price {
            Some(price) if price > Decimal::ZERO => Ok(price),
            Some(price) => Err(TrackerError::PriceUnavailable(format!(
                "{coin_id}/{vs_currency} price {price} is not positive"
            ))),
            None => Err(TrackerError::PriceUnavailable(format!(
                "no {coin_id}/{vs_currency} price configured"
            ))),
        }
    }

    fn name(&self) -> &str {
        "FixedPrice"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_fixed_price() {
        let source = FixedPriceSource::new(dec!(65000));
        assert_eq!(source.spot_price("bitcoin", "usd").await.unwrap(), dec!(65000));
    }

    #[tokio::test]
    async fn test_unavailable_and_zero() {
        let err = FixedPriceSource::unavailable().spot_price("bitcoin", "usd").await;
        assert!(matches!(err, Err(TrackerError::PriceUnavailable(_))));

        let err = FixedPriceSource::new(Decimal::ZERO).spot_price("bitcoin", "usd").await;
        assert!(matches!(err, Err(TrackerError::PriceUnavailable(_))));
    }
}
