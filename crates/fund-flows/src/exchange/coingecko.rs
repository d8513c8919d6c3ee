//! CoinGecko simple-price client
//!
//! `GET {base}/simple/price?ids=bitcoin&vs_currencies=usd` answers
//! `{"bitcoin": {"usd": 65000}}`. No API key is needed.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use super::PriceSource;
use crate::error::{Result, TrackerError};

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("fund-flows/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self) -> String {
        format!("{}/simple/price", self.base_url.trim_end_matches('/'))
    }
}

/// Pull `body[coin_id][vs_currency]` out of a simple-price response
fn extract_price(body: &Value, coin_id: &str, vs_currency: &str) -> Result<Decimal> {
    let unavailable =
        |why: &str| TrackerError::PriceUnavailable(format!("{coin_id}/{vs_currency}: {why}"));

    let field = body
        .get(coin_id)
        .and_then(|quotes| quotes.get(vs_currency))
        .ok_or_else(|| unavailable("price field missing from response"))?;

    let number = match field {
        Value::Number(n) => n.to_string(),
        Value::Null => return Err(unavailable("price is null")),
        other => return Err(unavailable(&format!("price is not a number: {other}"))),
    };

    let price = Decimal::from_str(&number)
        .or_else(|_| Decimal::from_scientific(&number))
        .map_err(|e| unavailable(&format!("unrepresentable price {number}: {e}")))?;

    if price <= Decimal::ZERO {
        return Err(unavailable(&format!("price {price} is not positive")));
    }
    Ok(price)
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn spot_price(&self, coin_id: &str, vs_currency: &str) -> Result<Decimal> {
        tracing::debug!(coin_id, vs_currency, url = %self.url(), "Requesting spot price");

        let body: Value = self
            .client
            .get(self.url())
            .query(&[("ids", coin_id), ("vs_currencies", vs_currency)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        extract_price(&body, coin_id, vs_currency)
    }

    fn name(&self) -> &str {
        "CoinGecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_extract_integer_price() {
        let body = json!({"bitcoin": {"usd": 65000}});
        assert_eq!(extract_price(&body, "bitcoin", "usd").unwrap(), dec!(65000));
    }

    #[test]
    fn test_extract_fractional_price_keeps_digits() {
        let body = json!({"bitcoin": {"usd": 97123.45}});
        let price = extract_price(&body, "bitcoin", "usd").unwrap();
        assert_eq!(price.to_string(), "97123.45");
    }

    #[test]
    fn test_missing_field_is_unavailable() {
        for body in [json!({}), json!({"bitcoin": {}}), json!({"ethereum": {"usd": 3400}})] {
            let err = extract_price(&body, "bitcoin", "usd");
            assert!(matches!(err, Err(TrackerError::PriceUnavailable(_))), "{body}");
        }
    }

    #[test]
    fn test_null_zero_and_text_are_unavailable() {
        for value in [json!(null), json!(0), json!(-3), json!("65000")] {
            let body = json!({"bitcoin": {"usd": value}});
            let err = extract_price(&body, "bitcoin", "usd");
            assert!(matches!(err, Err(TrackerError::PriceUnavailable(_))), "{body}");
        }
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = CoinGeckoClient::new("http://localhost:8080/api/v3/").unwrap();
        assert_eq!(client.url(), "http://localhost:8080/api/v3/simple/price");
    }
}
