//! Domain Models
//!
//! One `MetricRecord` per trading day. Uses `rust_decimal` for all monetary
//! and quantity values so the derived fields are exact.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{HoldingsLookupError, Result, TrackerError};

/// Daily fund metrics
///
/// `aum` and `usd_flow` are always derived from `price`, `holdings` and the
/// previous record's holdings; construct through [`MetricRecord::derive`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    /// Calendar date, unique within the persisted sequence
    pub date: NaiveDate,

    /// Asset price in the quote currency
    pub price: Decimal,

    /// Units of the asset held by the fund
    pub holdings: Decimal,

    /// Change in holdings since the previous record
    pub btc_flow: Decimal,

    /// Holdings valued at `price`
    pub aum: Decimal,

    /// `btc_flow` valued at `price`
    pub usd_flow: Decimal,
}

impl MetricRecord {
    pub fn derive(
        date: NaiveDate,
        price: Decimal,
        holdings: Decimal,
        previous_holdings: Decimal,
    ) -> Result<Self> {
        let overflow = |what: &str| {
            TrackerError::Overflow(format!(
                "{what} for holdings {holdings} at price {price} exceeds the decimal range"
            ))
        };

        let btc_flow = holdings
            .checked_sub(previous_holdings)
            .ok_or_else(|| overflow("flow"))?;
        let record = Self {
            date,
            price,
            holdings,
            btc_flow,
            aum: holdings.checked_mul(price).ok_or_else(|| overflow("AUM"))?,
            usd_flow: btc_flow
                .checked_mul(price)
                .ok_or_else(|| overflow("USD flow"))?,
        };
        debug_assert!(record.is_consistent());
        Ok(record)
    }

    /// Check the derived fields against the inputs they come from
    pub fn is_consistent(&self) -> bool {
        self.holdings.checked_mul(self.price) == Some(self.aum)
            && self.btc_flow.checked_mul(self.price) == Some(self.usd_flow)
    }
}

/// Where the previous day's holdings came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviousHoldings {
    /// Read from the last persisted entry
    Recorded(Decimal),

    /// Persisted sequence unusable; estimated as holdings minus the fallback offset
    Degraded {
        value: Decimal,
        reason: HoldingsLookupError,
    },
}

impl PreviousHoldings {
    pub const fn value(&self) -> Decimal {
        match self {
            Self::Recorded(value) | Self::Degraded { value, .. } => *value,
        }
    }

    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Output of the metrics stage
#[derive(Clone, Debug)]
pub struct FetchedMetrics {
    pub record: MetricRecord,
    pub previous: PreviousHoldings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, d).unwrap()
    }

    #[test]
    fn test_derive_scenario() {
        let record =
            MetricRecord::derive(day(5), dec!(65000), dec!(306050.0), dec!(305613.5)).unwrap();

        assert_eq!(record.btc_flow, dec!(436.5));
        assert_eq!(record.aum, dec!(19893250000));
        assert_eq!(record.usd_flow, dec!(28372500));
        assert!(record.is_consistent());
        assert_eq!(record.holdings - record.btc_flow, dec!(305613.5));
    }

    #[test]
    fn test_outflow_is_negative() {
        let record = MetricRecord::derive(day(6), dec!(64000.25), dec!(300000), dec!(300120.5)).unwrap();

        assert_eq!(record.btc_flow, dec!(-120.5));
        assert_eq!(record.usd_flow, dec!(-7712030.125));
        assert!(record.is_consistent());
    }

    #[test]
    fn test_tampered_record_is_inconsistent() {
        let mut record =
            MetricRecord::derive(day(5), dec!(65000), dec!(306050.0), dec!(305613.5)).unwrap();
        record.aum += Decimal::ONE;
        assert!(!record.is_consistent());
    }

    #[test]
    fn test_oversized_inputs_report_overflow() {
        let huge = Decimal::from(1_000_000_000_000_000_i64);
        let result = MetricRecord::derive(day(5), huge, huge, dec!(0));
        assert!(matches!(result, Err(TrackerError::Overflow(_))));
    }

    #[test]
    fn test_json_uses_camel_case() {
        let record =
            MetricRecord::derive(day(5), dec!(65000), dec!(306050.0), dec!(305613.5)).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["date"], "2024-11-05");
        assert!(json.get("btcFlow").is_some());
        assert!(json.get("usdFlow").is_some());
    }

    #[test]
    fn test_previous_holdings_value() {
        let degraded = PreviousHoldings::Degraded {
            value: dec!(305550.0),
            reason: HoldingsLookupError::EmptySequence,
        };
        assert!(degraded.is_degraded());
        assert_eq!(degraded.value(), dec!(305550.0));
        assert!(!PreviousHoldings::Recorded(dec!(1)).is_degraded());
    }
}
