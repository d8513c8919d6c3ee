//! Metrics Fetcher
//!
//! Price from a [`PriceSource`], holdings from configuration, previous
//! holdings from the persisted page. Pure read and compute: nothing is
//! written here.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::TrackerConfig;
use crate::document::{self, Markers};
use crate::error::Result;
use crate::exchange::PriceSource;
use crate::model::{FetchedMetrics, MetricRecord, PreviousHoldings};

pub struct MetricsFetcher {
    source: Arc<dyn PriceSource>,
    holdings: Decimal,
    fallback_offset: Decimal,
    coin_id: String,
    vs_currency: String,
    markers: Markers,
}

impl MetricsFetcher {
    pub fn new(source: Arc<dyn PriceSource>, config: &TrackerConfig) -> Self {
        Self {
            source,
            holdings: config.holdings,
            fallback_offset: config.fallback_offset,
            coin_id: config.coin_id.clone(),
            vs_currency: config.vs_currency.clone(),
            markers: config.markers.clone(),
        }
    }

    /// Previous holdings from the last entry, or the fallback estimate
    pub fn previous_holdings(&self, prior_state: &str) -> PreviousHoldings {
        match document::last_holdings(prior_state, &self.markers) {
            Ok(value) => PreviousHoldings::Recorded(value),
            Err(reason) => PreviousHoldings::Degraded {
                value: self.holdings - self.fallback_offset,
                reason,
            },
        }
    }

    /// Build today's record. Price failures abort; holdings lookup failures
    /// degrade to the fallback.
    pub async fn fetch(&self, prior_state: &str, date: NaiveDate) -> Result<FetchedMetrics> {
        let price = self
            .source
            .spot_price(&self.coin_id, &self.vs_currency)
            .await?;
        tracing::info!(source = self.source.name(), %price, "Fetched spot price");

        let previous = self.previous_holdings(prior_state);
        if let PreviousHoldings::Degraded { value, reason } = &previous {
            tracing::warn!(
                fallback = %value,
                "Could not read previous holdings ({}); using configured holdings minus {}",
                reason,
                self.fallback_offset
            );
        }

        let record = MetricRecord::derive(date, price, self.holdings, previous.value())?;
        tracing::info!(
            date = %record.date,
            btc_flow = %record.btc_flow,
            aum = %record.aum,
            usd_flow = %record.usd_flow,
            "Computed fund metrics"
        );

        Ok(FetchedMetrics { record, previous })
    }
}
