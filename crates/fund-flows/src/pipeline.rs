//! Daily update run loop
//!
//! Owns the abort/degrade decisions: price failures and document failures
//! abort before any write, holdings lookup failures degrade inside the
//! fetcher, narrative failures degrade to a placeholder unless the config
//! requires a real narrative.

use std::path::PathBuf;
use std::sync::Arc;

use agent_core::LlmProvider;
use chrono::NaiveDate;

use crate::config::TrackerConfig;
use crate::document;
use crate::error::Result;
use crate::exchange::PriceSource;
use crate::fetcher::MetricsFetcher;
use crate::model::{MetricRecord, PreviousHoldings};
use crate::narrative::{NarrativeError, NarrativeGenerator};
use crate::store::{self, StateLock};

/// What a run did
#[derive(Debug)]
pub struct RunReport {
    pub record: MetricRecord,
    pub previous: PreviousHoldings,
    pub narrative: String,
    /// Set when `narrative` is a placeholder
    pub narrative_error: Option<NarrativeError>,
    pub state_path: PathBuf,
    /// False for dry runs
    pub written: bool,
}

pub struct DailyUpdate {
    fetcher: MetricsFetcher,
    narrator: NarrativeGenerator,
    config: TrackerConfig,
}

impl DailyUpdate {
    pub fn new(
        prices: Arc<dyn PriceSource>,
        provider: Arc<dyn LlmProvider>,
        config: TrackerConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fetcher: MetricsFetcher::new(prices, &config),
            narrator: NarrativeGenerator::new(provider, config.model.clone()),
            config,
        })
    }

    pub async fn run(&self, today: NaiveDate) -> Result<RunReport> {
        let path = &self.config.state_path;
        let _lock = if self.config.dry_run {
            None
        } else {
            Some(StateLock::acquire(path)?)
        };

        tracing::info!(path = %path.display(), "Reading tracker page");
        let prior = store::read_state(path)?;

        let fetched = self.fetcher.fetch(&prior, today).await?;

        let (narrative, narrative_error) = if self.config.require_narrative {
            (self.narrator.generate(&fetched.record).await?, None)
        } else {
            self.narrator.generate_or_placeholder(&fetched.record).await
        };

        let updated = document::inject(&prior, &fetched.record, &narrative, &self.config.markers)?;

        let written = if self.config.dry_run {
            tracing::info!("Dry run: leaving {} untouched", path.display());
            false
        } else {
            store::write_atomic(path, &updated)?;
            tracing::info!(date = %fetched.record.date, path = %path.display(), "Tracker page updated");
            true
        };

        Ok(RunReport {
            record: fetched.record,
            previous: fetched.previous,
            narrative,
            narrative_error,
            state_path: path.clone(),
            written,
        })
    }
}
