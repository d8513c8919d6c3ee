//! Subcommand handlers

use std::sync::Arc;

use anyhow::Context;
use chrono::Local;

use agent_runtime::GeminiProvider;
use fund_flows::{
    document::{self, entry::render_entry},
    store, CoinGeckoClient, DailyUpdate, TrackerConfig,
};

use crate::{InitArgs, StateArgs, UpdateArgs};

pub async fn update(args: UpdateArgs) -> anyhow::Result<()> {
    let mut config = TrackerConfig::new(args.state.state, args.holdings);
    config.fallback_offset = args.fallback_offset;
    config.model = args.model;
    config.price_base_url = args.price_url;
    config.coin_id = args.coin;
    config.vs_currency = args.currency;
    config.require_narrative = args.require_narrative;
    config.dry_run = args.dry_run;

    let prices = CoinGeckoClient::new(config.price_base_url.clone())
        .context("building price client")?;
    let provider = GeminiProvider::from_env().context("building text-generation client")?;
    if !provider.has_credential() {
        tracing::warn!("⚠ GEMINI_API_KEY not set - narrative will be a placeholder");
    }

    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    let report = DailyUpdate::new(Arc::new(prices), Arc::new(provider), config)?
        .run(today)
        .await
        .context("daily update failed")?;

    if report.previous.is_degraded() {
        tracing::warn!("Flow computed from fallback holdings {}", report.previous.value());
    }
    if let Some(e) = &report.narrative_error {
        tracing::warn!("Narrative placeholder written: {}", e);
    }

    if report.written {
        tracing::info!(
            "✓ Updated {} with data for {}",
            report.state_path.display(),
            report.record.date
        );
    } else {
        println!("{}", render_entry(&report.record));
        println!("{}", report.narrative);
    }
    Ok(())
}

pub fn history(args: &StateArgs) -> anyhow::Result<()> {
    let text = store::read_state(&args.state)?;
    let entries = document::read_records(&text, &fund_flows::Markers::default())
        .with_context(|| format!("reading records from {}", args.state.display()))?;

    let records: Vec<_> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, parsed)| match parsed {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping entry {}: {}", i + 1, e);
                None
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

pub fn init(args: &InitArgs) -> anyhow::Result<()> {
    store::init_page(&args.state.state, args.force)?;
    tracing::info!("✓ Wrote starter page {}", args.state.state.display());
    Ok(())
}
