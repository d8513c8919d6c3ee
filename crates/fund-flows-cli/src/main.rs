//! fund-flows command line
//!
//! Runs the daily tracker update against a static HTML page.
//!
//! Subcommands:
//!   - `update`  - fetch price, compute metrics, generate narrative, rewrite the page
//!   - `history` - print the persisted records as JSON
//!   - `init`    - write a starter tracker page

mod commands;

use std::path::PathBuf;

use agent_core::provider::DEFAULT_MODEL;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use fund_flows::config::{DEFAULT_FALLBACK_OFFSET, DEFAULT_STATE_FILE};
use fund_flows::exchange::COINGECKO_BASE_URL;
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "fund-flows",
    version,
    about = "Daily Bitcoin ETF flow tracker that maintains a static HTML page",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch today's metrics and rewrite the tracker page
    Update(UpdateArgs),
    /// Print persisted records as JSON
    History(StateArgs),
    /// Write a starter tracker page
    Init(InitArgs),
}

#[derive(Args)]
struct StateArgs {
    /// Tracker page to read and rewrite
    #[arg(long, env = "FUND_FLOWS_STATE", default_value = DEFAULT_STATE_FILE)]
    state: PathBuf,
}

#[derive(Args)]
struct UpdateArgs {
    #[command(flatten)]
    state: StateArgs,

    /// Current total fund holdings in BTC
    #[arg(long, env = "FUND_HOLDINGS_BTC")]
    holdings: Decimal,

    /// Subtracted from holdings when the previous value cannot be read
    #[arg(long, env = "FUND_FLOWS_FALLBACK_OFFSET", default_value_t = DEFAULT_FALLBACK_OFFSET)]
    fallback_offset: Decimal,

    /// Text-generation model
    #[arg(long, env = "FUND_FLOWS_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Price service base URL
    #[arg(long, env = "FUND_FLOWS_PRICE_URL", default_value = COINGECKO_BASE_URL)]
    price_url: String,

    /// Price service asset id
    #[arg(long, default_value = "bitcoin")]
    coin: String,

    /// Quote currency
    #[arg(long, default_value = "usd")]
    currency: String,

    /// Record date (defaults to today, local time)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Fail instead of writing a placeholder when the narrative cannot be generated
    #[arg(long)]
    require_narrative: bool,

    /// Run every stage but do not write the page
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct InitArgs {
    #[command(flatten)]
    state: StateArgs,

    /// Overwrite an existing page
    #[arg(long)]
    force: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Update(args) => commands::update(args).await,
        Commands::History(args) => commands::history(&args),
        Commands::Init(args) => commands::init(&args),
    }
}
