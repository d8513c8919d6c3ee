//! # fund-flows
//!
//! Daily tracker for a spot Bitcoin fund: fetches the price, derives flow and
//! AUM from the operator-supplied holdings, asks an LLM for a short write-up,
//! and rewrites a static HTML page in one atomic step.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────┐    ┌────────────────┐
//! │   Metrics    │───▶│    Narrative     │───▶│  Document      │──▶ atomic write
//! │   Fetcher    │    │    Generator     │    │  (inject)      │
//! └──────────────┘    └──────────────────┘    └────────────────┘
//!   PriceSource         LlmProvider             pure text transform
//!   + prior page        (degrades to a
//!                        placeholder)
//! ```
//!
//! ## Example record
//!
//! ```text
//! previous holdings   305,613.5 BTC
//! holdings            306,050.0 BTC
//! price               $65,000
//! ───────────────────────────────────
//! btcFlow                 436.5 BTC
//! aum          $19,893,250,000.0
//! usdFlow          $28,372,500.0
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod exchange;
pub mod fetcher;
pub mod model;
pub mod narrative;
pub mod pipeline;
pub mod store;

pub use config::TrackerConfig;
pub use document::{Markers, TrackerDocument};
pub use error::{EntryError, HoldingsLookupError, Result, TrackerError};
pub use exchange::{CoinGeckoClient, FixedPriceSource, PriceSource};
pub use fetcher::MetricsFetcher;
pub use model::{FetchedMetrics, MetricRecord, PreviousHoldings};
pub use narrative::{NarrativeError, NarrativeGenerator};
pub use pipeline::{DailyUpdate, RunReport};
