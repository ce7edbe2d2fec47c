//! StockLab Core: end-of-day fetcher, normalizer, moving averages, report pipeline.
//!
//! This crate contains everything except presentation:
//! - Domain types (price bars, series, quote summary, fetch request)
//! - Marketstack EOD fetcher over a swappable blocking HTTP transport
//! - Normalizer: date truncation, ordering, de-duplication, quote summary
//! - Simple moving averages over closing prices
//! - Sequential multi-ticker report driver with per-ticker failure isolation
//! - TOML configuration and API key resolution

pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod report;

pub use config::{ConfigError, StockLabConfig};
pub use data::{DataError, DataProvider, FetchResult, MarketstackProvider, ProviderSettings};
pub use domain::{FetchRequest, PriceBar, PriceSeries, QuoteSummary};
pub use indicators::{MaWindows, Sma};
pub use report::{build_report, parse_tickers, run_reports, ReportBatch, ReportRow, TickerReport};
