//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over the end-of-day source so the report
//! pipeline can be driven by the real HTTP fetcher or by an in-memory fake.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{FetchRequest, PriceSeries, QuoteSummary};

/// One provider record that passed schema checks, before normalization.
///
/// `timestamp` keeps whatever offset the provider sent; the normalizer
/// truncates it to a calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub symbol: String,
    pub timestamp: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Per-ticker failures. None of these is fatal to a multi-ticker run.
///
/// Messages are written to be shown directly to the user.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("no data returned for {symbol} in the requested date range")]
    NoData { symbol: String },

    #[error("unexpected response shape: {0}")]
    Schema(String),
}

impl DataError {
    /// Short machine-friendly label for the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::NoData { .. } => "no_data",
            Self::Schema(_) => "schema",
        }
    }
}

/// Result of a successful fetch for a single ticker.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub series: PriceSeries,
    pub summary: QuoteSummary,
}

/// Trait for end-of-day data providers.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for `request.ticker` over the inclusive date range.
    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError>;
}

/// Progress callback for multi-ticker runs.
pub trait DownloadProgress {
    /// Called when starting to fetch a ticker.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a ticker fetch completes.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<(), DataError>);

    /// Called when every ticker has been attempted.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that writes to stderr, leaving stdout for the report.
pub struct StderrProgress;

impl DownloadProgress for StderrProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        eprintln!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: &Result<(), DataError>,
    ) {
        match result {
            Ok(()) => eprintln!("  OK: {symbol}"),
            Err(e) => eprintln!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        eprintln!("Fetch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}
