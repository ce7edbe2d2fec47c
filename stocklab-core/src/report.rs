//! Per-ticker report pipeline: fetch → normalize → moving averages.
//!
//! Tickers are processed one at a time. A failed ticker is recorded and the
//! run moves on; nothing is shared between iterations.

use chrono::NaiveDate;
use log::warn;
use serde::Serialize;

use crate::data::provider::{DataError, DataProvider, DownloadProgress};
use crate::domain::{FetchRequest, PriceSeries, QuoteSummary};
use crate::indicators::{MaWindows, Sma};

/// Everything the presentation layer needs for one ticker.
#[derive(Debug, Clone)]
pub struct TickerReport {
    series: PriceSeries,
    summary: QuoteSummary,
    windows: MaWindows,
    ma_short: Vec<f64>,
    ma_long: Vec<f64>,
}

impl TickerReport {
    pub fn new(series: PriceSeries, summary: QuoteSummary, windows: MaWindows) -> Self {
        let ma_short = Sma::new(windows.short).compute(series.bars());
        let ma_long = Sma::new(windows.long).compute(series.bars());
        Self {
            series,
            summary,
            windows,
            ma_short,
            ma_long,
        }
    }

    pub fn symbol(&self) -> &str {
        self.series.symbol()
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn summary(&self) -> &QuoteSummary {
        &self.summary
    }

    pub fn windows(&self) -> MaWindows {
        self.windows
    }

    /// One row per bar, oldest first.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.series
            .bars()
            .iter()
            .zip(self.ma_short.iter().zip(&self.ma_long))
            .map(|(bar, (&short, &long))| ReportRow {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                ma_short: defined(short),
                ma_long: defined(long),
            })
            .collect()
    }

    /// The most recent `n` rows, oldest first.
    pub fn tail_rows(&self, n: usize) -> Vec<ReportRow> {
        let mut rows = self.rows();
        let skip = rows.len().saturating_sub(n);
        rows.drain(..skip);
        rows
    }

    /// Serializable view: summary plus every row.
    pub fn snapshot(&self) -> ReportSnapshot {
        ReportSnapshot {
            symbol: self.symbol().to_string(),
            summary: self.summary,
            windows: self.windows,
            rows: self.rows(),
        }
    }
}

fn defined(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

/// A bar joined with both moving averages. `None` where a window is not yet full.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSnapshot {
    pub symbol: String,
    pub summary: QuoteSummary,
    pub windows: MaWindows,
    pub rows: Vec<ReportRow>,
}

/// Fetch one ticker and derive its report.
pub fn build_report(
    provider: &dyn DataProvider,
    request: &FetchRequest,
    windows: MaWindows,
) -> Result<TickerReport, DataError> {
    let fetched = provider.fetch(request)?;
    Ok(TickerReport::new(fetched.series, fetched.summary, windows))
}

/// Outcome of a multi-ticker run.
#[derive(Debug, Default)]
pub struct ReportBatch {
    pub reports: Vec<TickerReport>,
    pub failures: Vec<(String, DataError)>,
}

impl ReportBatch {
    pub fn total(&self) -> usize {
        self.reports.len() + self.failures.len()
    }

    pub fn all_failed(&self) -> bool {
        self.reports.is_empty() && !self.failures.is_empty()
    }
}

/// Build reports for each ticker in order, skipping failures.
pub fn run_reports(
    provider: &dyn DataProvider,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
    api_key: &str,
    windows: MaWindows,
    progress: &dyn DownloadProgress,
) -> ReportBatch {
    let total = tickers.len();
    let mut batch = ReportBatch::default();

    for (i, ticker) in tickers.iter().enumerate() {
        progress.on_start(ticker, i, total);

        let request = FetchRequest::new(ticker.as_str(), start, end, api_key);
        let outcome =
            build_report(provider, &request, windows).map(|report| batch.reports.push(report));
        if let Err(e) = &outcome {
            warn!("{ticker}: skipped ({}): {e}", e.kind());
        }
        progress.on_complete(ticker, i, total, &outcome);
        if let Err(e) = outcome {
            batch.failures.push((ticker.clone(), e));
        }
    }

    progress.on_batch_complete(batch.reports.len(), batch.failures.len(), total);
    batch
}

/// Split user input like `"aapl, MSFT googl"` into unique uppercase tickers.
pub fn parse_tickers(input: &str) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for raw in input.split(|c: char| c == ',' || c.is_whitespace()) {
        let ticker = raw.trim().to_ascii_uppercase();
        if !ticker.is_empty() && !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}
