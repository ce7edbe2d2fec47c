//! Report fixtures shared by the CLI unit tests.

use chrono::{Duration, NaiveDate};
use stocklab_core::{MaWindows, PriceBar, PriceSeries, QuoteSummary, TickerReport};

/// One bar per calendar day from 2024-01-02: high/low = close ± 1, volume 1000.
pub fn sample_report(closes: &[f64], short: usize, long: usize) -> TickerReport {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        })
        .collect();
    let series = PriceSeries::from_bars("TEST", bars);
    let summary = QuoteSummary::from_bars(series.bars()).unwrap();
    TickerReport::new(series, summary, MaWindows::new(short, long))
}
