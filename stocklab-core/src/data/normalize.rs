//! Raw provider records → ordered daily series plus quote summary.

use log::{debug, warn};

use super::provider::RawRecord;
use crate::domain::{PriceBar, PriceSeries, QuoteSummary};

/// Normalize schema-checked records for one symbol.
///
/// Timestamps are truncated to the calendar date in the offset the provider
/// sent. Provider order is not trusted: bars are sorted ascending, and a
/// repeated date keeps its first occurrence. Zero records yield an empty
/// series and no summary.
pub fn normalize(symbol: &str, records: Vec<RawRecord>) -> (PriceSeries, Option<QuoteSummary>) {
    let received = records.len();
    let bars: Vec<PriceBar> = records.into_iter().map(to_bar).collect();
    let series = PriceSeries::from_bars(symbol, bars);

    if series.len() < received {
        warn!(
            "{symbol}: dropped {} duplicate-date record(s)",
            received - series.len()
        );
    }

    let insane = series.bars().iter().filter(|bar| !bar.is_sane()).count();
    if insane > 0 {
        debug!("{symbol}: {insane} bar(s) with inconsistent OHLC ranges");
    }

    let summary = QuoteSummary::from_bars(series.bars());
    (series, summary)
}

fn to_bar(record: RawRecord) -> PriceBar {
    PriceBar {
        date: record.timestamp.date_naive(),
        open: record.open,
        high: record.high,
        low: record.low,
        close: record.close,
        volume: record.volume,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate};

    fn raw(ts: &str, close: f64, volume: u64) -> RawRecord {
        RawRecord {
            symbol: "AAPL".into(),
            timestamp: DateTime::parse_from_rfc3339(ts).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn truncates_and_sorts() {
        let (series, summary) = normalize(
            "AAPL",
            vec![
                raw("2024-01-03T16:00:00+00:00", 105.0, 20),
                raw("2024-01-02T00:00:00+00:00", 100.0, 10),
            ],
        );
        let dates: Vec<_> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date("2024-01-02"), date("2024-01-03")]);

        let summary = summary.unwrap();
        assert_eq!(summary.price, 105.0);
        assert_eq!(summary.previous_close, 100.0);
        assert_eq!(summary.change, 5.0);
        assert!((summary.change_percent - 0.05).abs() < 1e-12);
        assert_eq!(summary.volume, 20);
    }

    #[test]
    fn truncation_uses_provider_offset() {
        // 23:30 at -05:00 is already the next day in UTC; the provider's date wins.
        let (series, _) = normalize("AAPL", vec![raw("2024-01-02T23:30:00-05:00", 1.0, 1)]);
        assert_eq!(series.bars()[0].date, date("2024-01-02"));
    }

    #[test]
    fn same_day_timestamps_collapse() {
        let (series, _) = normalize(
            "AAPL",
            vec![
                raw("2024-01-02T00:00:00+00:00", 100.0, 1),
                raw("2024-01-02T20:00:00+00:00", 999.0, 1),
            ],
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series.bars()[0].close, 100.0);
    }

    #[test]
    fn empty_input_has_no_summary() {
        let (series, summary) = normalize("AAPL", Vec::new());
        assert!(series.is_empty());
        assert_eq!(series.symbol(), "AAPL");
        assert!(summary.is_none());
    }
}
