//! Property tests for normalization invariants.
//!
//! Uses proptest to verify:
//! 1. Ordering: the series is strictly ascending by date, whatever the input order
//! 2. Summary: derived from the last two bars, with the zero-close guard

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use proptest::prelude::*;
use stocklab_core::data::{normalize, RawRecord};

fn base() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 2, 0, 0, 0)
        .unwrap()
}

fn arb_record() -> impl Strategy<Value = RawRecord> {
    (0i64..60, 0u32..86_400, 0.0..500.0_f64, 0u64..1_000_000).prop_map(
        |(day, secs, close, volume)| RawRecord {
            symbol: "TEST".into(),
            timestamp: base() + Duration::days(day) + Duration::seconds(i64::from(secs)),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        },
    )
}

proptest! {
    #[test]
    fn series_is_strictly_ascending(records in prop::collection::vec(arb_record(), 0..80)) {
        let distinct_days: std::collections::BTreeSet<_> =
            records.iter().map(|r| r.timestamp.date_naive()).collect();
        let (series, summary) = normalize("TEST", records);

        prop_assert_eq!(series.len(), distinct_days.len());
        for pair in series.bars().windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
        prop_assert_eq!(summary.is_some(), !series.is_empty());
    }

    #[test]
    fn summary_matches_last_two_bars(records in prop::collection::vec(arb_record(), 1..80)) {
        let (series, summary) = normalize("TEST", records);
        let summary = summary.unwrap();
        let bars = series.bars();
        let last = bars.last().unwrap();

        prop_assert_eq!(summary.price, last.close);
        prop_assert_eq!(summary.volume, last.volume);

        if bars.len() == 1 {
            prop_assert_eq!(summary.previous_close, summary.price);
            prop_assert_eq!(summary.change, 0.0);
        } else {
            prop_assert_eq!(summary.previous_close, bars[bars.len() - 2].close);
        }
        prop_assert_eq!(summary.change, summary.price - summary.previous_close);

        if summary.previous_close != 0.0 {
            prop_assert_eq!(summary.change_percent, summary.change / summary.previous_close);
        } else {
            prop_assert_eq!(summary.change_percent, 0.0);
        }
    }
}
