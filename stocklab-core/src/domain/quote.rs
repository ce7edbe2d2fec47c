//! QuoteSummary: latest price plus day-over-day change.

use serde::{Deserialize, Serialize};

use super::bar::PriceBar;

/// Snapshot derived from the last one or two bars of a series.
///
/// `change_percent` is a fraction (0.05 means 5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub previous_close: f64,
    pub volume: u64,
}

impl QuoteSummary {
    /// Summarize date-ordered bars. Returns `None` for an empty slice.
    pub fn from_bars(bars: &[PriceBar]) -> Option<Self> {
        let last = bars.last()?;
        let previous_close = match bars.len() {
            1 => last.close,
            n => bars[n - 2].close,
        };
        let change = last.close - previous_close;
        let change_percent = if previous_close == 0.0 {
            0.0
        } else {
            change / previous_close
        };

        Some(Self {
            price: last.close,
            change,
            change_percent,
            previous_close,
            volume: last.volume,
        })
    }

    /// True when the latest close is at or above the previous close.
    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }
}
