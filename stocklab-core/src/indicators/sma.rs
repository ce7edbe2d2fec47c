//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a trailing window.
//! Lookback: period - 1 (first valid value at index period-1).

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::domain::PriceBar;

/// Allowed short-window periods.
pub const SHORT_RANGE: RangeInclusive<usize> = 5..=50;

/// Allowed long-window periods.
pub const LONG_RANGE: RangeInclusive<usize> = 20..=200;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    /// One value per bar; NaN until the window is full.
    pub fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        let mut sum: f64 = bars.iter().take(self.period).map(|bar| bar.close).sum();
        result[self.period - 1] = sum / self.period as f64;

        for i in self.period..n {
            sum += bars[i].close - bars[i - self.period].close;
            result[i] = sum / self.period as f64;
        }

        result
    }
}

/// Short and long moving-average windows shown side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaWindows {
    pub short: usize,
    pub long: usize,
}

impl MaWindows {
    pub fn new(short: usize, long: usize) -> Self {
        Self { short, long }
    }

    /// Check both periods against their allowed ranges.
    pub fn validate(&self) -> Result<(), String> {
        if !SHORT_RANGE.contains(&self.short) {
            return Err(format!(
                "short MA period {} outside {}..={}",
                self.short,
                SHORT_RANGE.start(),
                SHORT_RANGE.end()
            ));
        }
        if !LONG_RANGE.contains(&self.long) {
            return Err(format!(
                "long MA period {} outside {}..={}",
                self.long,
                LONG_RANGE.start(),
                LONG_RANGE.end()
            ));
        }
        Ok(())
    }
}

impl Default for MaWindows {
    fn default() -> Self {
        Self { short: 20, long: 50 }
    }
}
