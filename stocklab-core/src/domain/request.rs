//! FetchRequest: one ticker over one inclusive date range.

use chrono::NaiveDate;
use std::fmt;

/// Parameters for a single end-of-day fetch.
///
/// `start_date <= end_date` is the caller's responsibility; the fetcher sends
/// whatever range it is given.
#[derive(Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub api_key: String,
}

impl FetchRequest {
    pub fn new(
        ticker: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            start_date,
            end_date,
            api_key: api_key.into(),
        }
    }
}

// Hand-written so the access key never reaches logs or panic messages.
impl fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchRequest")
            .field("ticker", &self.ticker)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let req = FetchRequest::new(
            "AAPL",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            "secret-key-123",
        );
        let rendered = format!("{req:?}");
        assert!(rendered.contains("AAPL"));
        assert!(!rendered.contains("secret-key-123"));
    }
}
