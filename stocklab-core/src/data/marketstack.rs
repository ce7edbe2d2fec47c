//! Marketstack end-of-day provider.
//!
//! Issues one GET per ticker against the `/eod` endpoint, validates the JSON
//! shape, keeps only the records for the requested symbol, and hands them to
//! the normalizer. The response body is treated as an untyped contract: it is
//! parsed into a `serde_json::Value` and every field is checked explicitly. A
//! provider format change surfaces as `DataError::Schema`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde_json::{Map, Value};

use super::normalize::normalize;
use super::provider::{DataError, DataProvider, FetchResult, RawRecord};
use super::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use crate::domain::FetchRequest;

pub const DEFAULT_BASE_URL: &str = "http://api.marketstack.com/v1/eod";

/// Provider page-size cap. Requests never paginate past it.
pub const MAX_LIMIT: u32 = 1000;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields every kept record must carry.
const REQUIRED_FIELDS: [&str; 6] = ["open", "high", "low", "close", "volume", "date"];

/// Connection settings for the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub limit: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            limit: MAX_LIMIT,
        }
    }
}

/// Marketstack end-of-day data provider.
#[derive(Clone)]
pub struct MarketstackProvider {
    transport: Arc<dyn HttpTransport>,
    settings: ProviderSettings,
}

impl MarketstackProvider {
    /// Provider backed by a real blocking HTTP client.
    pub fn new(settings: ProviderSettings) -> Result<Self, DataError> {
        let transport = ReqwestTransport::new().map_err(|e| DataError::Network(e.to_string()))?;
        Ok(Self::with_transport(Arc::new(transport), settings))
    }

    /// Provider over an arbitrary transport (used by tests).
    pub fn with_transport(transport: Arc<dyn HttpTransport>, settings: ProviderSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Build the `/eod` request for a ticker and inclusive date range.
    pub fn eod_request(&self, request: &FetchRequest) -> HttpRequest {
        HttpRequest::get(&self.settings.base_url)
            .with_query("access_key", &request.api_key)
            .with_query("symbols", &request.ticker)
            .with_query("date_from", request.start_date.format(DATE_FORMAT).to_string())
            .with_query("date_to", request.end_date.format(DATE_FORMAT).to_string())
            .with_query("limit", self.settings.limit.min(MAX_LIMIT).to_string())
            .with_query("sort", "ASC")
            .with_timeout(self.settings.timeout)
    }

    /// Validate a response body and extract the records for `symbol`.
    pub fn parse_records(symbol: &str, body: &str) -> Result<Vec<RawRecord>, DataError> {
        let root: Value = serde_json::from_str(body)
            .map_err(|e| DataError::Schema(format!("response for {symbol} is not JSON: {e}")))?;

        let Some(data) = root.get("data").and_then(Value::as_array) else {
            if let Some(message) = provider_error_message(&root) {
                warn!("{symbol}: provider returned no data array: {message}");
            }
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        };

        let matching: Vec<(usize, &Value)> = data
            .iter()
            .enumerate()
            .filter(|(_, record)| record.get("symbol").and_then(Value::as_str) == Some(symbol))
            .collect();

        if matching.len() < data.len() {
            debug!(
                "{symbol}: ignored {} record(s) for other symbols",
                data.len() - matching.len()
            );
        }

        if matching.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }

        matching
            .into_iter()
            .map(|(index, record)| {
                let fields = record.as_object().ok_or_else(|| {
                    DataError::Schema(format!("record {index} for {symbol} is not an object"))
                })?;
                parse_record(symbol, index, fields)
            })
            .collect()
    }
}

impl DataProvider for MarketstackProvider {
    fn name(&self) -> &str {
        "marketstack"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError> {
        let symbol = request.ticker.as_str();
        let http = self.eod_request(request);
        debug!("GET {}?{}", http.url, http.redacted_query());

        let response = self.transport.get(&http).map_err(|e| {
            if e.timed_out() {
                DataError::Network(format!("{symbol}: timed out after {:?}", http.timeout))
            } else {
                DataError::Network(format!("{symbol}: {e}"))
            }
        })?;

        if !response.is_success() {
            let detail = serde_json::from_str::<Value>(&response.body)
                .ok()
                .as_ref()
                .and_then(provider_error_message)
                .map(|message| format!(": {message}"))
                .unwrap_or_default();
            return Err(DataError::Network(format!(
                "HTTP {} for {symbol}{detail}",
                response.status
            )));
        }

        let records = Self::parse_records(symbol, &response.body)?;
        let (series, summary) = normalize(symbol, records);
        let summary = summary.ok_or_else(|| DataError::NoData {
            symbol: symbol.to_string(),
        })?;

        info!(
            "{symbol}: {} bars from {} to {}",
            series.len(),
            series.first().map(|b| b.date).unwrap_or(request.start_date),
            series.last().map(|b| b.date).unwrap_or(request.end_date),
        );

        Ok(FetchResult { series, summary })
    }
}

/// `error.message` (or `error.code`) from a provider error body, if present.
fn provider_error_message(root: &Value) -> Option<String> {
    let error = root.get("error")?;
    error
        .get("message")
        .or_else(|| error.get("code"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn parse_record(
    symbol: &str,
    index: usize,
    fields: &Map<String, Value>,
) -> Result<RawRecord, DataError> {
    for name in REQUIRED_FIELDS {
        if fields.get(name).map_or(true, Value::is_null) {
            return Err(DataError::Schema(format!(
                "record {index} for {symbol} is missing field `{name}`"
            )));
        }
    }

    let raw_date = fields["date"].as_str().ok_or_else(|| {
        DataError::Schema(format!("record {index} for {symbol}: `date` is not a string"))
    })?;
    let timestamp = parse_timestamp(raw_date).ok_or_else(|| {
        DataError::Schema(format!(
            "record {index} for {symbol}: unrecognized date `{raw_date}`"
        ))
    })?;

    Ok(RawRecord {
        symbol: symbol.to_string(),
        timestamp,
        open: price_field(symbol, index, fields, "open")?,
        high: price_field(symbol, index, fields, "high")?,
        low: price_field(symbol, index, fields, "low")?,
        close: price_field(symbol, index, fields, "close")?,
        volume: volume_field(symbol, index, fields)?,
    })
}

fn price_field(
    symbol: &str,
    index: usize,
    fields: &Map<String, Value>,
    name: &str,
) -> Result<f64, DataError> {
    fields[name].as_f64().ok_or_else(|| {
        DataError::Schema(format!(
            "record {index} for {symbol}: `{name}` is not a number"
        ))
    })
}

/// Volume may arrive as an integer or a whole-valued float (`1234567.0`).
fn volume_field(symbol: &str, index: usize, fields: &Map<String, Value>) -> Result<u64, DataError> {
    let value = &fields["volume"];
    if let Some(volume) = value.as_u64() {
        return Ok(volume);
    }
    match value.as_f64() {
        Some(volume) if volume >= 0.0 && volume.fract() == 0.0 && volume < u64::MAX as f64 => {
            Ok(volume as u64)
        }
        _ => Err(DataError::Schema(format!(
            "record {index} for {symbol}: `volume` is not a non-negative integer"
        ))),
    }
}

/// Accepts `2024-01-02T00:00:00+0000`, RFC 3339, a naive date-time, or a bare date.
/// Values without an offset are taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn record(symbol: &str, date: &str, close: f64) -> String {
        format!(
            r#"{{"symbol":"{symbol}","date":"{date}","open":{close},"high":{close},"low":{close},"close":{close},"volume":1000.0}}"#
        )
    }

    #[test]
    fn parses_marketstack_timestamp() {
        let ts = parse_timestamp("2024-01-02T00:00:00+0000").unwrap();
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn parses_bare_date_and_rfc3339() {
        assert_eq!(parse_timestamp("2024-03-15").unwrap().day(), 15);
        assert_eq!(parse_timestamp("2024-03-15T21:00:00Z").unwrap().day(), 15);
        assert_eq!(parse_timestamp("2024-03-15T21:00:00").unwrap().day(), 15);
        assert!(parse_timestamp("15/03/2024").is_none());
    }

    #[test]
    fn filters_other_symbols() {
        let body = format!(
            r#"{{"data":[{},{},{}]}}"#,
            record("AAPL", "2024-01-02T00:00:00+0000", 100.0),
            record("AAPL.MX", "2024-01-02T00:00:00+0000", 1.0),
            record("AAPL", "2024-01-03T00:00:00+0000", 105.0),
        );
        let records = MarketstackProvider::parse_records("AAPL", &body).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.symbol == "AAPL"));
    }

    #[test]
    fn missing_data_array_is_no_data() {
        let body = r#"{"error":{"code":"invalid_access_key","message":"bad key"}}"#;
        let err = MarketstackProvider::parse_records("AAPL", body).unwrap_err();
        assert!(matches!(err, DataError::NoData { .. }));
    }

    #[test]
    fn only_foreign_symbols_is_no_data() {
        let body = format!(
            r#"{{"data":[{}]}}"#,
            record("MSFT", "2024-01-02T00:00:00+0000", 1.0)
        );
        let err = MarketstackProvider::parse_records("AAPL", &body).unwrap_err();
        assert!(matches!(err, DataError::NoData { .. }));
    }

    #[test]
    fn null_required_field_is_schema_error() {
        let body = r#"{"data":[{"symbol":"AAPL","date":"2024-01-02","open":1,"high":1,"low":1,"close":null,"volume":5}]}"#;
        let err = MarketstackProvider::parse_records("AAPL", body).unwrap_err();
        match err {
            DataError::Schema(msg) => assert!(msg.contains("`close`")),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn negative_volume_is_schema_error() {
        let body = r#"{"data":[{"symbol":"AAPL","date":"2024-01-02","open":1,"high":1,"low":1,"close":1,"volume":-5}]}"#;
        let err = MarketstackProvider::parse_records("AAPL", body).unwrap_err();
        assert!(matches!(err, DataError::Schema(_)));
    }

    fn volume_body(volume: &str) -> String {
        format!(
            r#"{{"data":[{{"symbol":"AAPL","date":"2024-01-02","open":1,"high":1,"low":1,"close":1,"volume":{volume}}}]}}"#
        )
    }

    #[test]
    fn whole_float_volume_is_accepted() {
        let records = MarketstackProvider::parse_records("AAPL", &volume_body("1234567.0")).unwrap();
        assert_eq!(records[0].volume, 1_234_567);
    }

    #[test]
    fn fractional_volume_is_schema_error() {
        let err = MarketstackProvider::parse_records("AAPL", &volume_body("1.5")).unwrap_err();
        assert!(matches!(err, DataError::Schema(_)));
    }

    #[test]
    fn volume_beyond_u64_is_schema_error() {
        let err = MarketstackProvider::parse_records("AAPL", &volume_body("1e30")).unwrap_err();
        assert!(matches!(err, DataError::Schema(_)));
    }

    #[test]
    fn string_price_is_schema_error() {
        let body = r#"{"data":[{"symbol":"AAPL","date":"2024-01-02","open":"1.0","high":1,"low":1,"close":1,"volume":5}]}"#;
        let err = MarketstackProvider::parse_records("AAPL", body).unwrap_err();
        assert!(matches!(err, DataError::Schema(_)));
    }

    #[test]
    fn non_json_body_is_schema_error() {
        let err = MarketstackProvider::parse_records("AAPL", "<html>").unwrap_err();
        assert!(matches!(err, DataError::Schema(_)));
    }

    #[test]
    fn error_message_prefers_message_over_code() {
        let root: Value =
            serde_json::from_str(r#"{"error":{"code":"x","message":"quota reached"}}"#).unwrap();
        assert_eq!(provider_error_message(&root).as_deref(), Some("quota reached"));
        let root: Value = serde_json::from_str(r#"{"error":{"code":"x"}}"#).unwrap();
        assert_eq!(provider_error_message(&root).as_deref(), Some("x"));
    }
}
