//! TOML configuration for report runs.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. The API key may live in the file, but the environment
//! variable named by `provider.api_key_env` takes precedence over it.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration as StdDuration;
use thiserror::Error;

use crate::data::marketstack::{ProviderSettings, DEFAULT_BASE_URL, MAX_LIMIT};
use crate::indicators::MaWindows;

pub const DEFAULT_API_KEY_ENV: &str = "MARKETSTACK_API_KEY";

/// Upper bound for `report.lookback_days` (100 years).
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

/// Configuration errors. These abort the run before any request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("no API key: pass --api-key, set ${env_var}, or add provider.api_key to the config")]
    MissingApiKey { env_var: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockLabConfig {
    pub provider: ProviderConfig,
    pub report: ReportConfig,
}

/// `[provider]` section.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub limit: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: 30,
            limit: MAX_LIMIT,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_env", &self.api_key_env)
            .field("timeout_secs", &self.timeout_secs)
            .field("limit", &self.limit)
            .finish()
    }
}

/// `[report]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub tickers: Vec<String>,
    pub lookback_days: u32,
    pub ma_short: usize,
    pub ma_long: usize,
    pub table_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let windows = MaWindows::default();
        Self {
            tickers: vec!["AAPL".into(), "GOOGL".into()],
            lookback_days: 365,
            ma_short: windows.short,
            ma_long: windows.long,
            table_rows: 10,
        }
    }
}

impl StockLabConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Copy with the file API key masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.provider.api_key.is_some() {
            copy.provider.api_key = Some("<redacted>".into());
        }
        copy
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.windows().validate().map_err(ConfigError::Invalid)?;
        if self.provider.limit == 0 || self.provider.limit > MAX_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "provider.limit must be in 1..={MAX_LIMIT}, got {}",
                self.provider.limit
            )));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "provider.timeout_secs must be positive".into(),
            ));
        }
        if self.report.lookback_days == 0 || self.report.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ConfigError::Invalid(format!(
                "report.lookback_days must be in 1..={MAX_LOOKBACK_DAYS}, got {}",
                self.report.lookback_days
            )));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.base_url is empty".into()));
        }
        Ok(())
    }

    pub fn windows(&self) -> MaWindows {
        MaWindows::new(self.report.ma_short, self.report.ma_long)
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            base_url: self.provider.base_url.clone(),
            timeout: StdDuration::from_secs(self.provider.timeout_secs),
            limit: self.provider.limit,
        }
    }

    /// Resolve the API key: explicit value, then environment, then config file.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        self.resolve_api_key_with(explicit, |name| std::env::var(name).ok())
    }

    /// As [`resolve_api_key`](Self::resolve_api_key) with an injectable env lookup.
    pub fn resolve_api_key_with(
        &self,
        explicit: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        explicit
            .map(str::to_string)
            .or_else(|| env(&self.provider.api_key_env))
            .or_else(|| self.provider.api_key.clone())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                env_var: self.provider.api_key_env.clone(),
            })
    }

    /// Inclusive date range: `end` defaults to `today`, `start` to
    /// `end - lookback_days`. Rejects `start > end`.
    pub fn date_range(
        &self,
        today: NaiveDate,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(NaiveDate, NaiveDate), ConfigError> {
        let end = end.unwrap_or(today);
        let start = match start {
            Some(start) => start,
            None => end
                .checked_sub_signed(Duration::days(i64::from(self.report.lookback_days)))
                .ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "lookback of {} days from {end} is out of range",
                        self.report.lookback_days
                    ))
                })?,
        };
        if start > end {
            return Err(ConfigError::Invalid(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok((start, end))
    }
}
