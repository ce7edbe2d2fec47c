//! StockLab CLI: end-of-day stock reports in the terminal.
//!
//! Commands:
//! - `report`: fetch EOD bars per ticker, print quote summary and recent price table
//! - `config show`: print the effective configuration (API key redacted)
//! - `config init`: write a default configuration file

mod export;
mod render;
#[cfg(test)]
mod test_support;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use stocklab_core::data::StderrProgress;
use stocklab_core::{parse_tickers, run_reports, MarketstackProvider, StockLabConfig};

#[derive(Parser)]
#[command(
    name = "stocklab",
    version,
    about = "StockLab CLI: end-of-day stock reports with moving averages"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch end-of-day data and print a report per ticker.
    Report {
        /// Tickers, space- or comma-separated (e.g., AAPL MSFT or AAPL,GOOGL).
        /// Defaults to the tickers in the config file.
        tickers: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to `lookback_days` before the end date.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Short moving-average period (5-50).
        #[arg(long)]
        ma_short: Option<usize>,

        /// Long moving-average period (20-200).
        #[arg(long)]
        ma_long: Option<usize>,

        /// Number of most recent rows to show.
        #[arg(long)]
        rows: Option<usize>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// API key. Defaults to $MARKETSTACK_API_KEY, then the config file.
        #[arg(long)]
        api_key: Option<String>,

        /// Also write `<TICKER>.csv` files into this directory.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Print reports as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Configuration helpers.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration.
    Show {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write a default configuration file.
    Init {
        /// Destination path.
        #[arg(default_value = "stocklab.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

/// Report flags after clap parsing, before config merging.
struct ReportArgs {
    tickers: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    ma_short: Option<usize>,
    ma_long: Option<usize>,
    rows: Option<usize>,
    config: Option<PathBuf>,
    api_key: Option<String>,
    csv_dir: Option<PathBuf>,
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Report {
            tickers,
            start,
            end,
            ma_short,
            ma_long,
            rows,
            config,
            api_key,
            csv_dir,
            json,
        } => run_report(ReportArgs {
            tickers,
            start,
            end,
            ma_short,
            ma_long,
            rows,
            config,
            api_key,
            csv_dir,
            json,
        }),
        Commands::Config { action } => match action {
            ConfigAction::Show { config } => run_config_show(config.as_deref()),
            ConfigAction::Init { path, force } => run_config_init(&path, force),
        },
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<StockLabConfig> {
    match path {
        Some(path) => Ok(StockLabConfig::from_file(path)?),
        None => Ok(StockLabConfig::default()),
    }
}

fn parse_date(flag: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("--{flag} must be YYYY-MM-DD, got '{s}'"))
        })
        .transpose()
}

fn run_report(args: ReportArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(short) = args.ma_short {
        config.report.ma_short = short;
    }
    if let Some(long) = args.ma_long {
        config.report.ma_long = long;
    }
    if let Some(rows) = args.rows {
        config.report.table_rows = rows;
    }
    config.validate()?;

    let tickers = if args.tickers.is_empty() {
        parse_tickers(&config.report.tickers.join(","))
    } else {
        parse_tickers(&args.tickers.join(","))
    };
    if tickers.is_empty() {
        bail!("no tickers given: pass one or more symbols or set report.tickers in the config");
    }

    let today = chrono::Local::now().date_naive();
    let (start, end) = config.date_range(
        today,
        parse_date("start", args.start.as_deref())?,
        parse_date("end", args.end.as_deref())?,
    )?;

    let api_key = config.resolve_api_key(args.api_key.as_deref())?;
    let provider = MarketstackProvider::new(config.provider_settings())?;
    let windows = config.windows();

    info!(
        "reporting {} ticker(s) from {start} to {end} with MA {}/{}",
        tickers.len(),
        windows.short,
        windows.long
    );

    let batch = run_reports(
        &provider,
        &tickers,
        start,
        end,
        &api_key,
        windows,
        &StderrProgress,
    );

    if args.json {
        println!("{}", export::export_json(&batch.reports)?);
    } else {
        for report in &batch.reports {
            println!("{}", render::render_report(report, config.report.table_rows));
        }
        for (ticker, err) in &batch.failures {
            println!("Could not build a report for {ticker}: {err}");
        }
        println!();
        println!("{}", render::DISCLAIMER);
    }

    if let Some(dir) = &args.csv_dir {
        for report in &batch.reports {
            let path = export::write_report_csv(dir, report)?;
            eprintln!("CSV saved to: {}", path.display());
        }
    }

    if batch.all_failed() {
        bail!("all {} ticker(s) failed", batch.total());
    }
    Ok(())
}

fn run_config_show(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    print!("{}", config.redacted().to_toml()?);
    Ok(())
}

fn run_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        );
    }
    let text = StockLabConfig::default().to_toml()?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_report_flags() {
        let cli = Cli::try_parse_from([
            "stocklab",
            "report",
            "AAPL,MSFT",
            "GOOGL",
            "--start",
            "2024-01-01",
            "--ma-short",
            "10",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Report {
                tickers,
                start,
                ma_short,
                json,
                ..
            } => {
                assert_eq!(parse_tickers(&tickers.join(",")), vec!["AAPL", "MSFT", "GOOGL"]);
                assert_eq!(start.as_deref(), Some("2024-01-01"));
                assert_eq!(ma_short, Some(10));
                assert!(json);
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("start", Some("01/02/2024")).is_err());
        assert_eq!(
            parse_date("start", Some("2024-01-02")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(parse_date("end", None).unwrap(), None);
    }

    #[test]
    fn config_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stocklab.toml");
        run_config_init(&path, false).unwrap();
        assert!(StockLabConfig::from_file(&path).is_ok());
        assert!(run_config_init(&path, false).is_err());
        assert!(run_config_init(&path, true).is_ok());
    }
}
