//! CSV and JSON export of ticker reports.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use stocklab_core::report::ReportSnapshot;
use stocklab_core::TickerReport;

/// Export every row of a report as CSV.
///
/// Columns: date, open, high, low, close, volume, sma_<short>, sma_<long>.
/// Undefined averages are written as empty cells.
pub fn export_report_csv(report: &TickerReport) -> Result<String> {
    let windows = report.windows();
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date".to_string(),
        "open".to_string(),
        "high".to_string(),
        "low".to_string(),
        "close".to_string(),
        "volume".to_string(),
        format!("sma_{}", windows.short),
        format!("sma_{}", windows.long),
    ])?;

    for row in report.rows() {
        wtr.write_record([
            row.date.to_string(),
            format!("{:.4}", row.open),
            format!("{:.4}", row.high),
            format!("{:.4}", row.low),
            format!("{:.4}", row.close),
            row.volume.to_string(),
            row.ma_short.map(|v| format!("{v:.4}")).unwrap_or_default(),
            row.ma_long.map(|v| format!("{v:.4}")).unwrap_or_default(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write `<SYMBOL>.csv` under `dir`, creating the directory if needed.
pub fn write_report_csv(dir: &Path, report: &TickerReport) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create CSV dir: {}", dir.display()))?;
    let path = dir.join(format!("{}.csv", report.symbol()));
    let csv = export_report_csv(report)?;
    std::fs::write(&path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Serialize report snapshots to pretty JSON.
pub fn export_json(reports: &[TickerReport]) -> Result<String> {
    let snapshots: Vec<ReportSnapshot> = reports.iter().map(TickerReport::snapshot).collect();
    serde_json::to_string_pretty(&snapshots).context("failed to serialize reports to JSON")
}
