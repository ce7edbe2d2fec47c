//! Plain-text rendering of ticker reports.

use std::fmt;

use stocklab_core::{QuoteSummary, TickerReport};

pub const DISCLAIMER: &str = "Data provided by Marketstack. This report is for informational \
purposes only and not investment advice.";

/// Summary block plus the last `rows` bars with both moving averages.
pub fn render_report(report: &TickerReport, rows: usize) -> String {
    ReportText { report, rows }.to_string()
}

pub fn render_summary(summary: &QuoteSummary) -> String {
    SummaryText(summary).to_string()
}

struct ReportText<'a> {
    report: &'a TickerReport,
    rows: usize,
}

impl fmt::Display for ReportText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let windows = self.report.windows();
        let series = self.report.series();

        writeln!(f, "=== {} Stock Report ===", self.report.symbol())?;
        if let (Some(first), Some(last)) = (series.first(), series.last()) {
            writeln!(
                f,
                "Period:         {} to {} ({} bars)",
                first.date,
                last.date,
                series.len()
            )?;
        }
        writeln!(f, "{}", SummaryText(self.report.summary()))?;

        writeln!(
            f,
            "{:<10} {:>10} {:>10} {:>10} {:>10} {:>14} {:>10} {:>10}",
            "Date",
            "Open",
            "High",
            "Low",
            "Close",
            "Volume",
            format!("{}-Day MA", windows.short),
            format!("{}-Day MA", windows.long),
        )?;
        writeln!(f, "{}", "-".repeat(93))?;
        for row in self.report.tail_rows(self.rows) {
            writeln!(
                f,
                "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>14} {:>10} {:>10}",
                row.date,
                row.open,
                row.high,
                row.low,
                row.close,
                format_volume(row.volume),
                format_optional(row.ma_short),
                format_optional(row.ma_long),
            )?;
        }
        Ok(())
    }
}

struct SummaryText<'a>(&'a QuoteSummary);

impl fmt::Display for SummaryText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        writeln!(f, "Current Price:  ${:.2}", summary.price)?;
        writeln!(
            f,
            "Daily Change:   {} ({:+.2}%)",
            format_signed_money(summary.change),
            summary.change_percent * 100.0
        )?;
        writeln!(f, "Previous Close: ${:.2}", summary.previous_close)?;
        writeln!(f, "Volume:         {}", format_volume(summary.volume))
    }
}

/// `1234567` → `1,234,567`.
pub fn format_volume(volume: u64) -> String {
    let digits = volume.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `5.0` → `+$5.00`, `-1.5` → `-$1.50`.
pub fn format_signed_money(value: f64) -> String {
    let sign = if value < 0.0 { '-' } else { '+' };
    format!("{sign}${:.2}", value.abs())
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_report;

    #[test]
    fn volume_thousands_separators() {
        assert_eq!(format_volume(0), "0");
        assert_eq!(format_volume(999), "999");
        assert_eq!(format_volume(1_000), "1,000");
        assert_eq!(format_volume(1_234_567), "1,234,567");
        assert_eq!(format_volume(12_345_678), "12,345,678");
    }

    #[test]
    fn signed_money() {
        assert_eq!(format_signed_money(5.0), "+$5.00");
        assert_eq!(format_signed_money(-1.5), "-$1.50");
        assert_eq!(format_signed_money(0.0), "+$0.00");
    }

    #[test]
    fn summary_block_shows_percent_change() {
        let summary = QuoteSummary {
            price: 105.0,
            change: 5.0,
            change_percent: 0.05,
            previous_close: 100.0,
            volume: 2_500_000,
        };
        let text = render_summary(&summary);
        assert!(text.contains("Current Price:  $105.00"));
        assert!(text.contains("+$5.00 (+5.00%)"));
        assert!(text.contains("Previous Close: $100.00"));
        assert!(text.contains("2,500,000"));
    }

    #[test]
    fn report_table_shows_last_rows_only() {
        let closes: Vec<f64> = (1..=30).map(f64::from).collect();
        let report = sample_report(&closes, 5, 20);
        let text = render_report(&report, 10);

        assert!(text.starts_with("=== TEST Stock Report ==="));
        assert!(text.contains("5-Day MA"));
        assert!(text.contains("20-Day MA"));
        assert!(text.contains("2024-01-31"));
        assert!(!text.contains("2024-01-21 "));
        assert!(text.contains("2024-01-22 "));
    }

    #[test]
    fn undefined_averages_render_as_dash() {
        let report = sample_report(&[1.0, 2.0, 3.0], 5, 20);
        let text = render_report(&report, 10);
        let last_line = text.lines().last().unwrap();
        assert!(last_line.ends_with("         -          -"));
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn report_places_summary_between_header_and_table() {
        let report = sample_report(&[100.0, 105.0], 5, 20);
        let text = render_report(&report, 10);
        let summary = render_summary(report.summary());

        let at = text.find(&summary).expect("summary block missing");
        assert!(text[..at].starts_with("=== TEST Stock Report ===\nPeriod:"));
        assert!(text[at + summary.len()..].starts_with("\nDate "));
        assert_eq!(text.lines().count(), 2 + 4 + 1 + 2 + 2);
    }
}
