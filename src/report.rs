use crate::error::Result;
use crate::structs::{AggregateRow, OutputPaths, Record};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthInsight {
    pub month: String,
    pub value: f64,
}

/// Headline numbers of a run, written as `summary.json` and rendered into the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_days: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub monthly_rows: usize,
    pub yearly_rows: usize,
    /// Month with the highest mean temperature.
    pub hottest_month: Option<MonthInsight>,
    /// Month with the highest total rainfall.
    pub wettest_month: Option<MonthInsight>,
}

pub fn summarize(
    series: &[Record],
    monthly: &[AggregateRow],
    yearly: &[AggregateRow],
) -> ReportSummary {
    ReportSummary {
        total_days: series.len(),
        first_date: series.iter().map(|r| r.date).min(),
        last_date: series.iter().map(|r| r.date).max(),
        monthly_rows: monthly.len(),
        yearly_rows: yearly.len(),
        hottest_month: peak_month(monthly, |r| r.temp_mean_mean),
        wettest_month: peak_month(monthly, |r| Some(r.rainfall_mm_sum)),
    }
}

/// First month holding the maximum of `metric`; months without a value are skipped.
fn peak_month<F>(monthly: &[AggregateRow], metric: F) -> Option<MonthInsight>
where
    F: Fn(&AggregateRow) -> Option<f64>,
{
    monthly
        .iter()
        .filter_map(|r| metric(r).map(|v| (r, v)))
        .fold(None, |best: Option<(&AggregateRow, f64)>, (row, v)| match best {
            Some((_, b)) if v.partial_cmp(&b) != Some(Ordering::Greater) => best,
            _ => Some((row, v)),
        })
        .map(|(row, value)| MonthInsight {
            month: row.bucket.label(),
            value,
        })
}

/// Renders the Markdown report.
pub fn render_report(summary: &ReportSummary, paths: &OutputPaths) -> String {
    let date_range = match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => format!("{} to {}", first, last),
        _ => "n/a".to_string(),
    };
    let hottest = summary.hottest_month.as_ref().map_or_else(
        || "n/a".to_string(),
        |m| format!("{} (avg temp {:.2}°C)", m.month, m.value),
    );
    let wettest = summary.wettest_month.as_ref().map_or_else(
        || "n/a".to_string(),
        |m| format!("{} ({:.1} mm rain)", m.month, m.value),
    );

    let mut text = String::new();
    text.push_str("# Weather Data Report\n\n");
    text.push_str("## Overview\n");
    text.push_str(&format!("- Total days: {}\n", summary.total_days));
    text.push_str(&format!("- Date range: {}\n", date_range));
    text.push_str(&format!(
        "- Summary rows: {} monthly, {} yearly\n\n",
        summary.monthly_rows, summary.yearly_rows
    ));
    text.push_str("## Insights\n");
    text.push_str(&format!("- **Hottest Month:** {}\n", hottest));
    text.push_str(&format!("- **Wettest Month:** {}\n\n", wettest));
    text.push_str("## Files Generated\n");
    text.push_str(&format!(
        "- Cleaned CSV (`{}`)\n",
        paths.cleaned_csv.display()
    ));
    text.push_str(&format!(
        "- Monthly summary (`{}`, `{}`)\n",
        paths.monthly_csv.display(),
        paths.monthly_parquet.display()
    ));
    text.push_str(&format!(
        "- Yearly summary (`{}`, `{}`)\n",
        paths.yearly_csv.display(),
        paths.yearly_parquet.display()
    ));
    text.push_str(&format!(
        "- Summary stats (`{}`)\n",
        paths.summary_json.display()
    ));
    text.push_str(&format!("- PNG Plots in `{}/`\n", paths.plots_dir.display()));
    text
}

pub fn write_report(text: &str, path: &Path) -> Result<()> {
    std::fs::write(path, text)?;
    Ok(())
}
