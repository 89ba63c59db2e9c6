use crate::aggregate::{mean, sample_std};
use crate::clean::parse_f64;
use crate::structs::RawTable;
use log::info;

const HEAD_ROWS: usize = 5;

/// Descriptive statistics of a fully numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub non_empty: usize,
    /// Present only when every non-empty cell parses as a finite number.
    pub numeric: Option<NumericSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableProfile {
    pub rows: usize,
    pub columns: Vec<ColumnProfile>,
}

/// Profiles a raw table before cleaning: fill counts per column and a numeric
/// summary for columns that are numeric throughout.
pub fn profile(raw: &RawTable) -> TableProfile {
    let columns = raw
        .headers
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let cells: Vec<&str> = (0..raw.len())
                .filter_map(|row| raw.cell(row, col))
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .collect();
            let parsed: Option<Vec<f64>> = cells.iter().map(|&c| parse_f64(Some(c))).collect();
            ColumnProfile {
                name: name.clone(),
                non_empty: cells.len(),
                numeric: parsed.and_then(|values| summarize(&values)),
            }
        })
        .collect();
    TableProfile {
        rows: raw.len(),
        columns,
    }
}

fn summarize(values: &[f64]) -> Option<NumericSummary> {
    let mean = mean(values)?;
    Some(NumericSummary {
        count: values.len(),
        mean,
        std: sample_std(values),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Logs the first rows of the table followed by its profile.
pub fn log_profile(raw: &RawTable, profile: &TableProfile) {
    info!("Head: {}", raw.headers.join(", "));
    for row in raw.rows.iter().take(HEAD_ROWS) {
        info!("      {}", row.join(", "));
    }
    info!(
        "Info: {} rows x {} columns",
        profile.rows,
        profile.columns.len()
    );
    for col in &profile.columns {
        match &col.numeric {
            Some(n) => info!(
                "  {:<12} non-null={:<6} mean={:.2} std={} min={:.2} max={:.2}",
                col.name,
                col.non_empty,
                n.mean,
                n.std.map_or_else(|| "n/a".to_string(), |s| format!("{:.2}", s)),
                n.min,
                n.max
            ),
            None => info!("  {:<12} non-null={}", col.name, col.non_empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> RawTable {
        RawTable {
            headers: vec!["date".into(), "temp_mean".into(), "humidity".into()],
            rows: vec![
                vec!["2023-01-01".into(), "10".into(), "50".into()],
                vec!["2023-01-02".into(), "".into(), "60".into()],
                vec!["2023-01-03".into(), "20".into()],
            ],
        }
    }

    #[test]
    fn test_profile_counts_and_numeric_summary() {
        let p = profile(&sample_table());
        assert_eq!(p.rows, 3);

        let date = &p.columns[0];
        assert_eq!(date.non_empty, 3);
        assert!(date.numeric.is_none());

        let temp = p.columns[1].numeric.as_ref().unwrap();
        assert_eq!(p.columns[1].non_empty, 2);
        assert_eq!(temp.count, 2);
        assert_eq!(temp.mean, 15.0);
        assert_eq!(temp.min, 10.0);
        assert_eq!(temp.max, 20.0);

        // Short third row counts as missing humidity
        assert_eq!(p.columns[2].non_empty, 2);
    }

    #[test]
    fn test_empty_column_has_no_summary() {
        let raw = RawTable {
            headers: vec!["rainfall_mm".into()],
            rows: vec![vec!["".into()], vec![" ".into()]],
        };
        let p = profile(&raw);
        assert_eq!(p.columns[0].non_empty, 0);
        assert!(p.columns[0].numeric.is_none());
    }

    #[test]
    fn test_non_finite_cells_make_column_non_numeric() {
        let raw = RawTable {
            headers: vec!["temp_mean".into(), "humidity".into()],
            rows: vec![
                vec!["10".into(), "50".into()],
                vec!["NaN".into(), "inf".into()],
                vec!["20".into(), "60".into()],
            ],
        };
        let p = profile(&raw);
        assert_eq!(p.columns[0].non_empty, 3);
        assert!(p.columns[0].numeric.is_none());
        assert!(p.columns[1].numeric.is_none());
    }
}
