use crate::structs::{Field, RawTable, Record, Series};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, warn};
use std::collections::HashMap;

const DATE_COLUMN: &str = "date";
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Cleans a raw weather table into a date-ordered [`Series`].
///
/// Never fails: dirty input degrades to nulls, dropped rows or an empty series.
///
/// # Steps
///
/// 1. Headers are trimmed and lower-cased; unknown columns are ignored and
///    missing numeric columns are treated as all-null.
/// 2. Dates are parsed; rows with a missing or unparseable date are dropped.
/// 3. Records are stably sorted by date (duplicate dates keep input order).
/// 4. Numeric cells are coerced to `f64`; anything unparseable becomes null.
/// 5. Each numeric field is interpolated over elapsed time, and leading or
///    trailing gaps take the nearest known value.
/// 6. Rainfall is floored at zero and any remaining null rainfall becomes zero.
pub fn clean(raw: &RawTable) -> Series {
    let columns = ColumnMap::from_headers(&raw.headers);
    let Some(date_col) = columns.date else {
        warn!("No '{}' column found, cleaned series is empty", DATE_COLUMN);
        return Vec::new();
    };
    for field in Field::ALL {
        if columns.field(field).is_none() {
            debug!("Column '{}' missing, treating it as all-null", field.name());
        }
    }

    let mut series: Series = Vec::with_capacity(raw.len());
    let mut dropped = 0usize;
    for row in 0..raw.len() {
        let Some(date) = parse_date(raw.cell(row, date_col)) else {
            dropped += 1;
            continue;
        };
        let mut record = Record::empty(date);
        for field in Field::ALL {
            let value = columns
                .field(field)
                .and_then(|col| parse_f64(raw.cell(row, col)));
            field.set(&mut record, value);
        }
        series.push(record);
    }
    if dropped > 0 {
        warn!("Dropped {} rows with missing or unparseable dates", dropped);
    }

    // Vec::sort_by_key is stable
    series.sort_by_key(|r| r.date);

    let dates: Vec<NaiveDate> = series.iter().map(|r| r.date).collect();
    for field in Field::ALL {
        let mut values: Vec<Option<f64>> = series.iter().map(|r| field.get(r)).collect();
        let filled = interpolate_time(&dates, &mut values);
        if filled > 0 {
            debug!("Filled {} missing '{}' values", filled, field.name());
        }
        for (record, value) in series.iter_mut().zip(values) {
            field.set(record, value);
        }
    }

    for record in &mut series {
        record.rainfall_mm = Some(record.rainfall_mm.map_or(0.0, |v| v.max(0.0)));
    }

    debug!(
        "Cleaned {} raw rows into {} records",
        raw.len(),
        series.len()
    );
    series
}

/// Fills nulls in `values` by time-weighted linear interpolation over `dates`.
///
/// Gaps between two known samples are interpolated by elapsed days; leading and
/// trailing gaps take the value of the nearest known sample. If the bounding
/// samples share a date the left one wins. A field with no known samples is left
/// untouched. `dates` must be sorted and the same length as `values`.
///
/// Returns the number of values that were filled.
pub fn interpolate_time(dates: &[NaiveDate], values: &mut [Option<f64>]) -> usize {
    debug_assert_eq!(dates.len(), values.len());
    let mut filled = 0usize;
    let mut prev: Option<usize> = None;

    for next in 0..values.len() {
        let Some(right) = values[next] else {
            continue;
        };
        match prev {
            // Leading run: extend the first known value backwards
            None => {
                for slot in &mut values[..next] {
                    *slot = Some(right);
                    filled += 1;
                }
            }
            Some(p) if next - p > 1 => {
                let left = values[p].unwrap_or(right);
                let span = (dates[next] - dates[p]).num_days() as f64;
                for k in p + 1..next {
                    let value = if span > 0.0 {
                        let frac = (dates[k] - dates[p]).num_days() as f64 / span;
                        left + (right - left) * frac
                    } else {
                        left
                    };
                    values[k] = Some(value);
                    filled += 1;
                }
            }
            Some(_) => {}
        }
        prev = Some(next);
    }

    // Trailing run: extend the last known value forwards
    if let Some(p) = prev {
        let last = values[p];
        for slot in &mut values[p + 1..] {
            *slot = last;
            filled += 1;
        }
    }
    filled
}

/// Parses a calendar date, discarding any time-of-day part.
pub fn parse_date(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Coerces a cell to a finite `f64`; anything else is null.
pub fn parse_f64(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Column positions after header normalization.
struct ColumnMap {
    date: Option<usize>,
    fields: HashMap<Field, usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Self {
        let mut by_name: HashMap<String, usize> = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            // First occurrence wins on duplicate names
            by_name.entry(header.trim().to_lowercase()).or_insert(idx);
        }
        let fields = Field::ALL
            .iter()
            .filter_map(|f| by_name.get(f.name()).map(|&idx| (*f, idx)))
            .collect();
        Self {
            date: by_name.get(DATE_COLUMN).copied(),
            fields,
        }
    }

    fn field(&self, field: Field) -> Option<usize> {
        self.fields.get(&field).copied()
    }
}
