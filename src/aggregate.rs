use crate::structs::{AggregateRow, Bucket, Record, Resolution};
use chrono::NaiveDate;
use log::debug;
use rayon::prelude::*;
use std::collections::HashMap;

/// Per-bucket accumulator: the non-null samples of every aggregated field.
#[derive(Debug, Default)]
struct BucketSamples {
    days: usize,
    temp_mean: Vec<f64>,
    rainfall_mm: Vec<f64>,
    humidity: Vec<f64>,
}

impl BucketSamples {
    fn push(&mut self, record: &Record) {
        self.days += 1;
        self.temp_mean.extend(record.temp_mean);
        self.rainfall_mm.extend(record.rainfall_mm);
        self.humidity.extend(record.humidity);
    }
}

/// Resamples a cleaned series into monthly and yearly summaries.
///
/// Both outputs are in ascending chronological order with one row per bucket
/// that holds at least one record. An empty series yields two empty vectors.
pub fn aggregate(series: &[Record]) -> (Vec<AggregateRow>, Vec<AggregateRow>) {
    (aggregate_monthly(series), aggregate_yearly(series))
}

pub fn aggregate_monthly(series: &[Record]) -> Vec<AggregateRow> {
    aggregate_by(series, |d| Resolution::Monthly.bucket_of(d))
}

pub fn aggregate_yearly(series: &[Record]) -> Vec<AggregateRow> {
    aggregate_by(series, |d| Resolution::Yearly.bucket_of(d))
}

/// Groups records by `key` and summarizes each group.
///
/// # Statistics
///
/// - `temp_mean`: mean, min, max, sample standard deviation
/// - `rainfall_mm`: sum
/// - `humidity`: mean, sample standard deviation
///
/// Null samples are skipped. Samples are sorted before reduction, so a row does
/// not depend on the order of records inside its bucket.
pub fn aggregate_by<F>(series: &[Record], key: F) -> Vec<AggregateRow>
where
    F: Fn(NaiveDate) -> Bucket,
{
    let mut buckets: HashMap<Bucket, BucketSamples> = HashMap::new();
    for record in series {
        buckets.entry(key(record.date)).or_default().push(record);
    }
    debug!(
        "Grouped {} records into {} buckets",
        series.len(),
        buckets.len()
    );

    let entries: Vec<_> = buckets.into_iter().collect();
    let mut rows: Vec<AggregateRow> = entries
        .into_par_iter()
        .map(|(bucket, samples)| summarize_bucket(bucket, samples))
        .collect();

    rows.sort_by_key(|row| row.bucket);
    rows
}

fn summarize_bucket(bucket: Bucket, mut samples: BucketSamples) -> AggregateRow {
    for values in [
        &mut samples.temp_mean,
        &mut samples.rainfall_mm,
        &mut samples.humidity,
    ] {
        values.sort_by(f64::total_cmp);
    }

    AggregateRow {
        bucket,
        days: samples.days,
        temp_mean_mean: mean(&samples.temp_mean),
        temp_mean_min: samples.temp_mean.first().copied(),
        temp_mean_max: samples.temp_mean.last().copied(),
        temp_mean_std: sample_std(&samples.temp_mean),
        rainfall_mm_sum: samples.rainfall_mm.iter().sum(),
        humidity_mean: mean(&samples.humidity),
        humidity_std: sample_std(&samples.humidity),
    }
}

/// Arithmetic mean, or `None` for no samples.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (N-1 denominator), or `None` below two samples.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean_val = mean(values)?;
    let variance =
        values.iter().map(|x| (x - mean_val).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}
