use chrono::{Datelike, NaiveDate};
use log::{Log, Metadata, Record as LogRecord};
use std::path::{Path, PathBuf};

/// Simple logger implementation
pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &LogRecord) {
        println!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// Untyped table as read from a source CSV. Empty cells mean "missing".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Cell at `(row, col)`; rows shorter than the header count are padded with missing cells.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One daily weather observation after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_mean: Option<f64>,
    pub rainfall_mm: Option<f64>,
    pub humidity: Option<f64>,
}

impl Record {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            temp_max: None,
            temp_min: None,
            temp_mean: None,
            rainfall_mm: None,
            humidity: None,
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// Abbreviated English month name, e.g. "Jan".
    pub fn month_name(&self) -> String {
        self.date.format("%b").to_string()
    }
}

/// Ordered sequence of records, sorted by date once cleaned.
pub type Series = Vec<Record>;

/// The numeric fields of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    TempMax,
    TempMin,
    TempMean,
    RainfallMm,
    Humidity,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::TempMax,
        Field::TempMin,
        Field::TempMean,
        Field::RainfallMm,
        Field::Humidity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::TempMax => "temp_max",
            Field::TempMin => "temp_min",
            Field::TempMean => "temp_mean",
            Field::RainfallMm => "rainfall_mm",
            Field::Humidity => "humidity",
        }
    }

    pub fn get(self, record: &Record) -> Option<f64> {
        match self {
            Field::TempMax => record.temp_max,
            Field::TempMin => record.temp_min,
            Field::TempMean => record.temp_mean,
            Field::RainfallMm => record.rainfall_mm,
            Field::Humidity => record.humidity,
        }
    }

    pub fn set(self, record: &mut Record, value: Option<f64>) {
        let slot = match self {
            Field::TempMax => &mut record.temp_max,
            Field::TempMin => &mut record.temp_min,
            Field::TempMean => &mut record.temp_mean,
            Field::RainfallMm => &mut record.rainfall_mm,
            Field::Humidity => &mut record.humidity,
        };
        *slot = value;
    }
}

/// Time bucket used to group records for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    /// First day of the calendar month.
    Month(NaiveDate),
    Year(i32),
}

impl Bucket {
    pub fn month_of(date: NaiveDate) -> Self {
        // Day 1 always exists, so with_day(1) cannot fail
        Bucket::Month(date.with_day(1).unwrap_or(date))
    }

    pub fn year_of(date: NaiveDate) -> Self {
        Bucket::Year(date.year())
    }

    pub fn label(&self) -> String {
        match self {
            Bucket::Month(first) => first.format("%Y-%m").to_string(),
            Bucket::Year(year) => year.to_string(),
        }
    }

    pub fn resolution(&self) -> Resolution {
        match self {
            Bucket::Month(_) => Resolution::Monthly,
            Bucket::Year(_) => Resolution::Yearly,
        }
    }

    /// Name of the key column in summary outputs.
    pub fn key_column(&self) -> &'static str {
        self.resolution().key_column()
    }
}

/// Granularity of a summary table, known even when the table has no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Monthly,
    Yearly,
}

impl Resolution {
    pub fn key_column(self) -> &'static str {
        match self {
            Resolution::Monthly => "month",
            Resolution::Yearly => "year",
        }
    }

    pub fn bucket_of(self, date: NaiveDate) -> Bucket {
        match self {
            Resolution::Monthly => Bucket::month_of(date),
            Resolution::Yearly => Bucket::year_of(date),
        }
    }
}

/// Summary statistics of one time bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub bucket: Bucket,
    pub days: usize,
    pub temp_mean_mean: Option<f64>,
    pub temp_mean_min: Option<f64>,
    pub temp_mean_max: Option<f64>,
    pub temp_mean_std: Option<f64>,
    pub rainfall_mm_sum: f64,
    pub humidity_mean: Option<f64>,
    pub humidity_std: Option<f64>,
}

/// Statistic columns of a summary table, in output order.
pub const SUMMARY_COLUMNS: [&str; 7] = [
    "temp_mean_mean",
    "temp_mean_min",
    "temp_mean_max",
    "temp_mean_std",
    "rainfall_mm_sum",
    "humidity_mean",
    "humidity_std",
];

impl AggregateRow {
    /// Statistic values in [`SUMMARY_COLUMNS`] order.
    pub fn values(&self) -> [Option<f64>; 7] {
        [
            self.temp_mean_mean,
            self.temp_mean_min,
            self.temp_mean_max,
            self.temp_mean_std,
            Some(self.rainfall_mm_sum),
            self.humidity_mean,
            self.humidity_std,
        ]
    }
}

/// Where the presentation layer writes its outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub cleaned_csv: PathBuf,
    pub monthly_csv: PathBuf,
    pub yearly_csv: PathBuf,
    pub monthly_parquet: PathBuf,
    pub yearly_parquet: PathBuf,
    pub summary_json: PathBuf,
    pub plots_dir: PathBuf,
    pub report: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path, report: impl Into<PathBuf>) -> Self {
        Self {
            cleaned_csv: dir.join("cleaned_data.csv"),
            monthly_csv: dir.join("monthly_summary.csv"),
            yearly_csv: dir.join("yearly_summary.csv"),
            monthly_parquet: dir.join("monthly_summary.parquet"),
            yearly_parquet: dir.join("yearly_summary.parquet"),
            summary_json: dir.join("summary.json"),
            plots_dir: dir.join("plots"),
            report: report.into(),
        }
    }

    /// Creates the plots directory and the parent directory of every output file.
    pub fn create_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.plots_dir)?;
        for file in [
            &self.cleaned_csv,
            &self.monthly_csv,
            &self.yearly_csv,
            &self.monthly_parquet,
            &self.yearly_parquet,
            &self.summary_json,
            &self.report,
        ] {
            if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self::in_dir(Path::new("output"), "report.md")
    }
}

/// Configuration for the synthetic source generator
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub days: usize,
    pub start_date: NaiveDate,
    /// Probability that a cell of a gappy column is blanked.
    pub missing_rate: f64,
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            days: 365 * 2,
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            missing_rate: 0.03,
            seed: None,
        }
    }
}
