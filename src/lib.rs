pub mod aggregate;
pub mod clean;
pub mod error;
pub mod generate;
pub mod inspect;
pub mod load;
pub mod plot;
pub mod report;
pub mod structs;

// Re-export public API
pub use aggregate::{aggregate, aggregate_monthly, aggregate_yearly};
pub use clean::clean;
pub use error::{PipelineError, Result};
pub use generate::generate;
pub use load::{
    read_raw_csv, write_cleaned_csv, write_json, write_raw_csv, write_summary_csv,
    write_summary_parquet,
};
pub use structs::{
    AggregateRow, Bucket, Field, GeneratorConfig, OutputPaths, RawTable, Record, Resolution,
    Series, SimpleLogger,
};
