use crate::error::{PipelineError, Result};
use crate::structs::{AggregateRow, RawTable, Record, Resolution, SUMMARY_COLUMNS};
use arrow_array::{ArrayRef, Float64Array, RecordBatch, StringArray, UInt32Array};
use arrow_schema::{DataType, Field, Schema};
use csv::{ReaderBuilder, Writer};
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::{fs::File, path::Path, sync::Arc};

const CLEANED_COLUMNS: [&str; 9] = [
    "date",
    "temp_max",
    "temp_min",
    "temp_mean",
    "rainfall_mm",
    "humidity",
    "year",
    "month",
    "month_name",
];

/// Reads a CSV file into an untyped [`RawTable`].
///
/// Rows may have fewer or more cells than the header; nothing is parsed here.
///
/// # Errors
///
/// Returns error if the file cannot be opened or is not valid CSV.
pub fn read_raw_csv(path: &Path) -> Result<RawTable> {
    debug!("Reading CSV file: {}", path.display());
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = RawTable::new(headers);
    for result in reader.records() {
        let record = result?;
        table.rows.push(record.iter().map(str::to_string).collect());
    }
    debug!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Writes a [`RawTable`] back out as CSV.
pub fn write_raw_csv(table: &RawTable, output_path: &Path) -> Result<()> {
    let mut writer = Writer::from_writer(File::create(output_path)?);
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the cleaned series, one row per record, with calendar helper columns.
///
/// Null values are written as empty cells.
pub fn write_cleaned_csv(series: &[Record], output_path: &Path) -> Result<()> {
    let mut writer = Writer::from_writer(File::create(output_path)?);
    writer.write_record(CLEANED_COLUMNS)?;

    for record in series {
        writer.write_record(&[
            record.date.format("%Y-%m-%d").to_string(),
            format_cell(record.temp_max),
            format_cell(record.temp_min),
            format_cell(record.temp_mean),
            format_cell(record.rainfall_mm),
            format_cell(record.humidity),
            record.year().to_string(),
            record.month().to_string(),
            record.month_name(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes monthly or yearly summary rows to a CSV file.
///
/// The first column is the bucket key named after `resolution` (`month` as
/// `YYYY-MM`, or `year`), followed by `<field>_<stat>` columns with two
/// decimals. Undefined statistics are written as empty cells.
///
/// # Errors
///
/// Returns error if file cannot be created or written to.
pub fn write_summary_csv(
    rows: &[AggregateRow],
    resolution: Resolution,
    output_path: &Path,
) -> Result<()> {
    let mut writer = Writer::from_writer(File::create(output_path)?);

    let mut header = vec![resolution.key_column()];
    header.extend(SUMMARY_COLUMNS);
    writer.write_record(&header)?;

    for row in rows {
        let mut cells = vec![row.bucket.label()];
        cells.extend(row.values().iter().map(|v| match v {
            Some(v) => format!("{:.2}", v),
            None => String::new(),
        }));
        writer.write_record(&cells)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes any serializable value to a pretty-formatted JSON file.
pub fn write_json<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

/// Writes summary rows to a columnar Parquet file using Arrow format.
///
/// Same columns as the CSV summary plus a `days` record count after the key.
/// Statistic columns are nullable `Float64`; the bucket label is `Utf8`.
///
/// # Errors
///
/// Returns error if file cannot be created, schema is invalid, or Arrow operations fail.
pub fn write_summary_parquet(
    rows: &[AggregateRow],
    resolution: Resolution,
    output_path: &Path,
) -> Result<()> {
    let mut fields = vec![
        Field::new(resolution.key_column(), DataType::Utf8, false),
        Field::new("days", DataType::UInt32, false),
    ];
    fields.extend(
        SUMMARY_COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Float64, true)),
    );
    let schema = Arc::new(Schema::new(fields));

    let labels = StringArray::from_iter_values(rows.iter().map(|r| r.bucket.label()));
    let days = rows
        .iter()
        .map(|r| {
            u32::try_from(r.days)
                .map_err(|_| PipelineError::Data(format!("bucket too large: {} days", r.days)))
        })
        .collect::<Result<Vec<u32>>>()?;
    let mut columns: Vec<ArrayRef> = vec![Arc::new(labels), Arc::new(UInt32Array::from(days))];
    for idx in 0..SUMMARY_COLUMNS.len() {
        let values: Float64Array = rows.iter().map(|r| r.values()[idx]).collect();
        columns.push(Arc::new(values));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let file = File::create(output_path)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}

fn format_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
