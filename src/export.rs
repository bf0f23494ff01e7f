use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use crate::data::{MesaData, RunHeader, Table};

// ---------------------------------------------------------------------------
// Output formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Parquet,
}

impl ExportFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "parquet" | "pq" => Ok(ExportFormat::Parquet),
            other => bail!("Unsupported file extension: .{other}"),
        }
    }
}

/// Write the loaded table of `data` in the requested format.
pub fn export<W: Write + Send>(data: &MesaData, format: ExportFormat, out: W) -> Result<()> {
    let table = data
        .table
        .as_ref()
        .with_context(|| format!("{}: no data was loaded", data.path().display()))?;

    match format {
        ExportFormat::Csv => write_csv(table, out),
        ExportFormat::Json => write_json(&data.header, table, out),
        ExportFormat::Parquet => write_parquet(&data.header, table, out),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// One header row with the column names, then one row per model.
pub fn write_csv<W: Write>(table: &Table, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(table.column_names())
        .context("writing CSV header")?;

    let columns: Vec<&[f64]> = table.iter().map(|(_, values)| values).collect();
    for row in 0..table.len() {
        writer
            .write_record(columns.iter().map(|c| c[row].to_string()))
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonTable<'a> {
    header: &'a RunHeader,
    columns: Vec<JsonColumn<'a>>,
}

#[derive(Serialize)]
struct JsonColumn<'a> {
    name: &'a str,
    values: &'a [f64],
}

/// Layout:
///
/// ```json
/// {
///   "header": { "version_number": "r15140", "burn_min1": 50.0 },
///   "columns": [ { "name": "model_number", "values": [1.0, 2.0] } ]
/// }
/// ```
pub fn write_json<W: Write>(header: &RunHeader, table: &Table, out: W) -> Result<()> {
    let doc = JsonTable {
        header,
        columns: table
            .iter()
            .map(|(name, values)| JsonColumn { name, values })
            .collect(),
    };
    serde_json::to_writer_pretty(out, &doc).context("writing JSON")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// One non-null `Float64` column per table column. Header fields are kept
/// as key/value metadata on the schema.
pub fn write_parquet<W: Write + Send>(header: &RunHeader, table: &Table, out: W) -> Result<()> {
    if table.column_names().is_empty() {
        bail!("Cannot write a Parquet file without columns");
    }

    let metadata: HashMap<String, String> = header
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    let fields: Vec<Field> = table
        .column_names()
        .iter()
        .map(|name| Field::new(name, DataType::Float64, false))
        .collect();
    let schema = Arc::new(Schema::new(fields).with_metadata(metadata));

    let arrays: Vec<ArrayRef> = table
        .iter()
        .map(|(_, values)| Arc::new(Float64Array::from(values.to_vec())) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let mut writer = ArrowWriter::try_new(out, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
