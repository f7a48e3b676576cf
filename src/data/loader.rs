use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, UInt32Type, UInt64Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawTable, WorkforceDataset};
use super::{reshape, schema};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a census table and reshape it into the long form.
///
/// Supported formats:
/// * `.csv`     – header row, one column per identifier / worker count
/// * `.json`    – `[{ "State": ..., "Main_Workers-Rural-Males": 12, ... }, ...]`
/// * `.parquet` – flat columns of strings / numbers
pub fn load_file(path: &Path) -> Result<WorkforceDataset> {
    let mut table = read_table(path)?;
    schema::normalize_columns(&mut table);
    let dataset = reshape::reshape(&table)
        .with_context(|| format!("reshaping {}", path.display()))?;

    log::info!(
        "Loaded {} rows × {} worker columns from {} → {} observations ({} counts dropped, {} rows skipped)",
        dataset.source_rows,
        dataset.measure_columns.len(),
        path.display(),
        dataset.len(),
        dataset.dropped_counts,
        dataset.skipped_rows,
    );
    if dataset.is_empty() {
        log::warn!("{} contains no usable worker counts", path.display());
    }
    Ok(dataset)
}

/// Read the wide table without interpreting it. Dispatch by extension.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => read_csv(path),
        "json" => read_json(path),
        "parquet" | "pq" => read_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(CellValue::guess).collect());
    }

    Ok(RawTable::new(columns, rows))
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`). Columns are the
/// union of keys over all records; absent keys read as missing.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut objects = Vec::with_capacity(records.len());
    let mut keys = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        keys.extend(obj.keys().cloned());
        objects.push(obj);
    }

    let columns: Vec<String> = keys.into_iter().collect();
    let rows = objects
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|c| obj.get(c).map(json_to_cell).unwrap_or(CellValue::Missing))
                .collect()
        })
        .collect();

    Ok(RawTable::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::guess(s),
        JsonValue::Number(n) => n
            .as_f64()
            .map(CellValue::Number)
            .unwrap_or_else(|| CellValue::Text(n.to_string())),
        JsonValue::Null => CellValue::Missing,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Missing;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::guess(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => CellValue::guess(col.as_string::<i64>().value(row)),
        DataType::Int16 => CellValue::Number(col.as_primitive::<Int16Type>().value(row) as f64),
        DataType::Int32 => CellValue::Number(col.as_primitive::<Int32Type>().value(row) as f64),
        DataType::Int64 => CellValue::Number(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::UInt32 => CellValue::Number(col.as_primitive::<UInt32Type>().value(row) as f64),
        DataType::UInt64 => CellValue::Number(col.as_primitive::<UInt64Type>().value(row) as f64),
        DataType::Float32 => CellValue::Number(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Number(col.as_primitive::<Float64Type>().value(row)),
        other => {
            log::debug!("Unsupported parquet column type {other:?}; treating as missing");
            CellValue::Missing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use crate::data::model::{Gender, WorkerType};

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_csv_normalizes_and_reshapes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "census.csv",
            " State ,District,Industry Category,Main Workers-Rural-Males,Marginal Workers-Urban-Persons\n\
             Tamilnadu,Chennai,Textiles,100,\n\
             Tamilnadu,Madurai,Textiles,30,12\n",
        );
        let ds = load_file(&path).unwrap();

        assert_eq!(ds.source_rows, 2);
        assert_eq!(ds.dropped_counts, 1);
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.measure_columns,
            vec!["Main_Workers-Rural-Males", "Marginal_Workers-Urban-Persons"]
        );
        let marginal = ds
            .observations
            .iter()
            .find(|o| o.worker_type == WorkerType::Marginal)
            .unwrap();
        assert_eq!(marginal.district.as_deref(), Some("Madurai"));
        assert_eq!(marginal.gender, Gender::Total);
        assert_eq!(marginal.count, 12.0);
    }

    #[test]
    fn test_load_csv_without_counts_is_empty_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "blank.csv",
            "State,District,Industry_Category,Main_Workers-Rural-Males\n\
             Goa,North Goa,Mining,\n",
        );
        let ds = load_file(&path).unwrap();

        assert!(ds.is_empty());
        assert_eq!(ds.dropped_counts, 1);
    }

    #[test]
    fn test_load_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "census.json",
            r#"[
                {"State": "Kerala", "District": "Kollam", "Industry_Category": "Fishing",
                 "Main_Workers-Rural-Females": 40, "Main_Workers-Rural-Males": "55"},
                {"State": "Kerala", "District": null, "Industry_Category": "Coir",
                 "Main_Workers-Rural-Females": null}
            ]"#,
        );
        let ds = load_file(&path).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.dropped_counts, 2);
        assert!(ds.observations.iter().all(|o| o.district.as_deref() == Some("Kollam")));
        let total: f64 = ds.observations.iter().map(|o| o.count).sum();
        assert_eq!(total, 95.0);
    }

    #[test]
    fn test_load_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("census.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("State", DataType::Utf8, false),
            Field::new("District", DataType::Utf8, true),
            Field::new("Industry Category", DataType::Utf8, false),
            Field::new("District Code", DataType::Int64, false),
            Field::new("Main_Workers-Total-Persons", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Goa", "Goa"])),
                Arc::new(StringArray::from(vec![Some("North Goa"), None])),
                Arc::new(StringArray::from(vec!["Mining", "Tourism"])),
                Arc::new(Int64Array::from(vec![585, 586])),
                Arc::new(Float64Array::from(vec![Some(1200.0), None])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.extra_columns, vec!["District_Code"]);
        let o = &ds.observations[0];
        assert_eq!(o.industry, "Mining");
        assert_eq!(o.extras, vec!["585"]);
        assert_eq!(o.count, 1200.0);
    }

    #[test]
    fn test_malformed_header_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "bad.csv",
            "State,District,Industry_Category,Main_Workers-Rural\nGoa,North Goa,Mining,3\n",
        );
        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Main_Workers-Rural"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = read_table(Path::new("census.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
