use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::aggregate::{self, TableRow};
use super::model::{Observation, WorkforceDataset};
use super::schema;

/// Default file name offered for the filtered-table download.
pub const FILTERED_FILE_NAME: &str = "filtered_workforce_data.csv";

/// Write the filtered long table as CSV.
///
/// Columns: State, District, Industry_Category, the extra identifier
/// columns, Worker_Type, Area, Gender, Count, and Value in percentage mode.
pub fn write_filtered<W: Write>(
    writer: W,
    dataset: &WorkforceDataset,
    rows: &[&Observation],
    percentage: bool,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = vec![schema::STATE, schema::DISTRICT, schema::INDUSTRY_CATEGORY];
    header.extend(dataset.extra_columns.iter().map(String::as_str));
    header.extend([schema::WORKER_TYPE, schema::AREA, schema::GENDER, schema::COUNT]);
    if percentage {
        header.push(schema::VALUE);
    }
    wtr.write_record(&header).context("writing CSV header")?;

    for m in aggregate::measure(rows, percentage) {
        let o = m.obs;
        let mut record: Vec<String> = vec![
            o.state.clone(),
            o.district.clone().unwrap_or_default(),
            o.industry.clone(),
        ];
        record.extend(o.extras.iter().cloned());
        record.extend([
            o.worker_type.to_string(),
            o.area.clone(),
            o.gender.to_string(),
            o.count.to_string(),
        ]);
        if percentage {
            record.push(m.value.to_string());
        }
        wtr.write_record(&record).context("writing CSV row")?;
    }

    wtr.flush().context("flushing CSV")?;
    Ok(())
}

pub fn save_filtered(
    path: &Path,
    dataset: &WorkforceDataset,
    rows: &[&Observation],
    percentage: bool,
) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_filtered(file, dataset, rows, percentage)?;
    log::info!("Exported {} filtered rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write any view table as CSV, one serialized row per record.
pub fn write_view<W: Write, T: TableRow>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        wtr.write_record(T::HEADERS).context("writing CSV header")?;
    }
    for row in rows {
        wtr.serialize(row).context("writing CSV row")?;
    }
    wtr.flush().context("flushing CSV")?;
    Ok(())
}

pub fn save_view<T: TableRow>(path: &Path, rows: &[T]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_view(file, rows)?;
    log::info!("Exported {} view rows to {}", rows.len(), path.display());
    Ok(())
}
