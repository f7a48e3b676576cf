use std::collections::BTreeMap;

use thiserror::Error;

use super::model::{Gender, Observation, RawTable, WorkerType, WorkforceDataset};
use super::schema;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Problems with the wide table that make it impossible to reshape.
#[derive(Debug, Error, PartialEq)]
pub enum ReshapeError {
    #[error("required column '{0}' not found")]
    MissingColumn(String),

    #[error("no worker-count columns found (expected names starting with Main_Workers or Marginal_Workers)")]
    NoMeasureColumns,

    #[error("measure column '{column}' must have exactly 3 '-'-separated parts, found {parts}")]
    MalformedMeasureColumn { column: String, parts: usize },

    #[error("measure column '{column}': unknown worker class '{token}'")]
    UnknownWorkerClass { column: String, token: String },

    #[error("measure column '{column}': unknown gender '{token}'")]
    UnknownGender { column: String, token: String },

    #[error("measure column '{column}' decodes to the same worker type, area and gender as '{first}'")]
    DuplicateMeasure { column: String, first: String },
}

// ---------------------------------------------------------------------------
// Column classification
// ---------------------------------------------------------------------------

/// A measure column with the metadata decoded from its name.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureColumn {
    pub index: usize,
    pub name: String,
    pub worker_type: WorkerType,
    pub area: String,
    pub gender: Gender,
}

/// How the wide table's columns map onto the long form.
#[derive(Debug, Clone)]
pub struct ColumnPlan {
    pub state: usize,
    pub district: usize,
    pub industry: usize,
    /// (index, name) of the remaining identifier columns.
    pub extras: Vec<(usize, String)>,
    pub measures: Vec<MeasureColumn>,
}

/// Decode `<WorkerClass>-<Area>-<Gender>` into its three attributes.
pub fn parse_measure_name(name: &str) -> Result<(WorkerType, String, Gender), ReshapeError> {
    let parts: Vec<&str> = name.split(schema::MEASURE_DELIMITER).collect();
    let [class, area, gender] = parts.as_slice() else {
        return Err(ReshapeError::MalformedMeasureColumn {
            column: name.to_string(),
            parts: parts.len(),
        });
    };

    let worker_type =
        WorkerType::from_token(class).ok_or_else(|| ReshapeError::UnknownWorkerClass {
            column: name.to_string(),
            token: class.to_string(),
        })?;
    let gender = Gender::from_token(gender).ok_or_else(|| ReshapeError::UnknownGender {
        column: name.to_string(),
        token: gender.to_string(),
    })?;

    Ok((worker_type, area.to_string(), gender))
}

/// Partition the (already normalized) columns into identifiers and measures.
pub fn classify_columns(columns: &[String]) -> Result<ColumnPlan, ReshapeError> {
    let find = |name: &str| {
        columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ReshapeError::MissingColumn(name.to_string()))
    };
    let state = find(schema::STATE)?;
    let district = find(schema::DISTRICT)?;
    let industry = find(schema::INDUSTRY_CATEGORY)?;

    let mut extras = Vec::new();
    let mut measures = Vec::new();
    // Each (worker type, area, gender) may come from one column only.
    let mut seen: BTreeMap<(WorkerType, String, Gender), &str> = BTreeMap::new();
    for (index, name) in columns.iter().enumerate() {
        if schema::is_measure_column(name) {
            let (worker_type, area, gender) = parse_measure_name(name)?;
            if let Some(first) = seen.insert((worker_type, area.clone(), gender), name) {
                return Err(ReshapeError::DuplicateMeasure {
                    column: name.clone(),
                    first: first.to_string(),
                });
            }
            measures.push(MeasureColumn {
                index,
                name: name.clone(),
                worker_type,
                area,
                gender,
            });
        } else if index != state && index != district && index != industry {
            extras.push((index, name.clone()));
        }
    }

    if measures.is_empty() {
        return Err(ReshapeError::NoMeasureColumns);
    }

    Ok(ColumnPlan {
        state,
        district,
        industry,
        extras,
        measures,
    })
}

// ---------------------------------------------------------------------------
// Wide → long
// ---------------------------------------------------------------------------

/// Melt the wide census table into one observation per row × measure column.
///
/// Cells whose count does not parse are dropped silently (counted in
/// [`WorkforceDataset::dropped_counts`]). Rows without a State or
/// Industry_Category cannot be placed anywhere and are skipped with a warning.
pub fn reshape(table: &RawTable) -> Result<WorkforceDataset, ReshapeError> {
    let plan = classify_columns(&table.columns)?;

    let mut observations = Vec::with_capacity(table.len() * plan.measures.len());
    let mut dropped_counts = 0;
    let mut skipped_rows = 0;

    for row in 0..table.len() {
        let state = table.cell(row, plan.state).as_label();
        let industry = table.cell(row, plan.industry).as_label();
        let (Some(state), Some(industry)) = (state, industry) else {
            log::warn!("Skipping source row {row}: missing State or Industry_Category");
            skipped_rows += 1;
            continue;
        };
        let district = table.cell(row, plan.district).as_label();
        let extras: Vec<String> = plan
            .extras
            .iter()
            .map(|(idx, _)| table.cell(row, *idx).to_string())
            .collect();

        for measure in &plan.measures {
            let Some(count) = table.cell(row, measure.index).as_count() else {
                dropped_counts += 1;
                continue;
            };
            observations.push(Observation {
                state: state.clone(),
                district: district.clone(),
                industry: industry.clone(),
                extras: extras.clone(),
                worker_type: measure.worker_type,
                area: measure.area.clone(),
                gender: measure.gender,
                count,
            });
        }
    }

    if dropped_counts > 0 {
        log::debug!("Dropped {dropped_counts} non-numeric worker counts");
    }

    Ok(WorkforceDataset {
        observations,
        extra_columns: plan.extras.into_iter().map(|(_, name)| name).collect(),
        measure_columns: plan.measures.into_iter().map(|m| m.name).collect(),
        source_rows: table.len(),
        dropped_counts,
        skipped_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn chennai_table() -> RawTable {
        RawTable::new(
            vec![
                "State".into(),
                "District".into(),
                "Industry_Category".into(),
                "Main_Workers-Rural-Males".into(),
                "Main_Workers-Urban-Females".into(),
            ],
            vec![vec![
                text("Tamilnadu"),
                text("Chennai"),
                text("Textiles"),
                CellValue::Number(100.0),
                CellValue::Number(50.0),
            ]],
        )
    }

    #[test]
    fn test_reshape_example_row() {
        let ds = reshape(&chennai_table()).unwrap();

        assert_eq!(ds.len(), 2);
        let first = &ds.observations[0];
        assert_eq!(first.state, "Tamilnadu");
        assert_eq!(first.district.as_deref(), Some("Chennai"));
        assert_eq!(first.industry, "Textiles");
        assert_eq!(first.worker_type, WorkerType::Main);
        assert_eq!(first.area, "Rural");
        assert_eq!(first.gender, Gender::Male);
        assert_eq!(first.count, 100.0);

        let second = &ds.observations[1];
        assert_eq!(second.area, "Urban");
        assert_eq!(second.gender, Gender::Female);
        assert_eq!(second.count, 50.0);
    }

    #[test]
    fn test_row_count_is_rows_times_measures_minus_dropped() {
        let table = RawTable::new(
            vec![
                "State".into(),
                "District".into(),
                "Industry_Category".into(),
                "Region".into(),
                "Main_Workers-Total-Persons".into(),
                "Marginal_Workers-Total-Persons".into(),
                "Marginal_Workers-Rural-Females".into(),
            ],
            vec![
                vec![text("Kerala"), text("Kollam"), text("Fishing"), text("South"),
                     CellValue::Number(10.0), text("x"), CellValue::Number(3.0)],
                vec![text("Kerala"), CellValue::Missing, text("Coir"), text("South"),
                     CellValue::Missing, CellValue::Number(2.0), text("4")],
            ],
        );
        let ds = reshape(&table).unwrap();

        assert_eq!(ds.source_rows, 2);
        assert_eq!(ds.dropped_counts, 2);
        assert_eq!(ds.len(), 2 * 3 - 2);
        assert_eq!(ds.extra_columns, vec!["Region"]);
        assert!(ds.observations.iter().all(|o| o.extras == vec!["South"]));
        // Missing district survives as None.
        assert!(ds.observations.iter().any(|o| o.district.is_none()));
    }

    #[test]
    fn test_malformed_measure_column_is_rejected() {
        let mut table = chennai_table();
        table.columns[4] = "Main_Workers-Urban".into();

        assert_eq!(
            reshape(&table).unwrap_err(),
            ReshapeError::MalformedMeasureColumn {
                column: "Main_Workers-Urban".into(),
                parts: 2
            }
        );
    }

    #[test]
    fn test_unknown_tokens_are_rejected() {
        assert!(matches!(
            parse_measure_name("Main_Workers_Extra-Rural-Males"),
            Err(ReshapeError::UnknownWorkerClass { .. })
        ));
        assert!(matches!(
            parse_measure_name("Main_Workers-Rural-Children"),
            Err(ReshapeError::UnknownGender { .. })
        ));
    }

    #[test]
    fn test_gender_alias_cannot_repeat_a_measure() {
        let mut table = chennai_table();
        table.columns[4] = "Main_Workers-Rural-Male".into();

        assert_eq!(
            reshape(&table).unwrap_err(),
            ReshapeError::DuplicateMeasure {
                column: "Main_Workers-Rural-Male".into(),
                first: "Main_Workers-Rural-Males".into(),
            }
        );
    }

    #[test]
    fn test_headers_colliding_after_normalization_are_rejected() {
        let mut table = chennai_table();
        table.columns[4] = "Main Workers-Rural-Males".into();
        schema::normalize_columns(&mut table);

        assert!(matches!(
            reshape(&table),
            Err(ReshapeError::DuplicateMeasure { .. })
        ));
    }

    #[test]
    fn test_area_passes_through_unchanged() {
        let (wt, area, gender) = parse_measure_name("Marginal_Workers-Semi_Urban-Persons").unwrap();
        assert_eq!(wt, WorkerType::Marginal);
        assert_eq!(area, "Semi_Urban");
        assert_eq!(gender, Gender::Total);
    }

    #[test]
    fn test_missing_identifier_column() {
        let table = RawTable::new(
            vec!["State".into(), "Industry_Category".into(), "Main_Workers-Rural-Males".into()],
            Vec::new(),
        );
        assert_eq!(
            classify_columns(&table.columns).unwrap_err(),
            ReshapeError::MissingColumn("District".into())
        );
    }

    #[test]
    fn test_no_measure_columns() {
        let columns: Vec<String> = vec!["State".into(), "District".into(), "Industry_Category".into()];
        assert_eq!(classify_columns(&columns).unwrap_err(), ReshapeError::NoMeasureColumns);
    }

    #[test]
    fn test_rows_without_state_are_skipped() {
        let mut table = chennai_table();
        table.rows.push(vec![
            CellValue::Missing,
            text("Madurai"),
            text("Textiles"),
            CellValue::Number(1.0),
            CellValue::Number(2.0),
        ]);
        let ds = reshape(&table).unwrap();
        assert_eq!(ds.skipped_rows, 1);
        assert_eq!(ds.len(), 2);
    }
}
