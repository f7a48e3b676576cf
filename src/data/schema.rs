//! Column-name constants and header normalization.

use super::model::RawTable;

// ── Identifier columns ──────────────────────────────────────────────────────
pub const STATE: &str = "State";
pub const DISTRICT: &str = "District";
pub const INDUSTRY_CATEGORY: &str = "Industry_Category";

// ── Long-table columns ──────────────────────────────────────────────────────
pub const WORKER_TYPE: &str = "Worker_Type";
pub const AREA: &str = "Area";
pub const GENDER: &str = "Gender";
pub const COUNT: &str = "Count";
pub const VALUE: &str = "Value";

// ── Measure columns ─────────────────────────────────────────────────────────
/// Prefixes that mark a column as a worker-count (measure) column.
pub const MEASURE_PREFIXES: [&str; 2] = ["Main_Workers", "Marginal_Workers"];

/// Separator between worker class, area and gender in a measure column name.
pub const MEASURE_DELIMITER: char = '-';

/// Canonicalize one header: trim, then replace spaces with underscores.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().replace(' ', "_")
}

/// Normalize every header of `table` in place. Rows are untouched.
pub fn normalize_columns(table: &mut RawTable) {
    for col in &mut table.columns {
        *col = normalize_column_name(col);
    }
}

pub fn is_measure_column(name: &str) -> bool {
    MEASURE_PREFIXES.iter().any(|p| name.starts_with(p))
}
