use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the raw (wide) table
// ---------------------------------------------------------------------------

/// A loosely-typed cell as read from the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Missing,
}

impl CellValue {
    /// Guess the cell type from a CSV field.
    pub fn guess(s: &str) -> Self {
        if s.trim().is_empty() {
            return CellValue::Missing;
        }
        match s.trim().parse::<f64>() {
            Ok(v) => CellValue::Number(v),
            Err(_) => CellValue::Text(s.to_string()),
        }
    }

    /// Interpret the cell as a worker count.
    ///
    /// Text is parsed leniently; anything that is not a finite, non-negative
    /// number is treated as missing.
    pub fn as_count(&self) -> Option<f64> {
        let v = match self {
            CellValue::Number(v) => *v,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Missing => return None,
        };
        (v.is_finite() && v >= 0.0).then_some(v)
    }

    /// Interpret the cell as an identifier label (State, District, ...).
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Missing => None,
            CellValue::Text(s) if s.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            // District / state codes are integers stored as floats by most writers.
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Missing => Ok(()),
        }
    }
}

static MISSING: CellValue = CellValue::Missing;

// ---------------------------------------------------------------------------
// RawTable – the wide source table, exactly as loaded
// ---------------------------------------------------------------------------

/// Column-oriented header plus row-major cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    /// Cell at (`row`, `col`); short rows read as missing.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&MISSING)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

// ---------------------------------------------------------------------------
// Categorical attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum WorkerType {
    Main,
    Marginal,
}

impl WorkerType {
    /// Map a worker-class token from a measure column name.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "Main_Workers" => Some(Self::Main),
            "Marginal_Workers" => Some(Self::Marginal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "Main",
            Self::Marginal => "Marginal",
        }
    }
}

impl fmt::Display for WorkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Gender {
    Female,
    Male,
    Total,
}

impl Gender {
    pub const ALL: [Self; 3] = [Self::Female, Self::Male, Self::Total];

    /// Map a gender token from a measure column name.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "Males" | "Male" => Some(Self::Male),
            "Females" | "Female" => Some(Self::Female),
            "Persons" | "Total" => Some(Self::Total),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Total => "Total",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of the long (tidy) table
// ---------------------------------------------------------------------------

/// One (source row × measure column) combination with a numeric count.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub state: String,
    pub district: Option<String>,
    pub industry: String,
    /// Values of the non-core identifier columns, aligned with
    /// [`WorkforceDataset::extra_columns`].
    pub extras: Vec<String>,
    pub worker_type: WorkerType,
    pub area: String,
    pub gender: Gender,
    pub count: f64,
}

// ---------------------------------------------------------------------------
// WorkforceDataset – the reshaped dataset, immutable after load
// ---------------------------------------------------------------------------

/// The long-form dataset plus bookkeeping from the reshape.
#[derive(Debug, Clone, Default)]
pub struct WorkforceDataset {
    pub observations: Vec<Observation>,
    /// Identifier columns other than State / District / Industry_Category.
    pub extra_columns: Vec<String>,
    /// Measure columns that were melted, in source order.
    pub measure_columns: Vec<String>,
    /// Number of wide rows read from the source.
    pub source_rows: usize,
    /// Cells dropped because their count did not parse.
    pub dropped_counts: usize,
    /// Wide rows skipped because State or Industry_Category was missing.
    pub skipped_rows: usize,
}

impl WorkforceDataset {
    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Sorted distinct states.
    pub fn states(&self) -> BTreeSet<String> {
        self.observations.iter().map(|o| o.state.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_cell_types() {
        assert_eq!(CellValue::guess(""), CellValue::Missing);
        assert_eq!(CellValue::guess("  "), CellValue::Missing);
        assert_eq!(CellValue::guess("12"), CellValue::Number(12.0));
        assert_eq!(CellValue::guess("Chennai"), CellValue::Text("Chennai".into()));
    }

    #[test]
    fn test_as_count_rejects_invalid() {
        assert_eq!(CellValue::Number(5.0).as_count(), Some(5.0));
        assert_eq!(CellValue::Text(" 7 ".into()).as_count(), Some(7.0));
        assert_eq!(CellValue::Text("n/a".into()).as_count(), None);
        assert_eq!(CellValue::Number(-1.0).as_count(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_count(), None);
        assert_eq!(CellValue::Missing.as_count(), None);
    }

    #[test]
    fn test_numeric_labels_render_as_integers() {
        assert_eq!(CellValue::Number(603.0).as_label().as_deref(), Some("603"));
        assert_eq!(CellValue::Text("".into()).as_label(), None);
    }

    #[test]
    fn test_token_mapping() {
        assert_eq!(WorkerType::from_token("Main_Workers"), Some(WorkerType::Main));
        assert_eq!(WorkerType::from_token("Marginal_Workers"), Some(WorkerType::Marginal));
        assert_eq!(WorkerType::from_token("Other_Workers"), None);
        assert_eq!(WorkerType::from_token("Main"), None);
        assert_eq!(Gender::from_token("Males"), Some(Gender::Male));
        assert_eq!(Gender::from_token("Females"), Some(Gender::Female));
        assert_eq!(Gender::from_token("Persons"), Some(Gender::Total));
        assert_eq!(Gender::from_token("Kids"), None);
    }
}
