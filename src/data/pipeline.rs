use super::aggregate::{self, CrossTable, GroupTotal, Kpis};
use super::filter::{self, FilterError, FilterOptions, ResolvedSelection, Rows, Selection, ViewLevel};
use super::model::WorkforceDataset;
use super::usecase::{self, UseCase, UseCaseView};

// ---------------------------------------------------------------------------
// View options
// ---------------------------------------------------------------------------

/// Presentation choices that change what is computed, but not which rows
/// are selected (except for the district stage driven by `level`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewOptions {
    pub level: ViewLevel,
    pub percentage: bool,
    pub use_case: UseCase,
}

impl ViewOptions {
    /// Axis / legend label for the aggregated value.
    pub fn value_label(&self) -> &'static str {
        if self.percentage {
            "Percentage (%)"
        } else {
            "Workers"
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard – everything the presentation layer renders
// ---------------------------------------------------------------------------

/// Views computed from one filtered selection. Owns all of its data.
#[derive(Debug, Clone, PartialEq)]
pub struct Views {
    pub row_count: usize,
    pub kpis: Kpis,
    pub industry: Vec<GroupTotal>,
    pub geography: Vec<GroupTotal>,
    pub cross: CrossTable,
    pub use_case: UseCaseView,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub options: FilterOptions,
    pub resolved: ResolvedSelection,
    pub views: Result<Views, FilterError>,
}

/// Run the filter chain and every aggregate for one selection.
///
/// Pure: the same dataset, selection and options always produce the same
/// dashboard.
pub fn build_dashboard(dataset: &WorkforceDataset, selection: &Selection, opts: ViewOptions) -> Dashboard {
    let chain = filter::run(dataset, selection, opts.level);
    let views = chain.rows.map(|rows| {
        let measured = aggregate::measure(&rows, opts.percentage);
        Views {
            row_count: rows.len(),
            kpis: aggregate::kpis(&rows),
            industry: aggregate::by_industry(&measured),
            geography: aggregate::by_geography(&measured, opts.level),
            cross: aggregate::cross(&measured, opts.level),
            use_case: usecase::build(opts.use_case, dataset, &chain.resolved, &rows),
        }
    });

    Dashboard {
        options: chain.options,
        resolved: chain.resolved,
        views,
    }
}

/// The filtered rows for a selection, as used by the export.
pub fn filtered_rows<'a>(
    dataset: &'a WorkforceDataset,
    selection: &Selection,
    level: ViewLevel,
) -> Result<Rows<'a>, FilterError> {
    filter::run(dataset, selection, level).rows
}
