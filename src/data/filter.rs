use std::collections::BTreeSet;

use thiserror::Error;

use super::model::{Gender, Observation, WorkerType, WorkforceDataset};

// ---------------------------------------------------------------------------
// Selection: what the user picked
// ---------------------------------------------------------------------------

/// Granularity of the geography axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewLevel {
    #[default]
    DistrictWise,
    StateWise,
}

impl ViewLevel {
    pub const ALL: [Self; 2] = [Self::DistrictWise, Self::StateWise];

    pub fn label(self) -> &'static str {
        match self {
            Self::DistrictWise => "District-wise",
            Self::StateWise => "State-wise",
        }
    }

    /// Geography key of an observation at this level.
    pub fn geo_key(self, obs: &Observation) -> Option<&str> {
        match self {
            Self::DistrictWise => obs.district.as_deref(),
            Self::StateWise => Some(&obs.state),
        }
    }
}

/// Raw user choices. `None` means "use the default for this stage":
/// every candidate for the multi-selects, the first candidate for the
/// single-value filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub states: BTreeSet<String>,
    pub districts: Option<BTreeSet<String>>,
    pub worker_type: Option<WorkerType>,
    pub area: Option<String>,
    pub gender: Option<Gender>,
    pub industries: Option<BTreeSet<String>>,
}

/// Candidate values offered at each stage, computed from the rows that
/// reached that stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub states: Vec<String>,
    pub districts: Vec<String>,
    pub worker_types: Vec<WorkerType>,
    pub areas: Vec<String>,
    pub genders: Vec<Gender>,
    pub industries: Vec<String>,
}

/// The selection actually applied once defaults and stale choices are
/// resolved against the candidate lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSelection {
    pub states: BTreeSet<String>,
    /// `Some` only when the district stage ran (district-wise view).
    pub districts: Option<BTreeSet<String>>,
    pub worker_type: Option<WorkerType>,
    pub area: Option<String>,
    pub gender: Option<Gender>,
    pub industries: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("No data available for the selected filters.")]
    NoData,
}

pub type Rows<'a> = Vec<&'a Observation>;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

fn distinct<T: Ord>(rows: &[&Observation], key: impl Fn(&Observation) -> Option<T>) -> Vec<T> {
    rows.iter()
        .filter_map(|&o| key(o))
        .collect::<BTreeSet<T>>()
        .into_iter()
        .collect()
}

fn keep<'a>(rows: &[&'a Observation], pred: impl Fn(&Observation) -> bool) -> Rows<'a> {
    rows.iter().copied().filter(|&o| pred(o)).collect()
}

/// Use `choice` if it is still a candidate, else the first candidate.
fn pick<T: PartialEq + Clone>(choice: Option<&T>, options: &[T]) -> Option<T> {
    match choice {
        Some(c) if options.contains(c) => Some(c.clone()),
        _ => options.first().cloned(),
    }
}

pub fn state_options(rows: &[&Observation]) -> Vec<String> {
    distinct(rows, |o| Some(o.state.clone()))
}

pub fn filter_states<'a>(rows: &[&'a Observation], states: &BTreeSet<String>) -> Rows<'a> {
    keep(rows, |o| states.contains(&o.state))
}

/// Distinct non-null districts among `rows`.
pub fn district_options(rows: &[&Observation]) -> Vec<String> {
    distinct(rows, |o| o.district.clone())
}

pub fn filter_districts<'a>(rows: &[&'a Observation], districts: &BTreeSet<String>) -> Rows<'a> {
    keep(rows, |o| o.district.as_ref().is_some_and(|d| districts.contains(d)))
}

pub fn worker_type_options(rows: &[&Observation]) -> Vec<WorkerType> {
    distinct(rows, |o| Some(o.worker_type))
}

pub fn area_options(rows: &[&Observation]) -> Vec<String> {
    distinct(rows, |o| Some(o.area.clone()))
}

pub fn gender_options(rows: &[&Observation]) -> Vec<Gender> {
    distinct(rows, |o| Some(o.gender))
}

/// Exact-match filter on worker type, area and gender.
pub fn filter_categories<'a>(
    rows: &[&'a Observation],
    worker_type: Option<WorkerType>,
    area: Option<&str>,
    gender: Option<Gender>,
) -> Rows<'a> {
    keep(rows, |o| {
        worker_type.map_or(true, |w| o.worker_type == w)
            && area.map_or(true, |a| o.area == a)
            && gender.map_or(true, |g| o.gender == g)
    })
}

pub fn industry_options(rows: &[&Observation]) -> Vec<String> {
    distinct(rows, |o| Some(o.industry.clone()))
}

pub fn filter_industries<'a>(rows: &[&'a Observation], industries: &BTreeSet<String>) -> Rows<'a> {
    keep(rows, |o| industries.contains(&o.industry))
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Result of running the whole chain: candidate lists for every stage that
/// ran, the selection applied, and the surviving rows.
#[derive(Debug)]
pub struct ChainOutput<'a> {
    pub options: FilterOptions,
    pub resolved: ResolvedSelection,
    pub rows: Result<Rows<'a>, FilterError>,
}

/// Run geography → district → categorical → industry over `dataset`.
///
/// Each stage sees only the rows the previous one let through, and its
/// candidate list is derived from those rows. An empty result after the
/// geography stages short-circuits with [`FilterError::NoData`].
pub fn run<'a>(dataset: &'a WorkforceDataset, selection: &Selection, level: ViewLevel) -> ChainOutput<'a> {
    let base: Rows<'a> = dataset.observations.iter().collect();
    let mut options = FilterOptions {
        states: state_options(&base),
        ..FilterOptions::default()
    };
    let mut resolved = ResolvedSelection {
        states: selection.states.clone(),
        ..ResolvedSelection::default()
    };

    // 1. Geography
    let mut rows = filter_states(&base, &selection.states);

    // 2. District (district-wise only)
    if level == ViewLevel::DistrictWise {
        options.districts = district_options(&rows);
        let districts: BTreeSet<String> = match &selection.districts {
            Some(chosen) => chosen.clone(),
            None => options.districts.iter().cloned().collect(),
        };
        rows = filter_districts(&rows, &districts);
        resolved.districts = Some(districts);
    }

    if rows.is_empty() {
        return ChainOutput {
            options,
            resolved,
            rows: Err(FilterError::NoData),
        };
    }

    // 3. Worker type / area / gender
    options.worker_types = worker_type_options(&rows);
    options.areas = area_options(&rows);
    options.genders = gender_options(&rows);
    resolved.worker_type = pick(selection.worker_type.as_ref(), &options.worker_types);
    resolved.area = pick(selection.area.as_ref(), &options.areas);
    resolved.gender = pick(selection.gender.as_ref(), &options.genders);
    rows = filter_categories(&rows, resolved.worker_type, resolved.area.as_deref(), resolved.gender);

    // 4. Industry
    options.industries = industry_options(&rows);
    resolved.industries = match &selection.industries {
        Some(chosen) => options
            .industries
            .iter()
            .filter(|i| chosen.contains(*i))
            .cloned()
            .collect(),
        None => options.industries.iter().cloned().collect(),
    };
    rows = filter_industries(&rows, &resolved.industries);

    log::debug!("Filter chain kept {} of {} observations", rows.len(), base.len());

    ChainOutput {
        options,
        resolved,
        rows: Ok(rows),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn obs(
        state: &str,
        district: Option<&str>,
        industry: &str,
        worker_type: WorkerType,
        area: &str,
        gender: Gender,
        count: f64,
    ) -> Observation {
        Observation {
            state: state.into(),
            district: district.map(Into::into),
            industry: industry.into(),
            extras: Vec::new(),
            worker_type,
            area: area.into(),
            gender,
            count,
        }
    }

    pub(crate) fn sample_dataset() -> WorkforceDataset {
        use Gender::*;
        use WorkerType::*;
        let observations = vec![
            obs("Tamilnadu", Some("Chennai"), "Textiles", Main, "Rural", Male, 100.0),
            obs("Tamilnadu", Some("Chennai"), "Textiles", Main, "Urban", Female, 50.0),
            obs("Tamilnadu", Some("Chennai"), "Software", Main, "Rural", Male, 40.0),
            obs("Tamilnadu", Some("Madurai"), "Textiles", Main, "Rural", Male, 30.0),
            obs("Tamilnadu", Some("Madurai"), "Farming", Marginal, "Rural", Female, 70.0),
            obs("Tamilnadu", None, "Farming", Main, "Rural", Male, 5.0),
            obs("Kerala", Some("Kollam"), "Fishing", Main, "Rural", Male, 90.0),
            obs("Kerala", Some("Kollam"), "Coir", Main, "Urban", Total, 20.0),
        ];
        WorkforceDataset {
            observations,
            ..WorkforceDataset::default()
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_state_selection_is_no_data() {
        let ds = sample_dataset();
        let out = run(&ds, &Selection::default(), ViewLevel::StateWise);

        assert_eq!(out.rows.unwrap_err(), FilterError::NoData);
        assert_eq!(out.options.states, vec!["Kerala", "Tamilnadu"]);
        assert!(out.options.industries.is_empty());
    }

    #[test]
    fn test_district_options_depend_on_states() {
        let ds = sample_dataset();
        let selection = Selection {
            states: set(&["Tamilnadu"]),
            ..Selection::default()
        };
        let out = run(&ds, &selection, ViewLevel::DistrictWise);

        // Null district is not a candidate, and Kollam belongs to Kerala.
        assert_eq!(out.options.districts, vec!["Chennai", "Madurai"]);
        assert_eq!(out.resolved.districts, Some(set(&["Chennai", "Madurai"])));
    }

    #[test]
    fn test_state_wise_skips_district_stage() {
        let ds = sample_dataset();
        let selection = Selection {
            states: set(&["Tamilnadu"]),
            districts: Some(set(&["Chennai"])),
            ..Selection::default()
        };
        let out = run(&ds, &selection, ViewLevel::StateWise);

        assert!(out.options.districts.is_empty());
        assert_eq!(out.resolved.districts, None);
        // Defaults: Main / Rural / Female is the first candidate set.
        assert_eq!(out.resolved.worker_type, Some(WorkerType::Main));
        assert_eq!(out.resolved.area.as_deref(), Some("Rural"));
        assert_eq!(out.resolved.gender, Some(Gender::Female));
    }

    #[test]
    fn test_empty_district_selection_is_no_data() {
        let ds = sample_dataset();
        let selection = Selection {
            states: set(&["Tamilnadu"]),
            districts: Some(BTreeSet::new()),
            ..Selection::default()
        };
        let out = run(&ds, &selection, ViewLevel::DistrictWise);
        assert_eq!(out.rows.unwrap_err(), FilterError::NoData);
    }

    #[test]
    fn test_categorical_filter_matches_example() {
        let ds = sample_dataset();
        let selection = Selection {
            states: set(&["Tamilnadu"]),
            districts: Some(set(&["Chennai"])),
            worker_type: Some(WorkerType::Main),
            area: Some("Rural".into()),
            gender: Some(Gender::Male),
            industries: Some(set(&["Textiles"])),
        };
        let rows = run(&ds, &selection, ViewLevel::DistrictWise).rows.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 100.0);
        assert_eq!(rows[0].industry, "Textiles");
    }

    #[test]
    fn test_industry_options_follow_prior_filters() {
        let ds = sample_dataset();
        let selection = Selection {
            states: set(&["Tamilnadu"]),
            worker_type: Some(WorkerType::Marginal),
            area: Some("Rural".into()),
            gender: Some(Gender::Female),
            ..Selection::default()
        };
        let out = run(&ds, &selection, ViewLevel::DistrictWise);
        assert_eq!(out.options.industries, vec!["Farming"]);
    }

    #[test]
    fn test_stale_choice_falls_back_to_first_option() {
        let ds = sample_dataset();
        let selection = Selection {
            states: set(&["Kerala"]),
            area: Some("Semi_Urban".into()),
            ..Selection::default()
        };
        let out = run(&ds, &selection, ViewLevel::StateWise);
        assert_eq!(out.resolved.area.as_deref(), Some("Rural"));
    }

    #[test]
    fn test_each_stage_only_narrows() {
        let ds = sample_dataset();
        let base: Rows = ds.observations.iter().collect();
        let by_state = filter_states(&base, &set(&["Tamilnadu"]));
        let by_district = filter_districts(&by_state, &set(&["Chennai", "Madurai"]));
        let by_cat = filter_categories(&by_district, Some(WorkerType::Main), Some("Rural"), None);
        let by_industry = filter_industries(&by_cat, &set(&["Textiles"]));

        let sizes = [base.len(), by_state.len(), by_district.len(), by_cat.len(), by_industry.len()];
        assert!(sizes.windows(2).all(|w| w[1] <= w[0]), "sizes = {sizes:?}");
        assert_eq!(sizes, [8, 6, 5, 3, 2]);
    }
}
