use super::aggregate::{
    self, AreaRow, DependencyRow, GenderRow, InvestmentRow, SkillGapRow,
};
use super::filter::{self, ResolvedSelection, Rows};
use super::model::{Observation, WorkforceDataset};

// ---------------------------------------------------------------------------
// Business use cases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UseCase {
    #[default]
    GeneralOverview,
    InvestmentPlanning,
    SkillGap,
    GenderInclusion,
    DependencyRisk,
    Urbanization,
}

impl UseCase {
    pub const ALL: [Self; 6] = [
        Self::GeneralOverview,
        Self::InvestmentPlanning,
        Self::SkillGap,
        Self::GenderInclusion,
        Self::DependencyRisk,
        Self::Urbanization,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::GeneralOverview => "General Workforce Overview",
            Self::InvestmentPlanning => "Industrial Investment Planning",
            Self::SkillGap => "Skill Gap Analysis",
            Self::GenderInclusion => "Gender & Inclusion Analysis",
            Self::DependencyRisk => "Industry Dependency Risk",
            Self::Urbanization => "Urbanization & Migration",
        }
    }

    /// Short reading guide shown under the use-case view.
    pub fn insight(self) -> Option<&'static str> {
        match self {
            Self::GeneralOverview => None,
            Self::InvestmentPlanning => Some(
                "Districts with high workforce and low industry saturation are ideal for new industrial investments.",
            ),
            Self::SkillGap => Some(
                "High workforce but limited industry diversity indicates the need for skill development programs.",
            ),
            Self::GenderInclusion => None,
            Self::DependencyRisk => {
                Some("Districts heavily dependent on a single industry are economically vulnerable.")
            }
            Self::Urbanization => None,
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Self::GeneralOverview => "Use filters to explore workforce patterns.",
            Self::InvestmentPlanning => {
                "Promote industries in high-workforce, low-saturation districts."
            }
            Self::SkillGap => {
                "Launch targeted skill development programs aligned with local industries."
            }
            Self::GenderInclusion => {
                "Introduce incentives to improve female workforce participation."
            }
            Self::DependencyRisk => "Encourage industry diversification to reduce economic risk.",
            Self::Urbanization => "Strengthen rural employment to reduce migration pressure.",
        }
    }
}

/// The extra table produced for the selected use case.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UseCaseView {
    #[default]
    None,
    Investment(Vec<InvestmentRow>),
    SkillGap(Vec<SkillGapRow>),
    Gender(Vec<GenderRow>),
    DependencyRisk(Vec<DependencyRow>),
    Urbanization(Vec<AreaRow>),
}

/// Build the use-case view.
///
/// Investment, skill-gap and dependency views work on the fully filtered
/// rows. The gender view looks at every gender and area of the selected
/// states and worker type; the urbanization view keeps every area but
/// honours the rest of the selection.
pub fn build(
    use_case: UseCase,
    dataset: &WorkforceDataset,
    resolved: &ResolvedSelection,
    filtered: &[&Observation],
) -> UseCaseView {
    match use_case {
        UseCase::GeneralOverview => UseCaseView::None,
        UseCase::InvestmentPlanning => UseCaseView::Investment(aggregate::investment(filtered)),
        UseCase::SkillGap => UseCaseView::SkillGap(aggregate::skill_gap(filtered)),
        UseCase::DependencyRisk => UseCaseView::DependencyRisk(aggregate::dependency_risk(filtered)),
        UseCase::GenderInclusion => {
            UseCaseView::Gender(aggregate::gender_composition(&gender_rows(dataset, resolved)))
        }
        UseCase::Urbanization => {
            UseCaseView::Urbanization(aggregate::by_area(&urbanization_rows(dataset, resolved)))
        }
    }
}

fn gender_rows<'a>(dataset: &'a WorkforceDataset, resolved: &ResolvedSelection) -> Rows<'a> {
    let base: Rows<'a> = dataset.observations.iter().collect();
    let rows = filter::filter_states(&base, &resolved.states);
    filter::filter_categories(&rows, resolved.worker_type, None, None)
}

fn urbanization_rows<'a>(dataset: &'a WorkforceDataset, resolved: &ResolvedSelection) -> Rows<'a> {
    let base: Rows<'a> = dataset.observations.iter().collect();
    let mut rows = filter::filter_states(&base, &resolved.states);
    rows = filter::filter_industries(&rows, &resolved.industries);
    rows = filter::filter_categories(&rows, resolved.worker_type, None, resolved.gender);
    match &resolved.districts {
        Some(districts) if !districts.is_empty() => filter::filter_districts(&rows, districts),
        _ => rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::AreaRow;
    use crate::data::filter::tests::{obs, sample_dataset};
    use crate::data::filter::{run, Selection, ViewLevel};
    use crate::data::model::{Gender, WorkerType};

    fn tamilnadu_male_main() -> Selection {
        Selection {
            states: ["Tamilnadu".to_string()].into(),
            worker_type: Some(WorkerType::Main),
            area: Some("Rural".into()),
            gender: Some(Gender::Male),
            ..Selection::default()
        }
    }

    #[test]
    fn test_general_overview_has_no_extra_view() {
        let ds = sample_dataset();
        let out = run(&ds, &tamilnadu_male_main(), ViewLevel::DistrictWise);
        let rows = out.rows.unwrap();
        assert_eq!(build(UseCase::GeneralOverview, &ds, &out.resolved, &rows), UseCaseView::None);
    }

    #[test]
    fn test_gender_view_ignores_area_gender_and_district() {
        let ds = sample_dataset();
        let out = run(&ds, &tamilnadu_male_main(), ViewLevel::DistrictWise);
        let rows = out.rows.unwrap();

        let UseCaseView::Gender(view) = build(UseCase::GenderInclusion, &ds, &out.resolved, &rows) else {
            panic!("expected gender view");
        };
        // Urban female Textiles and the district-less Farming row are included;
        // Marginal rows are not.
        let get = |industry: &str, gender: Gender| {
            view.iter()
                .find(|r| r.industry == industry && r.gender == gender)
                .map(|r| r.count)
        };
        assert_eq!(get("Textiles", Gender::Female), Some(50.0));
        assert_eq!(get("Farming", Gender::Male), Some(5.0));
        assert_eq!(get("Farming", Gender::Female), None);
    }

    #[test]
    fn test_urbanization_view_keeps_all_areas() {
        let ds = sample_dataset();
        let mut selection = tamilnadu_male_main();
        selection.gender = Some(Gender::Female);
        let out = run(&ds, &selection, ViewLevel::StateWise);
        let rows = out.rows.unwrap();

        // Main / Female in Tamilnadu only exists in Urban, but the Rural
        // filter already removed it, so no industry survives the chain.
        assert!(rows.is_empty());
        let UseCaseView::Urbanization(view) = build(UseCase::Urbanization, &ds, &out.resolved, &rows) else {
            panic!("expected urbanization view");
        };
        assert!(view.is_empty());

        let out = run(&ds, &tamilnadu_male_main(), ViewLevel::StateWise);
        let rows = out.rows.unwrap();
        let UseCaseView::Urbanization(view) = build(UseCase::Urbanization, &ds, &out.resolved, &rows) else {
            panic!("expected urbanization view");
        };
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].area, "Rural");
        assert_eq!(view[0].count, 175.0);
    }

    #[test]
    fn test_urbanization_view_reaches_past_area_filter() {
        let ds = WorkforceDataset {
            observations: vec![
                obs("Kerala", Some("Kollam"), "Fishing", WorkerType::Main, "Rural", Gender::Male, 90.0),
                obs("Kerala", Some("Kollam"), "Fishing", WorkerType::Main, "Urban", Gender::Male, 25.0),
                obs("Kerala", Some("Kollam"), "Fishing", WorkerType::Main, "Urban", Gender::Female, 7.0),
                obs("Kerala", Some("Kollam"), "Coir", WorkerType::Main, "Urban", Gender::Male, 10.0),
            ],
            ..WorkforceDataset::default()
        };
        let selection = Selection {
            states: ["Kerala".to_string()].into(),
            worker_type: Some(WorkerType::Main),
            area: Some("Rural".into()),
            gender: Some(Gender::Male),
            ..Selection::default()
        };
        let out = run(&ds, &selection, ViewLevel::DistrictWise);
        let rows = out.rows.unwrap();
        assert_eq!(rows.len(), 1);

        let UseCaseView::Urbanization(view) = build(UseCase::Urbanization, &ds, &out.resolved, &rows) else {
            panic!("expected urbanization view");
        };
        // Urban Fishing is kept; the Female row and the Rural-less Coir
        // industry are still filtered out.
        assert_eq!(
            view,
            vec![
                AreaRow { area: "Rural".into(), count: 90.0 },
                AreaRow { area: "Urban".into(), count: 25.0 },
            ]
        );
    }

    #[test]
    fn test_every_use_case_has_a_recommendation() {
        for uc in UseCase::ALL {
            assert!(!uc.recommendation().is_empty());
            assert!(!uc.label().is_empty());
        }
    }
}
