use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::filter::ViewLevel;
use super::model::{Gender, Observation};

/// A district counts as dependency-risk when one industry holds more than
/// this share of its workforce.
pub const DEPENDENCY_THRESHOLD: f64 = 0.6;

// ---------------------------------------------------------------------------
// Table rows shared by the UI and CSV export
// ---------------------------------------------------------------------------

/// A row type that can be shown as a table and written as CSV.
pub trait TableRow: Serialize {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

fn fmt_count(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

// ---------------------------------------------------------------------------
// Percentage transform
// ---------------------------------------------------------------------------

/// An observation paired with the value aggregated by the views: its Count,
/// or its percentage of the filtered total.
#[derive(Debug, Clone, Copy)]
pub struct Measured<'a> {
    pub obs: &'a Observation,
    pub value: f64,
}

/// Attach the value each view sums. In percentage mode the value is
/// `Count / total * 100` with `total` taken over `rows` before any grouping.
pub fn measure<'a>(rows: &[&'a Observation], percentage: bool) -> Vec<Measured<'a>> {
    if !percentage {
        return rows.iter().map(|&obs| Measured { obs, value: obs.count }).collect();
    }
    let total: f64 = rows.iter().map(|o| o.count).sum();
    rows.iter()
        .map(|&obs| Measured {
            obs,
            value: if total > 0.0 { obs.count / total * 100.0 } else { 0.0 },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Single-key views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub key: String,
    pub value: f64,
}

fn sum_by<'r>(rows: impl Iterator<Item = (Option<&'r str>, f64)>) -> Vec<GroupTotal> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for (key, value) in rows {
        if let Some(key) = key {
            *sums.entry(key).or_default() += value;
        }
    }
    let mut out: Vec<GroupTotal> = sums
        .into_iter()
        .map(|(key, value)| GroupTotal {
            key: key.to_string(),
            value,
        })
        .collect();
    // Descending by value; ties keep the key order for stable output.
    out.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.key.cmp(&b.key)));
    out
}

/// Sum per Industry_Category, largest first.
pub fn by_industry(rows: &[Measured]) -> Vec<GroupTotal> {
    sum_by(rows.iter().map(|m| (Some(m.obs.industry.as_str()), m.value)))
}

/// Sum per District or State (depending on `level`), largest first.
/// Rows without a District are left out at district level.
pub fn by_geography(rows: &[Measured], level: ViewLevel) -> Vec<GroupTotal> {
    sum_by(rows.iter().map(|m| (level.geo_key(m.obs), m.value)))
}

// ---------------------------------------------------------------------------
// Cross view (heatmap source)
// ---------------------------------------------------------------------------

/// Industry × geography pivot of summed values; absent pairs are 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossTable {
    pub industries: Vec<String>,
    pub geographies: Vec<String>,
    /// `cells[i][g]` for `industries[i]` and `geographies[g]`.
    pub cells: Vec<Vec<f64>>,
}

impl CrossTable {
    #[cfg(test)]
    pub fn get(&self, industry: &str, geography: &str) -> Option<f64> {
        let i = self.industries.iter().position(|x| x == industry)?;
        let g = self.geographies.iter().position(|x| x == geography)?;
        Some(self.cells[i][g])
    }

    pub fn max_value(&self) -> f64 {
        self.cells
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }
}

pub fn cross(rows: &[Measured], level: ViewLevel) -> CrossTable {
    let mut sums: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    let mut industries = BTreeSet::new();
    let mut geographies = BTreeSet::new();
    for m in rows {
        let Some(geo) = level.geo_key(m.obs) else {
            continue;
        };
        industries.insert(m.obs.industry.as_str());
        geographies.insert(geo);
        *sums.entry((m.obs.industry.as_str(), geo)).or_default() += m.value;
    }

    let cells = industries
        .iter()
        .map(|i| {
            geographies
                .iter()
                .map(|g| sums.get(&(*i, *g)).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    CrossTable {
        industries: industries.into_iter().map(String::from).collect(),
        geographies: geographies.into_iter().map(String::from).collect(),
        cells,
    }
}

// ---------------------------------------------------------------------------
// Investment score
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentRow {
    #[serde(rename = "District")]
    pub district: String,
    #[serde(rename = "Total_Workers")]
    pub total_workers: f64,
    #[serde(rename = "Industry_Count")]
    pub industry_count: usize,
    /// `None` when the district has no industries (score undefined).
    #[serde(rename = "Investment_Score")]
    pub investment_score: Option<f64>,
}

impl TableRow for InvestmentRow {
    const HEADERS: &'static [&'static str] =
        &["District", "Total_Workers", "Industry_Count", "Investment_Score"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.district.clone(),
            fmt_count(self.total_workers),
            self.industry_count.to_string(),
            self.investment_score
                .map(|s| format!("{s:.2}"))
                .unwrap_or_else(|| "undefined".to_string()),
        ]
    }
}

/// Workers per distinct industry for each district, best score first.
pub fn investment(rows: &[&Observation]) -> Vec<InvestmentRow> {
    let mut groups: BTreeMap<&str, (f64, BTreeSet<&str>)> = BTreeMap::new();
    for o in rows {
        let Some(district) = o.district.as_deref() else {
            continue;
        };
        let (total, industries) = groups.entry(district).or_default();
        *total += o.count;
        industries.insert(o.industry.as_str());
    }

    let mut out: Vec<InvestmentRow> = groups
        .into_iter()
        .map(|(district, (total, industries))| {
            let industry_count = industries.len();
            InvestmentRow {
                district: district.to_string(),
                total_workers: total,
                industry_count,
                investment_score: (industry_count > 0).then(|| total / industry_count as f64),
            }
        })
        .collect();

    // Undefined scores sort last.
    out.sort_by(|a, b| match (a.investment_score, b.investment_score) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.district.cmp(&b.district),
    });
    out
}

// ---------------------------------------------------------------------------
// District × industry views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillGapRow {
    #[serde(rename = "District")]
    pub district: String,
    #[serde(rename = "Industry_Category")]
    pub industry: String,
    #[serde(rename = "Count")]
    pub count: f64,
}

impl TableRow for SkillGapRow {
    const HEADERS: &'static [&'static str] = &["District", "Industry_Category", "Count"];

    fn cells(&self) -> Vec<String> {
        vec![self.district.clone(), self.industry.clone(), fmt_count(self.count)]
    }
}

/// Summed Count per (District, Industry_Category), ordered by key.
pub fn skill_gap(rows: &[&Observation]) -> Vec<SkillGapRow> {
    let mut sums: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for o in rows {
        if let Some(district) = o.district.as_deref() {
            *sums.entry((district, o.industry.as_str())).or_default() += o.count;
        }
    }
    sums.into_iter()
        .map(|((district, industry), count)| SkillGapRow {
            district: district.to_string(),
            industry: industry.to_string(),
            count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyRow {
    #[serde(rename = "District")]
    pub district: String,
    #[serde(rename = "Industry_Category")]
    pub industry: String,
    #[serde(rename = "Count")]
    pub count: f64,
    #[serde(rename = "Share")]
    pub share: f64,
}

impl TableRow for DependencyRow {
    const HEADERS: &'static [&'static str] = &["District", "Industry_Category", "Count", "Share"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.district.clone(),
            self.industry.clone(),
            fmt_count(self.count),
            format!("{:.1}%", self.share * 100.0),
        ]
    }
}

/// Every industry's share of its district's counted workforce.
///
/// Districts whose total is zero have no meaningful shares and are omitted.
pub fn dependency_shares(rows: &[&Observation]) -> Vec<DependencyRow> {
    let pairs = skill_gap(rows);
    let mut district_totals: BTreeMap<&str, f64> = BTreeMap::new();
    for p in &pairs {
        *district_totals.entry(p.district.as_str()).or_default() += p.count;
    }

    pairs
        .iter()
        .filter_map(|p| {
            let total = district_totals.get(p.district.as_str()).copied().unwrap_or(0.0);
            (total > 0.0).then(|| DependencyRow {
                district: p.district.clone(),
                industry: p.industry.clone(),
                count: p.count,
                share: p.count / total,
            })
        })
        .collect()
}

/// Industries holding more than [`DEPENDENCY_THRESHOLD`] of their district.
pub fn dependency_risk(rows: &[&Observation]) -> Vec<DependencyRow> {
    dependency_shares(rows)
        .into_iter()
        .filter(|r| r.share > DEPENDENCY_THRESHOLD)
        .collect()
}

// ---------------------------------------------------------------------------
// Gender / area breakdowns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderRow {
    #[serde(rename = "Industry_Category")]
    pub industry: String,
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "Count")]
    pub count: f64,
}

impl TableRow for GenderRow {
    const HEADERS: &'static [&'static str] = &["Industry_Category", "Gender", "Count"];

    fn cells(&self) -> Vec<String> {
        vec![self.industry.clone(), self.gender.to_string(), fmt_count(self.count)]
    }
}

/// Summed Count per (Industry_Category, Gender).
pub fn gender_composition(rows: &[&Observation]) -> Vec<GenderRow> {
    let mut sums: BTreeMap<(&str, Gender), f64> = BTreeMap::new();
    for o in rows {
        *sums.entry((o.industry.as_str(), o.gender)).or_default() += o.count;
    }
    sums.into_iter()
        .map(|((industry, gender), count)| GenderRow {
            industry: industry.to_string(),
            gender,
            count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaRow {
    #[serde(rename = "Area")]
    pub area: String,
    #[serde(rename = "Count")]
    pub count: f64,
}

impl TableRow for AreaRow {
    const HEADERS: &'static [&'static str] = &["Area", "Count"];

    fn cells(&self) -> Vec<String> {
        vec![self.area.clone(), fmt_count(self.count)]
    }
}

/// Summed Count per Area, ordered by area name.
pub fn by_area(rows: &[&Observation]) -> Vec<AreaRow> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for o in rows {
        *sums.entry(o.area.as_str()).or_default() += o.count;
    }
    sums.into_iter()
        .map(|(area, count)| AreaRow {
            area: area.to_string(),
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Headline indicators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kpis {
    pub total_workers: f64,
    pub industries: usize,
    pub states: usize,
    pub districts: usize,
}

pub fn kpis(rows: &[&Observation]) -> Kpis {
    Kpis {
        total_workers: rows.iter().map(|o| o.count).sum(),
        industries: rows.iter().map(|o| &o.industry).collect::<BTreeSet<_>>().len(),
        states: rows.iter().map(|o| &o.state).collect::<BTreeSet<_>>().len(),
        districts: rows
            .iter()
            .filter_map(|o| o.district.as_ref())
            .collect::<BTreeSet<_>>()
            .len(),
    }
}
