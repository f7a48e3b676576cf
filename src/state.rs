use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Result};

use crate::data::{export, loader};
use crate::data::filter::{Selection, ViewLevel};
use crate::data::model::{Gender, WorkerType, WorkforceDataset};
use crate::data::pipeline::{self, Dashboard, ViewOptions};
use crate::data::usecase::{UseCase, UseCaseView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until user loads a file). Never mutated after load.
    pub dataset: Option<Arc<WorkforceDataset>>,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    /// Current filter choices.
    pub selection: Selection,

    /// View level, percentage mode and use case.
    pub view: ViewOptions,

    /// Views for the current selection (recomputed on every change).
    pub dashboard: Option<Dashboard>,

    /// States pre-selected whenever a dataset is loaded.
    pub default_states: Vec<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Vec::new(), ViewOptions::default())
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

impl AppState {
    pub fn new(default_states: Vec<String>, view: ViewOptions) -> Self {
        Self {
            dataset: None,
            source: None,
            selection: Selection::default(),
            view,
            dashboard: None,
            default_states,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset and reset the selection to the defaults.
    pub fn set_dataset(&mut self, dataset: WorkforceDataset, source: Option<PathBuf>) {
        let available = dataset.states();
        self.selection = Selection {
            states: self
                .default_states
                .iter()
                .filter(|s| available.contains(*s))
                .cloned()
                .collect(),
            ..Selection::default()
        };
        self.dataset = Some(Arc::new(dataset));
        self.source = source;
        self.status_message = None;
        self.refresh();
    }

    /// Load `path`, replacing any current dataset. Failures end up in the
    /// status line and leave the previous dataset in place.
    pub fn load_path(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(dataset) => self.set_dataset(dataset, Some(path.to_path_buf())),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Recompute the dashboard after a selection or view change.
    pub fn refresh(&mut self) {
        self.dashboard = self
            .dataset
            .as_ref()
            .map(|ds| pipeline::build_dashboard(ds, &self.selection, self.view));
    }

    // ---- Geography ----

    pub fn toggle_state(&mut self, state: &str) {
        toggle(&mut self.selection.states, state);
        self.reset_dependent_filters();
    }

    pub fn set_states(&mut self, states: BTreeSet<String>) {
        self.selection.states = states;
        self.reset_dependent_filters();
    }

    /// District and industry candidates depend on the states; start over
    /// with "all selected" whenever the states change.
    fn reset_dependent_filters(&mut self) {
        self.selection.districts = None;
        self.selection.industries = None;
        self.refresh();
    }

    pub fn toggle_district(&mut self, district: &str) {
        let options = self.district_options();
        let districts = self
            .selection
            .districts
            .get_or_insert_with(|| options.into_iter().collect());
        toggle(districts, district);
        self.refresh();
    }

    pub fn set_districts(&mut self, districts: Option<BTreeSet<String>>) {
        self.selection.districts = districts;
        self.refresh();
    }

    // ---- Categorical ----

    pub fn set_worker_type(&mut self, worker_type: WorkerType) {
        self.selection.worker_type = Some(worker_type);
        self.refresh();
    }

    pub fn set_area(&mut self, area: String) {
        self.selection.area = Some(area);
        self.refresh();
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.selection.gender = Some(gender);
        self.refresh();
    }

    // ---- Industry ----

    pub fn toggle_industry(&mut self, industry: &str) {
        let options = self
            .dashboard
            .as_ref()
            .map(|d| d.options.industries.clone())
            .unwrap_or_default();
        let industries = self
            .selection
            .industries
            .get_or_insert_with(|| options.into_iter().collect());
        toggle(industries, industry);
        self.refresh();
    }

    pub fn set_industries(&mut self, industries: Option<BTreeSet<String>>) {
        self.selection.industries = industries;
        self.refresh();
    }

    // ---- View options ----

    pub fn set_view_level(&mut self, level: ViewLevel) {
        self.view.level = level;
        self.refresh();
    }

    pub fn set_percentage(&mut self, percentage: bool) {
        self.view.percentage = percentage;
        self.refresh();
    }

    pub fn set_use_case(&mut self, use_case: UseCase) {
        self.view.use_case = use_case;
        self.refresh();
    }

    fn district_options(&self) -> Vec<String> {
        self.dashboard
            .as_ref()
            .map(|d| d.options.districts.clone())
            .unwrap_or_default()
    }

    // ---- Export ----

    /// Write the currently filtered long table.
    pub fn export_filtered(&self, path: &Path) -> Result<()> {
        let Some(ds) = &self.dataset else {
            bail!("no dataset loaded");
        };
        let rows = pipeline::filtered_rows(ds, &self.selection, self.view.level)?;
        export::save_filtered(path, ds, &rows, self.view.percentage)
    }

    /// Write the current use-case table.
    pub fn export_view(&self, path: &Path) -> Result<()> {
        let Some(Ok(views)) = self.dashboard.as_ref().map(|d| d.views.as_ref()) else {
            bail!("no data for the current selection");
        };
        match &views.use_case {
            UseCaseView::None => bail!("{} has no table to export", self.view.use_case.label()),
            UseCaseView::Investment(rows) => export::save_view(path, rows),
            UseCaseView::SkillGap(rows) => export::save_view(path, rows),
            UseCaseView::Gender(rows) => export::save_view(path, rows),
            UseCaseView::DependencyRisk(rows) => export::save_view(path, rows),
            UseCaseView::Urbanization(rows) => export::save_view(path, rows),
        }
    }
}
