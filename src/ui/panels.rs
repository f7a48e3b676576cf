use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export;
use crate::data::filter::ViewLevel;
use crate::data::usecase::{UseCase, UseCaseView};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Multi-select widget
// ---------------------------------------------------------------------------

enum MultiAction {
    Toggle(String),
    All,
    None,
}

/// Collapsible checkbox list with All / None buttons. Returns what the user
/// did, if anything; the caller applies it to the state.
fn multi_select(
    ui: &mut Ui,
    title: &str,
    options: &[String],
    is_selected: impl Fn(&str) -> bool,
    default_open: bool,
) -> Option<MultiAction> {
    let n_selected = options.iter().filter(|o| is_selected(o)).count();
    let header_text = format!("{title}  ({n_selected}/{})", options.len());
    let mut action = None;

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(default_open)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    action = Some(MultiAction::All);
                }
                if ui.small_button("None").clicked() {
                    action = Some(MultiAction::None);
                }
            });
            for opt in options {
                let mut checked = is_selected(opt);
                if ui.checkbox(&mut checked, opt.as_str()).changed() {
                    action = Some(MultiAction::Toggle(opt.clone()));
                }
            }
        });

    action
}

/// Single-value combo box over `options`; returns the newly picked value.
fn single_select<T: Copy + PartialEq + ToString>(
    ui: &mut Ui,
    id: &str,
    label: &str,
    options: &[T],
    current: Option<T>,
) -> Option<T> {
    let mut picked = None;
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.map(|c| c.to_string()).unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for opt in options {
                if ui
                    .selectable_label(current == Some(*opt), opt.to_string())
                    .clicked()
                {
                    picked = Some(*opt);
                }
            }
        });
    picked
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone what we need so we can mutate state inside the widgets.
    let Some(dash) = state.dashboard.clone() else {
        ui.label("No dataset loaded.");
        return;
    };
    let options = dash.options;
    let resolved = dash.resolved;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Use case / view options ----
            ui.strong("Business use case");
            let current = state.view.use_case;
            egui::ComboBox::from_id_salt("use_case")
                .selected_text(current.label())
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for uc in UseCase::ALL {
                        if ui.selectable_label(current == uc, uc.label()).clicked() {
                            state.set_use_case(uc);
                        }
                    }
                });

            ui.add_space(4.0);
            ui.strong("View level");
            ui.horizontal(|ui: &mut Ui| {
                for level in ViewLevel::ALL {
                    if ui.radio(state.view.level == level, level.label()).clicked() {
                        state.set_view_level(level);
                    }
                }
            });

            let mut percentage = state.view.percentage;
            if ui.checkbox(&mut percentage, "Show percentage").changed() {
                state.set_percentage(percentage);
            }
            ui.separator();

            // ---- Geography ----
            let selected_states = state.selection.states.clone();
            match multi_select(ui, "State(s)", &options.states, |s| selected_states.contains(s), true) {
                Some(MultiAction::Toggle(s)) => state.toggle_state(&s),
                Some(MultiAction::All) => state.set_states(options.states.iter().cloned().collect()),
                Some(MultiAction::None) => state.set_states(BTreeSet::new()),
                None => {}
            }

            if state.view.level == ViewLevel::DistrictWise {
                let chosen = state.selection.districts.clone();
                let is_selected = |d: &str| chosen.as_ref().map_or(true, |c| c.contains(d));
                match multi_select(ui, "District(s)", &options.districts, is_selected, false) {
                    Some(MultiAction::Toggle(d)) => state.toggle_district(&d),
                    Some(MultiAction::All) => state.set_districts(None),
                    Some(MultiAction::None) => state.set_districts(Some(BTreeSet::new())),
                    None => {}
                }
            }
            ui.separator();

            // ---- Worker filters ----
            if let Some(w) = single_select(ui, "worker_type", "Worker type", &options.worker_types, resolved.worker_type) {
                state.set_worker_type(w);
            }
            if let Some(g) = single_select(ui, "gender", "Gender", &options.genders, resolved.gender) {
                state.set_gender(g);
            }
            ui.label("Area");
            let current_area = resolved.area.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("area")
                .selected_text(&current_area)
                .show_ui(ui, |ui: &mut Ui| {
                    for area in &options.areas {
                        if ui.selectable_label(*area == current_area, area).clicked() {
                            state.set_area(area.clone());
                        }
                    }
                });
            ui.separator();

            // ---- Industry ----
            match multi_select(
                ui,
                "Industry",
                &options.industries,
                |i| resolved.industries.contains(i),
                false,
            ) {
                Some(MultiAction::Toggle(i)) => state.toggle_industry(&i),
                Some(MultiAction::All) => state.set_industries(None),
                Some(MultiAction::None) => state.set_industries(Some(BTreeSet::new())),
                None => {}
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }

            let has_rows = matches!(
                state.dashboard.as_ref().map(|d| d.views.is_ok()),
                Some(true)
            );
            if ui
                .add_enabled(has_rows, egui::Button::new("Export filtered data…"))
                .clicked()
            {
                export_filtered_dialog(state);
                ui.close_menu();
            }

            let has_view = state
                .dashboard
                .as_ref()
                .and_then(|d| d.views.as_ref().ok())
                .is_some_and(|v| v.use_case != UseCaseView::None);
            if ui
                .add_enabled(has_view, egui::Button::new("Export use-case table…"))
                .clicked()
            {
                export_view_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let visible = state
                .dashboard
                .as_ref()
                .and_then(|d| d.views.as_ref().ok())
                .map_or(0, |v| v.row_count);
            let name = state
                .source
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!("{name}: {} observations loaded, {visible} visible", ds.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open workforce census")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

fn export_filtered_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name(export::FILTERED_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        let result = state.export_filtered(&path);
        report(state, result);
    }
}

fn export_view_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export use-case table")
        .set_file_name("use_case_view.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        let result = state.export_view(&path);
        report(state, result);
    }
}

fn report(state: &mut AppState, result: anyhow::Result<()>) {
    state.status_message = match result {
        Ok(()) => None,
        Err(e) => {
            log::error!("Export failed: {e:#}");
            Some(format!("Error: {e:#}"))
        }
    };
}
