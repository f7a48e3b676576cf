use eframe::egui::{self, RichText, Ui};

use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct WorkforceLensApp {
    pub state: AppState,
}

impl WorkforceLensApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for WorkforceLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: recommendation ----
        egui::TopBottomPanel::bottom("recommendation").show(ctx, |ui| {
            let rec = self.state.view.use_case.recommendation();
            ui.label(RichText::new(format!("Key Recommendation: {rec}")).strong());
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            central(ui, &self.state);
        });
    }
}

fn central(ui: &mut Ui, state: &AppState) {
    let Some(dash) = &state.dashboard else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a census file to explore the workforce  (File → Open…)");
        });
        return;
    };

    ui.heading(state.view.use_case.label());
    ui.separator();

    match &dash.views {
        Ok(views) => {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    charts::dashboard(ui, views, state.view);
                });
        }
        Err(e) => {
            ui.label(RichText::new(e.to_string()).color(egui::Color32::from_rgb(200, 140, 0)));
        }
    }
}
