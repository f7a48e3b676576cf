use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::TableRow;

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable, striped table of any view row type.
pub fn show_table<T: TableRow>(ui: &mut Ui, id: &str, rows: &[T]) {
    if rows.is_empty() {
        ui.label(egui::RichText::new("No rows for the current selection.").italics());
        return;
    }

    // Several tables may share a panel; keep their column state apart.
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(320.0)
            .columns(Column::auto().at_least(90.0), T::HEADERS.len())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for name in T::HEADERS {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let cells = rows[row.index()].cells();
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}
