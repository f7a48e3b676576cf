use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot};

use crate::color;
use crate::data::aggregate::{AreaRow, CrossTable, GenderRow, GroupTotal, Kpis};
use crate::data::model::Gender;
use crate::data::pipeline::{Views, ViewOptions};
use crate::data::usecase::UseCaseView;
use crate::ui::tables;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render every view for the current selection.
pub fn dashboard(ui: &mut Ui, views: &Views, opts: ViewOptions) {
    kpi_row(ui, &views.kpis);
    ui.separator();

    ui.heading("Industry-wise Workforce Distribution");
    group_bar_chart(ui, "industry_chart", &views.industry, opts.value_label(), Color32::from_rgb(70, 130, 180));
    ui.add_space(8.0);

    ui.heading(format!("{} Workforce Distribution", opts.level.label()));
    group_bar_chart(ui, "geography_chart", &views.geography, opts.value_label(), Color32::from_rgb(46, 139, 87));
    ui.add_space(8.0);

    ui.heading(format!("Industry × {} Heatmap", opts.level.label()));
    heatmap(ui, &views.cross);
    ui.separator();

    use_case_section(ui, views, opts);
}

fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    ui.horizontal(|ui: &mut Ui| {
        kpi(ui, "Total Workers", format_thousands(kpis.total_workers));
        kpi(ui, "Industries", kpis.industries.to_string());
        kpi(ui, "States", kpis.states.to_string());
        kpi(ui, "Districts", kpis.districts.to_string());
    });
}

fn kpi(ui: &mut Ui, title: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(title).small());
            ui.label(RichText::new(value).heading().strong());
        });
    });
}

fn format_thousands(v: f64) -> String {
    let digits = format!("{:.0}", v.abs());
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if v < 0.0 {
        out.insert(0, '-');
    }
    out
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Axis formatter that prints the category name under each integer tick.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let v = mark.value;
        if v.fract() != 0.0 || v < 0.0 {
            return String::new();
        }
        labels.get(v as usize).cloned().unwrap_or_default()
    }
}

fn group_bar_chart(ui: &mut Ui, id: &str, groups: &[GroupTotal], value_label: &str, fill: Color32) {
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| Bar::new(i as f64, g.value).name(&g.key).fill(fill).width(0.7))
        .collect();
    let labels: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(value_label)
        .x_axis_formatter(category_formatter(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(value_label));
        });
}

fn gender_chart(ui: &mut Ui, rows: &[GenderRow]) {
    let industries: Vec<&str> = {
        let mut v: Vec<&str> = rows.iter().map(|r| r.industry.as_str()).collect();
        v.dedup();
        v
    };
    let counts: BTreeMap<(&str, Gender), f64> = rows
        .iter()
        .map(|r| ((r.industry.as_str(), r.gender), r.count))
        .collect();

    let mut charts: Vec<BarChart> = Vec::new();
    for gender in Gender::ALL {
        let bars: Vec<Bar> = industries
            .iter()
            .enumerate()
            .map(|(i, ind)| {
                let count = counts.get(&(*ind, gender)).copied().unwrap_or(0.0);
                Bar::new(i as f64, count).width(0.7)
            })
            .collect();
        let refs: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(gender.as_str())
            .color(color::gender_color(gender))
            .stack_on(&refs);
        charts.push(chart);
    }

    let labels: Vec<String> = industries.iter().map(|s| s.to_string()).collect();
    Plot::new("gender_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Workers")
        .x_axis_formatter(category_formatter(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

fn area_chart(ui: &mut Ui, rows: &[AreaRow]) {
    let palette = color::generate_palette(rows.len());
    let bars: Vec<Bar> = rows
        .iter()
        .zip(palette)
        .enumerate()
        .map(|(i, (r, fill))| Bar::new(i as f64, r.count).name(&r.area).fill(fill).width(0.6))
        .collect();
    let labels: Vec<String> = rows.iter().map(|r| r.area.clone()).collect();

    Plot::new("area_chart")
        .height(CHART_HEIGHT)
        .y_axis_label("Workers")
        .x_axis_formatter(category_formatter(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Workers"));
        });
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, table: &CrossTable) {
    if table.industries.is_empty() {
        ui.label(RichText::new("Nothing to show.").italics());
        return;
    }
    let max = table.max_value();

    egui::ScrollArea::horizontal()
        .id_salt("heatmap_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("heatmap")
                .spacing([2.0, 2.0])
                .show(ui, |ui: &mut Ui| {
                    ui.label("");
                    for geo in &table.geographies {
                        ui.strong(geo);
                    }
                    ui.end_row();

                    for (industry, row) in table.industries.iter().zip(&table.cells) {
                        ui.strong(industry);
                        for &value in row {
                            let text = RichText::new(format!("{value:.1}"))
                                .monospace()
                                .color(color::heat_text_color(value, max))
                                .background_color(color::heat_color(value, max));
                            ui.label(text);
                        }
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Use-case section
// ---------------------------------------------------------------------------

fn use_case_section(ui: &mut Ui, views: &Views, opts: ViewOptions) {
    let use_case = opts.use_case;
    match &views.use_case {
        UseCaseView::None => return,
        UseCaseView::Investment(rows) => {
            ui.heading("District Investment Opportunity Score");
            tables::show_table(ui, "investment_table", rows);
        }
        UseCaseView::SkillGap(rows) => {
            ui.heading("Workforce by District and Industry");
            tables::show_table(ui, "skill_gap_table", rows);
        }
        UseCaseView::Gender(rows) => {
            ui.heading("Gender Composition by Industry");
            gender_chart(ui, rows);
            tables::show_table(ui, "gender_table", rows);
        }
        UseCaseView::DependencyRisk(rows) => {
            ui.heading("High Dependency Districts (> 60% in one industry)");
            tables::show_table(ui, "dependency_table", rows);
        }
        UseCaseView::Urbanization(rows) => {
            ui.heading("Rural vs Urban Workforce");
            area_chart(ui, rows);
            tables::show_table(ui, "area_table", rows);
        }
    }

    if let Some(insight) = use_case.insight() {
        ui.add_space(4.0);
        ui.label(RichText::new(insight).color(Color32::from_rgb(30, 110, 170)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1234567.4), "1,234,567");
    }
}
