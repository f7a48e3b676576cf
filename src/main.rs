mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::egui;

use app::WorkforceLensApp;
use data::filter::ViewLevel;
use data::pipeline::ViewOptions;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "workforce-lens")]
#[command(about = "Interactive dashboard for district-wise industrial workforce census tables", long_about = None)]
struct Cli {
    /// Census table to open on start-up (.csv, .json or .parquet)
    #[arg(env = "WORKFORCE_DATA")]
    file: Option<PathBuf>,

    /// States selected whenever a dataset is loaded
    #[arg(
        long = "state",
        env = "WORKFORCE_DEFAULT_STATE",
        value_delimiter = ',',
        default_value = "Tamilnadu"
    )]
    states: Vec<String>,

    /// Aggregate by district or by state
    #[arg(long, default_value = "district", value_parser = ["district", "state"])]
    view_level: String,

    /// Show values as a percentage of the filtered total
    #[arg(long)]
    percentage: bool,

    /// Write the filtered table to this CSV and exit without opening a window
    #[arg(long, value_name = "OUT.csv")]
    export: Option<PathBuf>,
}

impl Cli {
    fn view_options(&self) -> ViewOptions {
        let level = match self.view_level.as_str() {
            "state" => ViewLevel::StateWise,
            _ => ViewLevel::DistrictWise,
        };
        ViewOptions {
            level,
            percentage: self.percentage,
            ..ViewOptions::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::debug!("{cli:?}");

    let mut state = AppState::new(cli.states.clone(), cli.view_options());

    if let Some(out) = &cli.export {
        let Some(input) = &cli.file else {
            return Err(anyhow!("--export needs an input file"));
        };
        let dataset = data::loader::load_file(input)?;
        state.set_dataset(dataset, Some(input.clone()));
        return state.export_filtered(out);
    }

    if let Some(path) = &cli.file {
        state.load_path(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Workforce Lens",
        options,
        Box::new(|_cc| Ok(Box::new(WorkforceLensApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
