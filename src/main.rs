#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod tasks;
mod ui;

use std::path::PathBuf;

use anyhow::Context as _;
use gantt_timeline::model::GanttOptions;

/// Options file given as the first argument, or through `GANTT_OPTIONS`.
fn options_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("GANTT_OPTIONS").map(PathBuf::from))
}

fn load_options() -> anyhow::Result<Option<GanttOptions>> {
    let Some(path) = options_path() else {
        return Ok(None);
    };
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("reading options from {}", path.display()))?;
    let options = GanttOptions::from_json(&json)
        .with_context(|| format!("invalid options in {}", path.display()))?;
    log::info!("loaded options from {}", path.display());
    Ok(Some(options))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let gantt_options = load_options()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Gantt Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "Gantt Timeline",
        options,
        Box::new(|cc| Ok(Box::new(app::GanttApp::new(cc, gantt_options)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to start the UI: {err}"))
}
