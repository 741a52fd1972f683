mod app;
mod color;
mod config;
mod data;
mod session;
mod state;
mod ui;
mod view;

use app::JusticeGapApp;
use config::ViewerConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ViewerConfig::load();
    log::info!("Opening {}", config.artifact_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Systemic Justice Gap Analyzer")
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Systemic Justice Gap Analyzer",
        options,
        Box::new(|_cc| Ok(Box::new(JusticeGapApp::new(config)))),
    )
}
