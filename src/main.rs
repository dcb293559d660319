mod app;
mod color;
mod state;
mod ui;

use app::DashboardApp;
use circle_damage::config::AppConfig;
use circle_damage::data::model::Dataset;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_env();
    let source = config.data_source();
    let (dataset, load_error) = match source.dataset() {
        Ok(ds) => (ds.clone(), None),
        Err(e) => {
            log::error!("Failed to load damage data: {e}");
            (Dataset::empty(), Some(format!("Error: {e}")))
        }
    };

    let mut state = AppState::new(config, dataset);
    state.status_message = load_error;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Circle Condo Damage Dashboard",
        options,
        Box::new(|cc| {
            // Install image loaders so egui can fetch and render room photos.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(DashboardApp::new(state)))
        }),
    )
}
