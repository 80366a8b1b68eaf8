mod app;
mod canvas;
mod config;
mod error;
mod files;
mod http;
mod search;
mod task;

use eframe::egui;

use config::AppConfig;

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,caption_canvas=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn main() -> eframe::Result {
    setup_logging();

    let config = AppConfig::load();
    if config.access_key.is_none() {
        tracing::warn!(
            "No Unsplash access key configured; set {} or add access_key to the config file",
            config::ACCESS_KEY_ENV
        );
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 860.0])
            .with_title("caption-canvas"),
        ..Default::default()
    };

    eframe::run_native(
        "caption-canvas",
        options,
        Box::new(move |cc| Ok(Box::new(app::CaptionApp::new(cc, config)))),
    )
}
