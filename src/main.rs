//! Dockable Charts - Dockable panel workspace with financial charting
//!
//! Six panels arranged by a persistent docking layout, one of which shows a
//! candlestick chart built from a CSV price table.

mod charts;
mod config;
mod data;
mod gui;
mod indicators;
mod layout;
mod settings;

use anyhow::anyhow;
use config::AppConfig;
use eframe::egui;
use gui::DockingApp;
use layout::{LayoutHost, WindowGeometry, GEOMETRY_KEY};
use settings::SettingsStore;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging; `RUST_LOG` overrides the configured filter.
fn setup_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_settings(config: &AppConfig) -> SettingsStore {
    match SettingsStore::open(&config.organization, &config.application) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Settings unavailable ({}), falling back to ./settings.json", e);
            SettingsStore::new("settings.json")
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load_default();
    setup_logging(&config.log_filter);

    let settings = open_settings(&config);
    let mut host = LayoutHost::new()
        .with_window(WindowGeometry::new(config.window.width, config.window.height));
    host.restore(&settings);
    info!("Using settings at {:?}", settings.path());

    let window = host.window_geometry();
    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size([window.rect.width, window.rect.height])
        .with_min_inner_size([config.window.min_width, config.window.min_height])
        .with_maximized(window.maximized)
        .with_title(config.window.title.clone());
    if settings.contains(GEOMETRY_KEY) {
        viewport = viewport.with_position([window.rect.x, window.rect.y]);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let title = config.window.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(DockingApp::new(cc, config, host, settings)))),
    )
    .map_err(|e| anyhow!("Application error: {}", e))
}
