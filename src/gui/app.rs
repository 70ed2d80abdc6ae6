//! Docking Application
//! Main window: menu bar, dockable panels, chart loading and layout persistence.

use crate::charts::{ChartBuilder, StaticChartRenderer};
use crate::config::AppConfig;
use crate::data::PriceLoader;
use crate::gui::dialogs::{DialogOutcome, Dialogs};
use crate::gui::dock_view::DockView;
use crate::gui::registry::{PanelBody, PanelRegistry};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::layout::{
    Geometry, LayoutAction, LayoutHost, PanelId, WindowGeometry, LAYOUT_EXTENSION,
};
use crate::settings::SettingsStore;
use egui::{menu, TopBottomPanel, ViewportCommand};
use polars::prelude::DataFrame;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use tracing::{info, warn};

/// CSV loading result from background thread
enum LoadResult {
    Complete { df: DataFrame, path: PathBuf },
    Error(String),
}

/// Main application window.
pub struct DockingApp {
    config: AppConfig,
    host: LayoutHost,
    settings: SettingsStore,
    registry: PanelRegistry,
    dialogs: Dialogs,

    loader: PriceLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,

    /// Bumped whenever the layout is replaced wholesale.
    layout_epoch: u64,
    /// Main window geometry must be pushed to the viewport next frame.
    geometry_dirty: bool,
}

impl DockingApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        host: LayoutHost,
        settings: SettingsStore,
    ) -> Self {
        let request = config.chart.chart_request();
        Self {
            control_panel: ControlPanel::new(&request),
            config,
            host,
            settings,
            registry: PanelRegistry::new(),
            dialogs: Dialogs::new(),
            loader: PriceLoader::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
            layout_epoch: 0,
            geometry_dirty: false,
        }
    }

    // ===== Layout =====

    fn apply_layout_action(&mut self, action: LayoutAction) {
        self.host.apply(action);
        if !matches!(
            action,
            LayoutAction::MoveFloating(..) | LayoutAction::Raise(_)
        ) {
            self.layout_epoch += 1;
        }
    }

    /// Write geometry and window state to the settings store.
    fn save_window_state(&mut self) {
        match self.host.persist(&mut self.settings) {
            Ok(()) => info!("Saved window state to {:?}", self.settings.path()),
            Err(e) => warn!("Failed to save window state: {}", e),
        }
    }

    fn handle_save_layout(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Save Layout")
            .add_filter("Layout Files", &[LAYOUT_EXTENSION])
            .set_file_name(format!("default.{}", LAYOUT_EXTENSION))
            .save_file()
        else {
            return;
        };

        if let Err(e) = self.host.export_snapshot_to_file(&path) {
            warn!("Failed to save layout to {:?}: {}", path, e);
            self.dialogs.warn(format!("Failed to save layout: {}", e));
        }
    }

    fn handle_load_layout(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Load Layout")
            .add_filter("Layout Files", &[LAYOUT_EXTENSION])
            .pick_file()
        else {
            return;
        };

        match self.host.import_snapshot_from_file(&path) {
            Ok(()) => {
                self.layout_epoch += 1;
                self.geometry_dirty = true;
            }
            Err(e) => {
                warn!("Failed to load layout from {:?}: {}", path, e);
                self.dialogs.warn(format!("Failed to load layout: {}", e));
            }
        }
    }

    /// Record the viewport's current position and size in the host.
    fn track_window_geometry(&mut self, ctx: &egui::Context) {
        let (outer, inner, maximized) = ctx.input(|i| {
            let viewport = i.viewport();
            (viewport.outer_rect, viewport.inner_rect, viewport.maximized)
        });
        let (Some(outer), Some(inner)) = (outer, inner) else {
            return;
        };

        let window = WindowGeometry {
            rect: Geometry {
                x: outer.min.x,
                y: outer.min.y,
                width: inner.width(),
                height: inner.height(),
            },
            maximized: maximized.unwrap_or(false),
        };
        if window != self.host.window_geometry() {
            self.host.set_window_geometry(window);
        }
    }

    fn push_window_geometry(&self, ctx: &egui::Context) {
        let window = self.host.window_geometry();
        if window.maximized {
            ctx.send_viewport_cmd(ViewportCommand::Maximized(true));
            return;
        }
        ctx.send_viewport_cmd(ViewportCommand::Maximized(false));
        ctx.send_viewport_cmd(ViewportCommand::OuterPosition(egui::pos2(
            window.rect.x,
            window.rect.y,
        )));
        ctx.send_viewport_cmd(ViewportCommand::InnerSize(egui::vec2(
            window.rect.width,
            window.rect.height,
        )));
    }

    // ===== Chart =====

    /// Handle CSV file selection; parsing runs on a background thread.
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        self.chart_viewer.clear();
        self.control_panel.has_chart = false;
        self.control_panel.settings.csv_path = Some(path.clone());
        self.control_panel.set_status("Loading CSV file...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let result = match PriceLoader::read_csv(&path) {
                Ok(df) => LoadResult::Complete { df, path },
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete { df, path }) => {
                self.loader.set_dataframe(df, path);
                self.control_panel.has_data = true;
                self.is_loading = false;
                self.rebuild_chart();
            }
            Ok(LoadResult::Error(error)) => {
                warn!("CSV load failed: {}", error);
                self.control_panel.has_data = false;
                self.control_panel
                    .set_status(&format!("Error: {}", error));
                self.is_loading = false;
            }
            Err(TryRecvError::Empty) => self.load_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.control_panel.set_status("Error: loader thread stopped");
                self.is_loading = false;
            }
        }
    }

    fn rebuild_chart(&mut self) {
        let Some(df) = self.loader.get_dataframe() else {
            self.control_panel.set_status("No data loaded");
            return;
        };

        let request = self.control_panel.settings.to_request();
        match ChartBuilder::build_chart(df, &request) {
            Ok(chart) => {
                let file = self
                    .loader
                    .get_file_path()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                self.control_panel.set_status(&format!(
                    "{}: {} rows, {} chart rows",
                    file,
                    self.loader.get_row_count(),
                    chart.row_count()
                ));
                self.chart_viewer.set_chart(chart);
                self.control_panel.has_chart = true;
            }
            Err(e) => {
                self.chart_viewer.clear();
                self.control_panel.has_chart = false;
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    /// Render the current chart to a PNG and open it in the system viewer.
    fn handle_export_png(&mut self) {
        let Some(chart) = &self.chart_viewer.chart else {
            self.control_panel.set_status("No chart to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("chart.png")
            .save_file()
        else {
            return;
        };

        match StaticChartRenderer::render_png(chart, &path, self.config.chart.export_width_px) {
            Ok(()) => {
                self.control_panel
                    .set_status(&format!("Exported {}", path.display()));
                if let Err(e) = open::that(&path) {
                    warn!("Could not open {:?}: {}", path, e);
                }
            }
            Err(e) => {
                self.control_panel
                    .set_status(&format!("Error: {}", e));
            }
        }
    }

    fn handle_control_action(&mut self, action: ControlPanelAction) {
        match action {
            ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
            ControlPanelAction::Rebuild => self.rebuild_chart(),
            ControlPanelAction::ExportPng => self.handle_export_png(),
            ControlPanelAction::None => {}
        }
    }

    /// Store the current chart options in the user config file.
    fn handle_save_chart_defaults(&mut self) {
        let Some(path) = self.config.user_config_path() else {
            warn!("No config directory; chart defaults not saved");
            return;
        };

        self.config
            .chart
            .update_from_request(&self.control_panel.settings.to_request());
        match self.config.save(&path) {
            Ok(()) => {
                info!("Saved chart defaults to {:?}", path);
                self.control_panel.set_status("Chart options saved as defaults");
            }
            Err(e) => {
                warn!("Failed to save config to {:?}: {}", path, e);
                self.dialogs.warn(format!("Failed to save chart defaults: {}", e));
            }
        }
    }

    // ===== Menus =====

    fn show_menu_bar(&mut self, ctx: &egui::Context) -> Vec<LayoutAction> {
        let mut actions = Vec::new();
        let mut control = ControlPanelAction::None;

        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Save Layout...").clicked() {
                        ui.close_menu();
                        self.handle_save_layout();
                    }
                    if ui.button("Load Layout...").clicked() {
                        ui.close_menu();
                        self.handle_load_layout();
                    }
                    ui.separator();
                    if ui.button("Reset Layout").clicked() {
                        ui.close_menu();
                        self.dialogs.ask_reset();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ui.close_menu();
                        ctx.send_viewport_cmd(ViewportCommand::Close);
                    }
                });

                ui.menu_button("Windows", |ui| {
                    for id in PanelId::ALL {
                        let mut visible = self.host.is_visible(id);
                        let status = self.host.status(id);
                        if ui
                            .checkbox(&mut visible, id.title())
                            .on_hover_text(format!("{:?}", status))
                            .changed()
                        {
                            actions.push(LayoutAction::SetVisible(id, visible));
                        }
                    }
                });

                ui.menu_button("Layouts", |ui| {
                    for (label, action) in [
                        ("Float All", LayoutAction::FloatAll),
                        ("Dock All", LayoutAction::DockAll),
                    ] {
                        if ui.button(label).clicked() {
                            actions.push(action);
                            ui.close_menu();
                        }
                    }
                    ui.separator();
                    for (label, action) in [
                        ("Tabbed Layout", LayoutAction::TabbedPreset),
                        ("Grid Layout", LayoutAction::GridPreset),
                    ] {
                        if ui.button(label).clicked() {
                            actions.push(action);
                            ui.close_menu();
                        }
                    }
                });

                ui.menu_button("Chart", |ui| {
                    if ui.button("Open CSV...").clicked() {
                        control = ControlPanelAction::BrowseCsv;
                        ui.close_menu();
                    }
                    if ui.button("Save as Defaults").clicked() {
                        ui.close_menu();
                        self.handle_save_chart_defaults();
                    }
                    ui.separator();
                    let can_export = self.chart_viewer.chart.is_some();
                    if ui
                        .add_enabled(can_export, egui::Button::new("Export PNG..."))
                        .clicked()
                    {
                        control = ControlPanelAction::ExportPng;
                        ui.close_menu();
                    }
                });
            });
        });

        self.handle_control_action(control);
        actions
    }
}

impl eframe::App for DockingApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();
        if self.is_loading {
            ctx.request_repaint();
        }

        if self.geometry_dirty {
            self.push_window_geometry(ctx);
            self.geometry_dirty = false;
        } else {
            self.track_window_geometry(ctx);
        }

        let mut actions = self.show_menu_bar(ctx);

        if self.dialogs.show(ctx) == DialogOutcome::ResetConfirmed {
            actions.push(LayoutAction::ResetToDefault);
        }

        // Panels
        let mut control = ControlPanelAction::None;
        let control_panel = &mut self.control_panel;
        let chart_viewer = &self.chart_viewer;
        let registry = &self.registry;
        let dock_actions = DockView::new(&self.host, registry, self.layout_epoch).show(
            ctx,
            &mut |ui, id| match registry.get(id).body {
                PanelBody::Chart => chart_viewer.show(ui),
                PanelBody::ChartControls => {
                    let action = control_panel.show(ui);
                    if action != ControlPanelAction::None {
                        control = action;
                    }
                }
                PanelBody::Notes => PanelRegistry::show_notes(ui, id),
            },
        );

        if !self.dialogs.is_open() {
            actions.extend(dock_actions);
        }
        for action in actions {
            self.apply_layout_action(action);
        }
        self.handle_control_action(control);

        if ctx.input(|i| i.viewport().close_requested()) {
            self.save_window_state();
        }
    }
}
