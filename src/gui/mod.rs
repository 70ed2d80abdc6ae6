//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;
mod dialogs;
mod dock_view;
mod registry;

pub use app::DockingApp;
pub use chart_viewer::ChartViewer;
pub use control_panel::{ControlPanel, ControlPanelAction};
