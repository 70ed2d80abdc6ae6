//! Chart Viewer Widget
//! Scrollable view of the current chart using egui_plot.

use crate::charts::{ChartPlotter, ChartSpec};
use egui::{Color32, RichText};

/// Holds the most recently built chart.
#[derive(Default)]
pub struct ChartViewer {
    pub chart: Option<ChartSpec>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.chart = None;
    }

    pub fn set_chart(&mut self, chart: ChartSpec) {
        self.chart = Some(chart);
    }

    /// Draw the chart rows, or a placeholder when nothing is loaded.
    pub fn show(&self, ui: &mut egui::Ui) {
        let Some(chart) = &self.chart else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new("No Data\nBrowse for a CSV with Open/High/Low/Close columns")
                        .size(16.0)
                        .color(Color32::from_gray(90)),
                );
            });
            return;
        };

        ChartPlotter::draw_chart(ui, chart);
    }
}
