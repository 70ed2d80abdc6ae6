//! Control Panel Widget
//! Chart options: data source, chart type, style, volume and indicators.

use crate::charts::{ChartKind, ChartRequest, ChartStyle, Indicator};
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// User-facing chart settings
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSettings {
    pub csv_path: Option<PathBuf>,
    pub title: String,
    pub kind: ChartKind,
    pub style: ChartStyle,
    pub show_volume: bool,
    pub sma: bool,
    pub rsi: bool,
    pub bollinger: bool,
    pub macd: bool,
    pub row_height_px: u32,
}

impl ChartSettings {
    /// Settings mirroring an initial request.
    pub fn from_request(request: &ChartRequest) -> Self {
        let has = |pred: fn(&Indicator) -> bool| request.indicators.iter().any(pred);
        Self {
            csv_path: None,
            title: request.title.clone(),
            kind: request.kind,
            style: request.style,
            show_volume: request.show_volume,
            sma: has(|i| matches!(i, Indicator::Sma { .. })),
            rsi: has(|i| matches!(i, Indicator::Rsi { .. })),
            bollinger: has(|i| matches!(i, Indicator::Bollinger { .. })),
            macd: has(|i| matches!(i, Indicator::Macd { .. })),
            row_height_px: request.row_height_px,
        }
    }

    /// Request for the chart builder; indicators use default parameters.
    pub fn to_request(&self) -> ChartRequest {
        let mut indicators = Vec::new();
        if self.sma {
            indicators.push(Indicator::sma());
        }
        if self.rsi {
            indicators.push(Indicator::rsi());
        }
        if self.bollinger {
            indicators.push(Indicator::bollinger());
        }
        if self.macd {
            indicators.push(Indicator::macd());
        }

        ChartRequest {
            kind: self.kind,
            title: self.title.clone(),
            style: self.style,
            show_volume: self.show_volume,
            indicators,
            row_height_px: self.row_height_px,
        }
    }
}

/// Chart option controls with file selection and status line.
pub struct ControlPanel {
    pub settings: ChartSettings,
    pub status: String,
    pub has_data: bool,
    pub has_chart: bool,
}

impl ControlPanel {
    pub fn new(request: &ChartRequest) -> Self {
        Self {
            settings: ChartSettings::from_request(request),
            status: "Ready".to_string(),
            has_data: false,
            has_chart: false,
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;
        let before = self.settings.clone();
        let text = Color32::from_rgb(30, 30, 30);

        // ===== Data Source =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong().color(text));
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            let path_text = self
                .settings
                .csv_path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "No file selected".to_string());
            ui.label(RichText::new(&path_text).size(12.0).color(text));

            if ui.button("📂 Browse").clicked() {
                action = ControlPanelAction::BrowseCsv;
            }
        });

        ui.add_space(10.0);
        ui.separator();

        // ===== Chart Options =====
        ui.label(RichText::new("⚙️ Chart").size(14.0).strong().color(text));
        ui.add_space(5.0);

        let label_width = 70.0;
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Title:"));
            ui.text_edit_singleline(&mut self.settings.title);
        });

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Type:"));
            ui.radio_value(&mut self.settings.kind, ChartKind::Candlestick, "Candle");
            ui.radio_value(&mut self.settings.kind, ChartKind::Ohlc, "OHLC");
        });

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Style:"));
            ComboBox::from_id_salt("chart_style")
                .width(120.0)
                .selected_text(self.settings.style.name())
                .show_ui(ui, |ui| {
                    for style in ChartStyle::ALL {
                        ui.selectable_value(&mut self.settings.style, style, style.name());
                    }
                });
        });

        ui.checkbox(&mut self.settings.show_volume, "Volume");

        ui.add_space(10.0);
        ui.separator();

        // ===== Indicators =====
        ui.label(RichText::new("📈 Indicators").size(14.0).strong().color(text));
        ui.add_space(5.0);
        ui.horizontal_wrapped(|ui| {
            ui.checkbox(&mut self.settings.sma, "SMA (20)");
            ui.checkbox(&mut self.settings.rsi, "RSI (14)");
            ui.checkbox(&mut self.settings.bollinger, "Bollinger (20, 2)");
            ui.checkbox(&mut self.settings.macd, "MACD (12, 26, 9)");
        });

        ui.add_space(10.0);
        ui.separator();

        // ===== Actions =====
        ui.horizontal(|ui| {
            ui.add_enabled_ui(self.has_chart, |ui| {
                if ui.button("🖼 Export PNG").clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(5.0);
        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::from_gray(80)
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        if action == ControlPanelAction::None && self.has_data && self.settings != before {
            action = ControlPanelAction::Rebuild;
        }
        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    Rebuild,
    ExportPng,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_request() {
        let request = ChartRequest {
            kind: ChartKind::Ohlc,
            style: ChartStyle::Yahoo,
            show_volume: true,
            indicators: vec![Indicator::macd(), Indicator::sma()],
            ..ChartRequest::default()
        };
        let settings = ChartSettings::from_request(&request);
        assert!(settings.sma && settings.macd);
        assert!(!settings.rsi && !settings.bollinger);

        let rebuilt = settings.to_request();
        assert_eq!(rebuilt.kind, ChartKind::Ohlc);
        assert_eq!(rebuilt.style, ChartStyle::Yahoo);
        assert_eq!(rebuilt.indicators, vec![Indicator::sma(), Indicator::macd()]);
    }
}
