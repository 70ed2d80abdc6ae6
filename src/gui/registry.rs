//! Panel Registry
//! Static mapping from each panel to the content it renders.

use crate::layout::PanelId;
use egui::{Color32, RichText};

/// What a panel shows inside its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelBody {
    /// Interactive chart of the loaded price table.
    Chart,
    /// Chart options and data source.
    ChartControls,
    /// Usage notes.
    Notes,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelContent {
    pub background: Color32,
    pub body: PanelBody,
}

/// Built once at startup; indexed by [`PanelId::index`].
pub struct PanelRegistry {
    contents: [PanelContent; 6],
}

impl Default for PanelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelRegistry {
    pub fn new() -> Self {
        let content = |r, g, b, body| PanelContent {
            background: Color32::from_rgb(r, g, b),
            body,
        };
        Self {
            contents: [
                content(240, 248, 255, PanelBody::Chart),         // AliceBlue
                content(255, 228, 196, PanelBody::ChartControls), // Bisque
                content(220, 255, 220, PanelBody::Notes),         // Honeydew
                content(255, 218, 185, PanelBody::Notes),         // PeachPuff
                content(230, 230, 250, PanelBody::Notes),         // Lavender
                content(255, 228, 225, PanelBody::Notes),         // MistyRose
            ],
        }
    }

    pub fn get(&self, id: PanelId) -> &PanelContent {
        &self.contents[id.index()]
    }

    /// Help text shown by [`PanelBody::Notes`] panels.
    pub fn show_notes(ui: &mut egui::Ui, id: PanelId) {
        let text = Color32::from_rgb(30, 30, 30);
        ui.label(RichText::new(id.title()).size(20.0).strong().color(text));
        ui.add_space(6.0);
        for (action, hint) in [
            ("Double-click", "the title bar to float or dock"),
            ("Right-click", "the title bar for options"),
            ("Click", "a tab to bring its panel to the front"),
            ("Windows menu", "shows or hides panels"),
            ("Layouts menu", "re-tiles all panels"),
        ] {
            ui.horizontal_wrapped(|ui| {
                ui.label(RichText::new(action).strong().color(text));
                ui.label(RichText::new(hint).color(text));
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_panel_has_content() {
        let registry = PanelRegistry::new();
        let charts = PanelId::ALL
            .iter()
            .filter(|id| registry.get(**id).body == PanelBody::Chart)
            .count();
        assert_eq!(charts, 1);
        assert_eq!(registry.get(PanelId::B).body, PanelBody::ChartControls);
        assert_ne!(
            registry.get(PanelId::A).background,
            registry.get(PanelId::F).background
        );
    }
}
