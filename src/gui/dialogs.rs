//! Modal Dialogs
//! Reset confirmation and error warnings, drawn as centered egui windows.

use egui::{Align2, Color32, RichText};

/// Result of a frame's dialog interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    None,
    ResetConfirmed,
}

#[derive(Default)]
pub struct Dialogs {
    confirm_reset: bool,
    warning: Option<String>,
}

impl Dialogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ask_reset(&mut self) {
        self.confirm_reset = true;
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warning = Some(message.into());
    }

    /// Either dialog is open; the rest of the UI should not act.
    pub fn is_open(&self) -> bool {
        self.confirm_reset || self.warning.is_some()
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogOutcome {
        let mut outcome = DialogOutcome::None;

        if self.confirm_reset {
            egui::Window::new("Confirm Reset")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label("Are you sure you want to reset to default layout?");
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("Yes").clicked() {
                            outcome = DialogOutcome::ResetConfirmed;
                            self.confirm_reset = false;
                        }
                        if ui.button("No").clicked() {
                            self.confirm_reset = false;
                        }
                    });
                });
        }

        if let Some(message) = &self.warning {
            let mut dismissed = false;
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(RichText::new(message).color(Color32::from_rgb(220, 53, 69)));
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            if dismissed {
                self.warning = None;
            }
        }

        outcome
    }
}
