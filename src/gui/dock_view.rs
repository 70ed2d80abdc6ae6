//! Dock View
//! Projects the layout host onto egui panels and windows, and turns user
//! interaction on title bars and tabs into [`LayoutAction`]s.

use crate::gui::registry::PanelRegistry;
use crate::layout::{DockArea, Geometry, LayoutAction, LayoutHost, Orientation, PanelId};
use egui::{Color32, Frame, Id, RichText, ScrollArea, Sense, Stroke};

const TITLE_BAR_FILL: Color32 = Color32::from_rgb(53, 53, 53);
const GEOMETRY_EPSILON: f32 = 0.5;

/// Renders docked areas and floating windows for one frame.
pub struct DockView<'a> {
    host: &'a LayoutHost,
    registry: &'a PanelRegistry,
    /// Bumped when the layout is replaced wholesale so floating windows
    /// pick up their stored geometry instead of egui's remembered one.
    epoch: u64,
    actions: Vec<LayoutAction>,
}

impl<'a> DockView<'a> {
    pub fn new(host: &'a LayoutHost, registry: &'a PanelRegistry, epoch: u64) -> Self {
        Self {
            host,
            registry,
            epoch,
            actions: Vec::new(),
        }
    }

    /// Draw everything; `body` fills each visible panel's content area.
    /// Returns the actions requested this frame, in order.
    pub fn show(
        mut self,
        ctx: &egui::Context,
        body: &mut dyn FnMut(&mut egui::Ui, PanelId),
    ) -> Vec<LayoutAction> {
        for area in [DockArea::Top, DockArea::Bottom, DockArea::Left, DockArea::Right] {
            let groups = self.host.docked_groups(area);
            if groups.is_empty() {
                continue;
            }
            let id = format!("dock_{:?}", area);
            match area {
                DockArea::Top => {
                    egui::TopBottomPanel::top(id)
                        .resizable(true)
                        .default_height(260.0)
                        .show(ctx, |ui| self.show_area(ui, area, &groups, body));
                }
                DockArea::Bottom => {
                    egui::TopBottomPanel::bottom(id)
                        .resizable(true)
                        .default_height(260.0)
                        .show(ctx, |ui| self.show_area(ui, area, &groups, body));
                }
                DockArea::Left => {
                    egui::SidePanel::left(id)
                        .resizable(true)
                        .default_width(420.0)
                        .show(ctx, |ui| self.show_area(ui, area, &groups, body));
                }
                DockArea::Right => {
                    egui::SidePanel::right(id)
                        .resizable(true)
                        .default_width(360.0)
                        .show(ctx, |ui| self.show_area(ui, area, &groups, body));
                }
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Dockable Window System").size(16.0).weak());
            });
        });

        for id in self.host.floating_panels() {
            self.show_floating(ctx, id, body);
        }

        self.actions
    }

    fn show_area(
        &mut self,
        ui: &mut egui::Ui,
        area: DockArea,
        groups: &[Vec<PanelId>],
        body: &mut dyn FnMut(&mut egui::Ui, PanelId),
    ) {
        let orientation = self.host.arrangement().area(area).orientation;
        let count = groups.len() as f32;
        let spacing = ui.spacing().item_spacing;

        match orientation {
            Orientation::Vertical => {
                let height = (ui.available_height() - spacing.y * (count - 1.0)) / count;
                for group in groups {
                    let size = egui::vec2(ui.available_width(), height.max(40.0));
                    ui.allocate_ui(size, |ui| {
                        ui.set_min_size(size);
                        self.show_group(ui, group, body);
                    });
                }
            }
            Orientation::Horizontal => {
                ui.columns(groups.len(), |columns| {
                    for (ui, group) in columns.iter_mut().zip(groups) {
                        self.show_group(ui, group, body);
                    }
                });
            }
        }
    }

    /// The group's current tab, falling back to its first visible panel.
    fn current_tab(&self, group: &[PanelId]) -> Option<PanelId> {
        group
            .first()
            .and_then(|first| self.host.arrangement().group_of(*first))
            .and_then(|g| g.current())
            .filter(|current| group.contains(current))
            .or_else(|| group.first().copied())
    }

    fn show_group(
        &mut self,
        ui: &mut egui::Ui,
        group: &[PanelId],
        body: &mut dyn FnMut(&mut egui::Ui, PanelId),
    ) {
        let Some(current) = self.current_tab(group) else {
            return;
        };

        Frame::group(ui.style()).inner_margin(2.0).show(ui, |ui| {
            ui.vertical(|ui| {
                self.title_bar(ui, current);

                if group.len() > 1 {
                    ui.horizontal(|ui| {
                        for id in group {
                            if ui.selectable_label(*id == current, id.title()).clicked()
                                && *id != current
                            {
                                self.actions.push(LayoutAction::Raise(*id));
                            }
                        }
                    });
                }

                self.panel_body(ui, current, body);
            });
        });
    }

    fn panel_body(
        &self,
        ui: &mut egui::Ui,
        id: PanelId,
        body: &mut dyn FnMut(&mut egui::Ui, PanelId),
    ) {
        let content = self.registry.get(id);
        Frame::none()
            .fill(content.background)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.set_min_size(ui.available_size());
                ScrollArea::both()
                    .id_salt(("panel_body", id))
                    .auto_shrink([false, false])
                    .show(ui, |ui| body(ui, id));
            });
    }

    /// Title strip with the panel name. Double-click toggles floating, a
    /// right-click opens the panel menu.
    fn title_bar(&mut self, ui: &mut egui::Ui, id: PanelId) {
        let movable = self.host.panel(id).movable;
        let floating = self.host.is_floating(id);

        let response = Frame::none()
            .fill(TITLE_BAR_FILL)
            .stroke(Stroke::new(1.0, Color32::from_gray(68)))
            .inner_margin(4.0)
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.horizontal(|ui| {
                    let lock = if movable { "" } else { " (locked)" };
                    ui.label(
                        RichText::new(format!("{}{}", id.title(), lock))
                            .strong()
                            .color(Color32::WHITE),
                    );
                });
            })
            .response
            .interact(Sense::click());

        if response.double_clicked() {
            self.actions.push(LayoutAction::ToggleFloating(id));
        }

        response.context_menu(|ui| {
            let float_label = if floating { "Dock" } else { "Float" };
            if ui
                .button(format!("{} Window {}", float_label, id.letter()))
                .clicked()
            {
                self.actions.push(LayoutAction::SetFloating(id, !floating));
                ui.close_menu();
            }
            if ui.button(format!("Close Window {}", id.letter())).clicked() {
                self.actions.push(LayoutAction::SetVisible(id, false));
                ui.close_menu();
            }
            ui.separator();
            if ui.add_enabled(movable, egui::Button::new("Lock Position")).clicked() {
                self.actions.push(LayoutAction::SetMovable(id, false));
                ui.close_menu();
            }
            if ui.add_enabled(!movable, egui::Button::new("Unlock Position")).clicked() {
                self.actions.push(LayoutAction::SetMovable(id, true));
                ui.close_menu();
            }
        });
    }

    fn show_floating(
        &mut self,
        ctx: &egui::Context,
        id: PanelId,
        body: &mut dyn FnMut(&mut egui::Ui, PanelId),
    ) {
        let state = self.host.panel(id);
        let geometry = state
            .geometry
            .unwrap_or_else(|| Geometry::floating_default(id));
        let mut open = true;

        let shown = egui::Window::new(id.title())
            .id(Id::new(("floating_panel", id, self.epoch)))
            .open(&mut open)
            .movable(state.movable)
            .resizable(state.movable)
            .collapsible(false)
            .default_pos([geometry.x, geometry.y])
            .default_size([geometry.width, geometry.height])
            .show(ctx, |ui| {
                self.title_bar(ui, id);
                self.panel_body(ui, id, body);
                ui.min_rect()
            });

        if !open {
            self.actions.push(LayoutAction::SetVisible(id, false));
            return;
        }

        if let Some(egui::InnerResponse {
            inner: Some(content),
            response,
        }) = shown
        {
            let moved = Self::floating_geometry(response.rect, content);
            if Self::differs(&moved, &geometry) {
                self.actions.push(LayoutAction::MoveFloating(id, moved));
            }
        }
    }

    /// Position of the whole window, size of its content area: the pair
    /// `default_pos` / `default_size` expect back.
    fn floating_geometry(window: egui::Rect, content: egui::Rect) -> Geometry {
        Geometry {
            x: window.min.x,
            y: window.min.y,
            width: content.width(),
            height: content.height(),
        }
    }

    fn differs(a: &Geometry, b: &Geometry) -> bool {
        (a.x - b.x).abs() > GEOMETRY_EPSILON
            || (a.y - b.y).abs() > GEOMETRY_EPSILON
            || (a.width - b.width).abs() > GEOMETRY_EPSILON
            || (a.height - b.height).abs() > GEOMETRY_EPSILON
    }
}
