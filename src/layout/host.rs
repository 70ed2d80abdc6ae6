//! The layout host: six panels, their arrangement and persistence.

use crate::layout::arrangement::{Arrangement, DockArea};
use crate::layout::panel::{Geometry, PanelId, PanelState, PanelStatus, WindowGeometry};
use crate::layout::snapshot::{
    self, LayoutSnapshot, SnapshotError, WindowState, GEOMETRY_KEY, WINDOW_STATE_KEY,
};
use crate::settings::{SettingsError, SettingsStore};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// A user request against the layout. Carries the panel by value so menu
/// entries and title-bar handlers never share mutable captures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutAction {
    SetVisible(PanelId, bool),
    SetFloating(PanelId, bool),
    /// Title-bar double click; ignored for locked panels.
    ToggleFloating(PanelId),
    SetMovable(PanelId, bool),
    Raise(PanelId),
    /// A floating panel was moved or resized by the user.
    MoveFloating(PanelId, Geometry),
    FloatAll,
    DockAll,
    ResetToDefault,
    TabbedPreset,
    GridPreset,
}

/// Owns every panel's state and the docking arrangement.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutHost {
    panels: BTreeMap<PanelId, PanelState>,
    arrangement: Arrangement,
    window: WindowGeometry,
}

impl Default for LayoutHost {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutHost {
    /// All panels visible and docked in the default arrangement.
    pub fn new() -> Self {
        Self {
            panels: PanelId::ALL
                .into_iter()
                .map(|id| (id, PanelState::default()))
                .collect(),
            arrangement: Arrangement::default(),
            window: WindowGeometry::default(),
        }
    }

    pub fn with_window(mut self, window: WindowGeometry) -> Self {
        self.window = window;
        self
    }

    pub fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }

    pub fn panel(&self, id: PanelId) -> &PanelState {
        // Every PanelId is inserted at construction and never removed.
        &self.panels[&id]
    }

    fn panel_mut(&mut self, id: PanelId) -> &mut PanelState {
        self.panels.entry(id).or_default()
    }

    pub fn window_geometry(&self) -> WindowGeometry {
        self.window
    }

    pub fn set_window_geometry(&mut self, window: WindowGeometry) {
        self.window = window;
    }

    pub fn is_visible(&self, id: PanelId) -> bool {
        self.panel(id).visible
    }

    pub fn is_floating(&self, id: PanelId) -> bool {
        self.panel(id).floating
    }

    pub fn status(&self, id: PanelId) -> PanelStatus {
        let state = self.panel(id);
        if !state.visible {
            PanelStatus::Hidden
        } else if state.floating {
            PanelStatus::Floating
        } else if self.arrangement.group_of(id).is_some_and(|g| g.len() > 1) {
            PanelStatus::Tabbed
        } else {
            PanelStatus::Docked
        }
    }

    /// Shows or hides a panel. Its slot is kept while hidden.
    pub fn toggle_visible(&mut self, id: PanelId, visible: bool) {
        debug!("{} visible = {}", id, visible);
        self.panel_mut(id).visible = visible;
    }

    /// Detaches a panel into its own window, or docks it back into its slot.
    pub fn set_floating(&mut self, id: PanelId, floating: bool) {
        debug!("{} floating = {}", id, floating);
        let state = self.panel_mut(id);
        state.floating = floating;
        if floating && state.geometry.is_none() {
            state.geometry = Some(Geometry::floating_default(id));
        }
    }

    pub fn set_movable(&mut self, id: PanelId, movable: bool) {
        debug!("{} movable = {}", id, movable);
        self.panel_mut(id).movable = movable;
    }

    pub fn set_floating_geometry(&mut self, id: PanelId, geometry: Geometry) {
        self.panel_mut(id).geometry = Some(geometry);
    }

    pub fn raise(&mut self, id: PanelId) {
        self.arrangement = self.arrangement.raise(id);
    }

    pub fn float_all(&mut self) {
        for id in PanelId::ALL {
            self.set_floating(id, true);
        }
    }

    pub fn dock_all(&mut self) {
        for id in PanelId::ALL {
            self.set_floating(id, false);
        }
    }

    /// Restores the default arrangement and shows every panel docked.
    pub fn reset_to_default_layout(&mut self) {
        for state in self.panels.values_mut() {
            state.floating = false;
        }
        self.arrangement = Arrangement::default_layout(&self.arrangement);
        for state in self.panels.values_mut() {
            state.visible = true;
        }
        info!("Layout reset to default");
    }

    /// Docks everything and chains all panels into one tab group.
    pub fn apply_tabbed_preset(&mut self) {
        self.dock_all();
        self.arrangement = Arrangement::tabbed_layout(&self.arrangement);
        info!("Applied tabbed layout");
    }

    /// Docks everything into a 2x3 grid along the top and bottom edges.
    pub fn apply_grid_preset(&mut self) {
        self.dock_all();
        self.arrangement = Arrangement::grid_layout(&self.arrangement);
        info!("Applied grid layout");
    }

    /// Visible, docked panels of `area`, grouped as laid out.
    pub fn docked_groups(&self, area: DockArea) -> Vec<Vec<PanelId>> {
        self.arrangement
            .area(area)
            .groups
            .iter()
            .map(|g| {
                g.panels()
                    .iter()
                    .copied()
                    .filter(|id| self.is_visible(*id) && !self.is_floating(*id))
                    .collect::<Vec<_>>()
            })
            .filter(|g| !g.is_empty())
            .collect()
    }

    pub fn floating_panels(&self) -> Vec<PanelId> {
        PanelId::ALL
            .into_iter()
            .filter(|id| self.is_visible(*id) && self.is_floating(*id))
            .collect()
    }

    /// Single entry point for GUI-originated requests.
    pub fn apply(&mut self, action: LayoutAction) {
        match action {
            LayoutAction::SetVisible(id, visible) => self.toggle_visible(id, visible),
            LayoutAction::SetFloating(id, floating) => self.set_floating(id, floating),
            LayoutAction::ToggleFloating(id) => {
                if self.panel(id).movable {
                    let floating = !self.is_floating(id);
                    self.set_floating(id, floating);
                } else {
                    debug!("{} is locked, ignoring float toggle", id);
                }
            }
            LayoutAction::SetMovable(id, movable) => self.set_movable(id, movable),
            LayoutAction::Raise(id) => self.raise(id),
            LayoutAction::MoveFloating(id, geometry) => self.set_floating_geometry(id, geometry),
            LayoutAction::FloatAll => self.float_all(),
            LayoutAction::DockAll => self.dock_all(),
            LayoutAction::ResetToDefault => self.reset_to_default_layout(),
            LayoutAction::TabbedPreset => self.apply_tabbed_preset(),
            LayoutAction::GridPreset => self.apply_grid_preset(),
        }
    }

    // ===== Persistence =====

    fn window_state(&self) -> WindowState {
        WindowState {
            arrangement: self.arrangement.clone(),
            panels: self.panels.clone(),
        }
    }

    pub fn save_snapshot(&self) -> Result<LayoutSnapshot, SnapshotError> {
        Ok(LayoutSnapshot {
            geometry: snapshot::encode_geometry(&self.window)?,
            window_state: snapshot::encode_window_state(&self.window_state())?,
        })
    }

    /// Applies a snapshot. Both blobs are decoded before anything changes,
    /// so a malformed snapshot leaves the host untouched.
    pub fn load_snapshot(&mut self, snapshot: &LayoutSnapshot) -> Result<(), SnapshotError> {
        let window = snapshot::decode_geometry(&snapshot.geometry)?;
        let state = snapshot::decode_window_state(&snapshot.window_state)?;
        self.window = window;
        self.arrangement = state.arrangement;
        self.panels = state.panels;
        Ok(())
    }

    pub fn export_snapshot_to_file(&self, path: &Path) -> Result<(), SnapshotError> {
        let document = self.save_snapshot()?.to_document()?;
        fs::write(path, document)?;
        info!("Exported layout to {:?}", path);
        Ok(())
    }

    pub fn import_snapshot_from_file(&mut self, path: &Path) -> Result<(), SnapshotError> {
        let text = fs::read_to_string(path)?;
        let snapshot = LayoutSnapshot::from_document(&text)?;
        self.load_snapshot(&snapshot)?;
        info!("Imported layout from {:?}", path);
        Ok(())
    }

    /// Stores both blobs in the settings store and flushes it.
    pub fn persist(&self, settings: &mut SettingsStore) -> Result<(), SettingsError> {
        match self.save_snapshot() {
            Ok(snapshot) => {
                settings.set_value(WINDOW_STATE_KEY, snapshot.window_state);
                settings.set_value(GEOMETRY_KEY, snapshot.geometry);
            }
            Err(e) => warn!("Failed to encode layout: {}", e),
        }
        settings.sync()
    }

    /// Restores geometry and window state independently. Missing keys are
    /// skipped; corrupt blobs are logged and ignored.
    pub fn restore(&mut self, settings: &SettingsStore) {
        if let Some(blob) = settings.value(GEOMETRY_KEY) {
            match snapshot::decode_geometry(blob) {
                Ok(window) => self.window = window,
                Err(e) => warn!("Ignoring stored geometry: {}", e),
            }
        }
        if let Some(blob) = settings.value(WINDOW_STATE_KEY) {
            match snapshot::decode_window_state(blob) {
                Ok(state) => {
                    self.arrangement = state.arrangement;
                    self.panels = state.panels;
                    info!("Restored window state from settings");
                }
                Err(e) => warn!("Ignoring stored window state: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PanelId::*;

    fn all_docked(host: &LayoutHost) -> bool {
        PanelId::ALL
            .into_iter()
            .all(|id| host.is_visible(id) && !host.is_floating(id))
    }

    #[test]
    fn new_host_has_default_statuses() {
        let host = LayoutHost::new();
        assert_eq!(host.status(A), PanelStatus::Tabbed);
        assert_eq!(host.status(E), PanelStatus::Docked);
        assert_eq!(host.status(F), PanelStatus::Docked);
    }

    #[test]
    fn statuses_follow_toggles() {
        let mut host = LayoutHost::new();
        host.set_floating(E, true);
        assert_eq!(host.status(E), PanelStatus::Floating);
        assert!(host.panel(E).geometry.is_some());
        host.toggle_visible(E, false);
        assert_eq!(host.status(E), PanelStatus::Hidden);
        host.toggle_visible(E, true);
        host.set_floating(E, false);
        assert_eq!(host.status(E), PanelStatus::Docked);
    }

    #[test]
    fn reset_grid_reset_round_trip() {
        let fresh = LayoutHost::new();
        let mut host = LayoutHost::new();
        host.float_all();
        host.toggle_visible(C, false);

        host.reset_to_default_layout();
        host.apply_grid_preset();
        host.reset_to_default_layout();

        assert!(all_docked(&host));
        assert_eq!(host.arrangement(), fresh.arrangement());
    }

    #[test]
    fn presets_dock_but_keep_visibility() {
        let mut host = LayoutHost::new();
        host.set_floating(B, true);
        host.toggle_visible(F, false);
        host.apply_tabbed_preset();
        assert!(!host.is_floating(B));
        assert!(!host.is_visible(F));
        assert_eq!(host.docked_groups(DockArea::Left), vec![vec![A, B, C, D, E]]);
    }

    #[test]
    fn locked_panel_ignores_float_toggle() {
        let mut host = LayoutHost::new();
        host.apply(LayoutAction::SetMovable(D, false));
        host.apply(LayoutAction::ToggleFloating(D));
        assert!(!host.is_floating(D));
        host.apply(LayoutAction::SetMovable(D, true));
        host.apply(LayoutAction::ToggleFloating(D));
        assert!(host.is_floating(D));
    }

    #[test]
    fn locked_panel_still_floats_from_menu() {
        let mut host = LayoutHost::new();
        host.apply(LayoutAction::SetMovable(C, false));
        host.apply(LayoutAction::SetFloating(C, true));
        assert!(host.is_floating(C));
        host.apply(LayoutAction::SetFloating(C, false));
        assert!(!host.is_floating(C));
        assert!(!host.panel(C).movable);
    }

    #[test]
    fn floating_panels_are_not_docked_groups() {
        let mut host = LayoutHost::new();
        host.set_floating(E, true);
        assert!(host.floating_panels().contains(&E));
        assert_eq!(host.docked_groups(DockArea::Left), vec![vec![A, B]]);
    }

    #[test]
    fn snapshot_round_trip() {
        let mut host = LayoutHost::new();
        host.apply_grid_preset();
        host.set_floating(B, true);
        host.toggle_visible(F, false);
        host.set_window_geometry(WindowGeometry::new(1024.0, 768.0));

        let snapshot = host.save_snapshot().unwrap();
        let mut other = LayoutHost::new();
        other.load_snapshot(&snapshot).unwrap();
        assert_eq!(other, host);
    }

    #[test]
    fn export_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mine.layout");

        let mut host = LayoutHost::new();
        host.set_floating(A, true);
        host.set_floating(D, true);
        host.toggle_visible(C, false);
        host.export_snapshot_to_file(&path).unwrap();

        let mut fresh = LayoutHost::new();
        fresh.reset_to_default_layout();
        fresh.import_snapshot_from_file(&path).unwrap();

        for id in PanelId::ALL {
            assert_eq!(fresh.is_visible(id), host.is_visible(id), "{}", id);
            assert_eq!(fresh.is_floating(id), host.is_floating(id), "{}", id);
        }
    }

    #[test]
    fn corrupted_export_is_rejected_and_layout_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.layout");

        let mut source = LayoutHost::new();
        source.apply_tabbed_preset();
        source.export_snapshot_to_file(&path).unwrap();

        // Flip one hex digit inside the window state payload.
        let text = fs::read_to_string(&path).unwrap();
        let start = text.find("\"windowState\":\"").unwrap() + "\"windowState\":\"".len();
        let target = start + 40;
        let original = text.as_bytes()[target] as char;
        let replacement = if original == '0' { '1' } else { '0' };
        let mut corrupted = text.clone();
        corrupted.replace_range(target..target + 1, &replacement.to_string());
        fs::write(&path, corrupted).unwrap();

        let mut host = LayoutHost::new();
        host.set_floating(E, true);
        let before = host.clone();
        assert!(host.import_snapshot_from_file(&path).is_err());
        assert_eq!(host, before);
    }

    #[test]
    fn missing_file_is_recoverable() {
        let mut host = LayoutHost::new();
        let before = host.clone();
        let err = host
            .import_snapshot_from_file(Path::new("/definitely/not/here.layout"))
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Io(_)));
        assert_eq!(host, before);
    }

    #[test]
    fn persist_and_restore_through_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut host = LayoutHost::new();
        host.apply_grid_preset();
        host.set_movable(A, false);
        let mut settings = SettingsStore::new(&path);
        host.persist(&mut settings).unwrap();

        let reloaded = SettingsStore::at_path(&path).unwrap();
        assert!(reloaded.contains(GEOMETRY_KEY));
        assert!(reloaded.contains(WINDOW_STATE_KEY));

        let mut restored = LayoutHost::new();
        restored.restore(&reloaded);
        assert_eq!(restored, host);
    }

    #[test]
    fn restore_ignores_corrupt_blob() {
        let mut settings = SettingsStore::new("unused.json");
        settings.set_value(WINDOW_STATE_KEY, vec![1, 2, 3]);
        let mut host = LayoutHost::new();
        host.restore(&settings);
        assert_eq!(host, LayoutHost::new());
    }
}
