//! Docking arrangement model.
//!
//! An [`Arrangement`] records, for each edge of the main window, an ordered
//! list of tab groups laid out along one orientation. Every panel always owns
//! exactly one slot, including while it floats or is hidden; that slot is
//! where it returns when docked again.
//!
//! All primitives ([`Arrangement::dock`], [`Arrangement::tabify`],
//! [`Arrangement::split`]) are pure: they return a new arrangement. Presets
//! are ordered folds over these primitives, so their result depends on the
//! step order but never on hidden toolkit state.

use crate::layout::panel::PanelId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DockArea {
    Left,
    Right,
    Top,
    Bottom,
}

impl DockArea {
    pub const ALL: [DockArea; 4] = [
        DockArea::Left,
        DockArea::Right,
        DockArea::Top,
        DockArea::Bottom,
    ];

    /// Side areas stack vertically, top/bottom areas horizontally.
    pub fn default_orientation(self) -> Orientation {
        match self {
            DockArea::Left | DockArea::Right => Orientation::Vertical,
            DockArea::Top | DockArea::Bottom => Orientation::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Where a split places the moved panel relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

/// Panels sharing one screen region, selectable through a tab strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabGroup {
    panels: Vec<PanelId>,
    current: usize,
}

impl TabGroup {
    fn single(panel: PanelId) -> Self {
        Self {
            panels: vec![panel],
            current: 0,
        }
    }

    pub fn panels(&self) -> &[PanelId] {
        &self.panels
    }

    /// The raised tab.
    pub fn current(&self) -> Option<PanelId> {
        self.panels.get(self.current).copied()
    }

    pub fn contains(&self, panel: PanelId) -> bool {
        self.panels.contains(&panel)
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    fn remove(&mut self, panel: PanelId) {
        if let Some(pos) = self.panels.iter().position(|p| *p == panel) {
            self.panels.remove(pos);
            if pos < self.current || self.current >= self.panels.len() {
                self.current = self.current.saturating_sub(1);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaLayout {
    pub orientation: Orientation,
    pub groups: Vec<TabGroup>,
}

impl AreaLayout {
    fn empty(area: DockArea) -> Self {
        Self {
            orientation: area.default_orientation(),
            groups: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrangement {
    left: AreaLayout,
    right: AreaLayout,
    top: AreaLayout,
    bottom: AreaLayout,
}

impl Default for Arrangement {
    fn default() -> Self {
        Self::default_layout(&Self::empty())
    }
}

impl Arrangement {
    /// No panel placed anywhere. Only valid as a starting point for presets.
    pub fn empty() -> Self {
        Self {
            left: AreaLayout::empty(DockArea::Left),
            right: AreaLayout::empty(DockArea::Right),
            top: AreaLayout::empty(DockArea::Top),
            bottom: AreaLayout::empty(DockArea::Bottom),
        }
    }

    pub fn area(&self, area: DockArea) -> &AreaLayout {
        match area {
            DockArea::Left => &self.left,
            DockArea::Right => &self.right,
            DockArea::Top => &self.top,
            DockArea::Bottom => &self.bottom,
        }
    }

    fn area_mut(&mut self, area: DockArea) -> &mut AreaLayout {
        match area {
            DockArea::Left => &mut self.left,
            DockArea::Right => &mut self.right,
            DockArea::Top => &mut self.top,
            DockArea::Bottom => &mut self.bottom,
        }
    }

    /// Area and group index holding `panel`.
    pub fn locate(&self, panel: PanelId) -> Option<(DockArea, usize)> {
        DockArea::ALL.into_iter().find_map(|area| {
            self.area(area)
                .groups
                .iter()
                .position(|g| g.contains(panel))
                .map(|idx| (area, idx))
        })
    }

    pub fn group_of(&self, panel: PanelId) -> Option<&TabGroup> {
        self.locate(panel)
            .map(|(area, idx)| &self.area(area).groups[idx])
    }

    /// True when all six panels hold exactly one slot.
    pub fn is_complete(&self) -> bool {
        let mut seen: Vec<PanelId> = DockArea::ALL
            .into_iter()
            .flat_map(|area| self.area(area).groups.iter())
            .flat_map(|g| g.panels.iter().copied())
            .collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        total == PanelId::ALL.len() && seen == PanelId::ALL
    }

    fn detach(&mut self, panel: PanelId) {
        let Some((area, idx)) = self.locate(panel) else {
            return;
        };
        let layout = self.area_mut(area);
        layout.groups[idx].remove(panel);
        if layout.groups[idx].is_empty() {
            layout.groups.remove(idx);
        }
        if layout.groups.is_empty() {
            layout.orientation = area.default_orientation();
        }
    }

    /// Moves `panel` into its own group at the end of `area`.
    pub fn dock(&self, area: DockArea, panel: PanelId) -> Self {
        let mut next = self.clone();
        next.detach(panel);
        next.area_mut(area).groups.push(TabGroup::single(panel));
        next
    }

    /// Moves `panel` into the tab group of `anchor`, as its last tab.
    pub fn tabify(&self, anchor: PanelId, panel: PanelId) -> Self {
        if anchor == panel || self.locate(anchor).is_none() {
            return self.clone();
        }
        let mut next = self.clone();
        next.detach(panel);
        if let Some((area, idx)) = next.locate(anchor) {
            next.area_mut(area).groups[idx].panels.push(panel);
        }
        next
    }

    /// Splits the region of `anchor`'s group: `panel` gets a new group placed
    /// on `side` of it and the anchor's area takes `orientation`.
    pub fn split(
        &self,
        anchor: PanelId,
        panel: PanelId,
        orientation: Orientation,
        side: Side,
    ) -> Self {
        if anchor == panel || self.locate(anchor).is_none() {
            return self.clone();
        }
        let mut next = self.clone();
        next.detach(panel);
        if let Some((area, idx)) = next.locate(anchor) {
            let layout = next.area_mut(area);
            layout.orientation = orientation;
            let at = match side {
                Side::Before => idx,
                Side::After => idx + 1,
            };
            layout.groups.insert(at, TabGroup::single(panel));
        }
        next
    }

    /// Makes `panel` the current tab of its group.
    pub fn raise(&self, panel: PanelId) -> Self {
        let mut next = self.clone();
        if let Some((area, idx)) = next.locate(panel) {
            let group = &mut next.area_mut(area).groups[idx];
            if let Some(pos) = group.panels.iter().position(|p| *p == panel) {
                group.current = pos;
            }
        }
        next
    }

    /// A and B tabbed on the left with E stacked above them; D and C tabbed
    /// on the right with F stacked below them.
    pub fn default_layout(current: &Self) -> Self {
        use PanelId::*;
        current
            .dock(DockArea::Left, A)
            .dock(DockArea::Right, D)
            .tabify(A, B)
            .tabify(D, C)
            .dock(DockArea::Top, E)
            .dock(DockArea::Bottom, F)
            .split(A, E, Orientation::Vertical, Side::Before)
            .split(D, F, Orientation::Vertical, Side::After)
            .raise(A)
            .raise(D)
    }

    /// All six panels chained into one left-edge tab group, A first.
    pub fn tabbed_layout(current: &Self) -> Self {
        let first = PanelId::A;
        PanelId::ALL
            .into_iter()
            .skip(1)
            .fold(current.dock(DockArea::Left, first), |acc, panel| {
                acc.tabify(first, panel)
            })
            .raise(first)
    }

    /// A, B, C across the top edge and D, E, F across the bottom edge.
    pub fn grid_layout(current: &Self) -> Self {
        use PanelId::*;
        current
            .dock(DockArea::Top, A)
            .dock(DockArea::Top, B)
            .dock(DockArea::Top, C)
            .split(A, B, Orientation::Horizontal, Side::After)
            .split(B, C, Orientation::Horizontal, Side::After)
            .dock(DockArea::Bottom, D)
            .dock(DockArea::Bottom, E)
            .dock(DockArea::Bottom, F)
            .split(D, E, Orientation::Horizontal, Side::After)
            .split(E, F, Orientation::Horizontal, Side::After)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PanelId::*;

    fn group_panels(arr: &Arrangement, area: DockArea) -> Vec<Vec<PanelId>> {
        arr.area(area)
            .groups
            .iter()
            .map(|g| g.panels().to_vec())
            .collect()
    }

    #[test]
    fn default_layout_places_every_panel() {
        let arr = Arrangement::default();
        assert!(arr.is_complete());
        assert_eq!(group_panels(&arr, DockArea::Left), vec![vec![E], vec![A, B]]);
        assert_eq!(group_panels(&arr, DockArea::Right), vec![vec![D, C], vec![F]]);
        assert!(arr.area(DockArea::Top).is_empty());
        assert!(arr.area(DockArea::Bottom).is_empty());
        assert_eq!(arr.group_of(B).and_then(|g| g.current()), Some(A));
        assert_eq!(arr.group_of(C).and_then(|g| g.current()), Some(D));
    }

    #[test]
    fn tabbed_layout_is_single_group_in_order() {
        let arr = Arrangement::tabbed_layout(&Arrangement::default());
        assert!(arr.is_complete());
        assert_eq!(
            group_panels(&arr, DockArea::Left),
            vec![vec![A, B, C, D, E, F]]
        );
        for area in [DockArea::Right, DockArea::Top, DockArea::Bottom] {
            assert!(arr.area(area).is_empty());
        }
    }

    #[test]
    fn grid_layout_is_two_rows_of_three() {
        let arr = Arrangement::grid_layout(&Arrangement::default());
        assert!(arr.is_complete());
        assert_eq!(
            group_panels(&arr, DockArea::Top),
            vec![vec![A], vec![B], vec![C]]
        );
        assert_eq!(
            group_panels(&arr, DockArea::Bottom),
            vec![vec![D], vec![E], vec![F]]
        );
        assert_eq!(arr.area(DockArea::Top).orientation, Orientation::Horizontal);
        assert!(arr.area(DockArea::Left).is_empty());
    }

    #[test]
    fn default_layout_converges_from_any_preset() {
        let fresh = Arrangement::default();
        let from_grid = Arrangement::default_layout(&Arrangement::grid_layout(&fresh));
        let from_tabs = Arrangement::default_layout(&Arrangement::tabbed_layout(&fresh));
        assert_eq!(from_grid, fresh);
        assert_eq!(from_tabs, fresh);
    }

    #[test]
    fn primitives_are_order_sensitive() {
        let base = Arrangement::empty()
            .dock(DockArea::Left, A)
            .dock(DockArea::Left, B);
        let tab_then_split = base
            .tabify(A, C)
            .split(A, D, Orientation::Vertical, Side::After);
        let split_then_tab = base
            .split(A, D, Orientation::Vertical, Side::After)
            .tabify(D, C);
        assert_ne!(tab_then_split, split_then_tab);
    }

    #[test]
    fn removing_last_tab_drops_group_and_resets_orientation() {
        let arr = Arrangement::empty()
            .dock(DockArea::Top, A)
            .split(A, B, Orientation::Vertical, Side::After);
        assert_eq!(arr.area(DockArea::Top).orientation, Orientation::Vertical);
        let moved = arr.dock(DockArea::Left, A).dock(DockArea::Left, B);
        assert!(moved.area(DockArea::Top).is_empty());
        assert_eq!(moved.area(DockArea::Top).orientation, Orientation::Horizontal);
    }

    #[test]
    fn tabify_onto_self_is_noop() {
        let arr = Arrangement::default();
        assert_eq!(arr.tabify(A, A), arr);
        assert_eq!(arr.split(B, B, Orientation::Horizontal, Side::Before), arr);
    }

    #[test]
    fn raise_tracks_current_after_removal() {
        let arr = Arrangement::tabbed_layout(&Arrangement::empty()).raise(D);
        assert_eq!(arr.group_of(A).and_then(|g| g.current()), Some(D));
        let arr = arr.dock(DockArea::Right, B);
        assert_eq!(arr.group_of(A).and_then(|g| g.current()), Some(D));
    }
}
