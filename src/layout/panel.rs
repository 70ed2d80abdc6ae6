//! Panel identity and per-panel state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default size of a panel when it is floated for the first time.
const FLOAT_WIDTH: f32 = 360.0;
const FLOAT_HEIGHT: f32 = 260.0;
const FLOAT_ORIGIN: f32 = 120.0;
const FLOAT_CASCADE: f32 = 30.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown panel: {0}")]
pub struct UnknownPanel(pub String);

/// The six panels hosted by the layout. The set is fixed for the lifetime
/// of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PanelId {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl PanelId {
    pub const ALL: [PanelId; 6] = [
        PanelId::A,
        PanelId::B,
        PanelId::C,
        PanelId::D,
        PanelId::E,
        PanelId::F,
    ];

    pub fn letter(self) -> char {
        match self {
            PanelId::A => 'A',
            PanelId::B => 'B',
            PanelId::C => 'C',
            PanelId::D => 'D',
            PanelId::E => 'E',
            PanelId::F => 'F',
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Title shown on the panel's title bar and in the Windows menu.
    pub fn title(self) -> String {
        format!("Window {}", self.letter())
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl FromStr for PanelId {
    type Err = UnknownPanel;

    /// Accepts either the bare letter (`"c"`) or the title (`"Window C"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let letter = trimmed
            .strip_prefix("Window ")
            .or_else(|| trimmed.strip_prefix("window "))
            .unwrap_or(trimmed);

        let mut chars = letter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => PanelId::ALL
                .into_iter()
                .find(|id| id.letter() == c.to_ascii_uppercase())
                .ok_or_else(|| UnknownPanel(s.to_string())),
            _ => Err(UnknownPanel(s.to_string())),
        }
    }
}

/// Screen rectangle of a floating panel or of the main window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Geometry {
    /// Cascaded default position so freshly floated panels don't stack.
    pub fn floating_default(panel: PanelId) -> Self {
        let offset = FLOAT_CASCADE * panel.index() as f32;
        Self {
            x: FLOAT_ORIGIN + offset,
            y: FLOAT_ORIGIN + offset,
            width: FLOAT_WIDTH,
            height: FLOAT_HEIGHT,
        }
    }
}

/// Main window geometry, persisted as the `geometry` blob.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub rect: Geometry,
    pub maximized: bool,
}

impl WindowGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            rect: Geometry {
                x: 0.0,
                y: 0.0,
                width,
                height,
            },
            maximized: false,
        }
    }
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self::new(1400.0, 900.0)
    }
}

/// Mutable per-panel flags. Placement lives in the arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    pub visible: bool,
    pub floating: bool,
    /// Last floating rectangle; kept while docked so re-floating restores it.
    pub geometry: Option<Geometry>,
    /// Cleared by "Lock Position": the panel ignores float/dock requests
    /// coming from direct interaction.
    pub movable: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            visible: true,
            floating: false,
            geometry: None,
            movable: true,
        }
    }
}

/// Observable state of a panel, derived from its flags and placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStatus {
    Docked,
    Tabbed,
    Floating,
    Hidden,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_letters_and_titles() {
        assert_eq!("a".parse::<PanelId>().unwrap(), PanelId::A);
        assert_eq!("Window F".parse::<PanelId>().unwrap(), PanelId::F);
        assert_eq!(" d ".parse::<PanelId>().unwrap(), PanelId::D);
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("G".parse::<PanelId>().is_err());
        assert!("Window AB".parse::<PanelId>().is_err());
        assert!("".parse::<PanelId>().is_err());
    }

    #[test]
    fn floating_defaults_cascade() {
        let a = Geometry::floating_default(PanelId::A);
        let b = Geometry::floating_default(PanelId::B);
        assert!(b.x > a.x && b.y > a.y);
        assert_eq!(a.width, b.width);
    }
}
