//! Layout module - Dockable panel host and layout persistence

mod arrangement;
mod host;
mod panel;
mod snapshot;

pub use arrangement::{DockArea, Orientation};
pub use host::{LayoutAction, LayoutHost};
pub use panel::{Geometry, PanelId, WindowGeometry};
pub use snapshot::{GEOMETRY_KEY, LAYOUT_EXTENSION};
