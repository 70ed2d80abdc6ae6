//! Charts module - Chart composition and rendering

mod builder;
mod plotter;
mod renderer;
mod spec;

pub use builder::{ChartBuilder, ChartRequest};
pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;
pub use spec::{ChartKind, ChartSpec, ChartStyle, Indicator, DEFAULT_ROW_HEIGHT_PX};
