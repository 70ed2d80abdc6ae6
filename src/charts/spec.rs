//! Declarative chart description produced by the chart builder and consumed
//! by the renderers.

use crate::indicators::{
    DEFAULT_BOLLINGER_STD, DEFAULT_BOLLINGER_WINDOW, DEFAULT_MACD_FAST, DEFAULT_MACD_SIGNAL,
    DEFAULT_MACD_SLOW, DEFAULT_RSI_WINDOW, DEFAULT_SMA_WINDOW,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Fixed canvas height contributed by each row.
pub const DEFAULT_ROW_HEIGHT_PX: u32 = 300;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown chart type '{0}' (expected 'candle' or 'ohlc')")]
    ChartKind(String),
    #[error("Unknown indicator '{0}'")]
    Indicator(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const ORANGE: Rgb = Rgb(255, 165, 0);
pub const PURPLE: Rgb = Rgb(128, 0, 128);
pub const BLUE: Rgb = Rgb(0, 0, 255);
pub const TEAL: Rgb = Rgb(0, 128, 128);
pub const CRIMSON: Rgb = Rgb(220, 20, 60);
pub const SLATE: Rgb = Rgb(112, 128, 144);
pub const RISING: Rgb = Rgb(38, 166, 91);
pub const FALLING: Rgb = Rgb(231, 76, 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    #[serde(rename = "candle")]
    Candlestick,
    Ohlc,
}

impl FromStr for ChartKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "candle" | "candlestick" => Ok(ChartKind::Candlestick),
            "ohlc" => Ok(ChartKind::Ohlc),
            _ => Err(ParseError::ChartKind(s.to_string())),
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Candlestick => write!(f, "Candlestick"),
            ChartKind::Ohlc => write!(f, "OHLC"),
        }
    }
}

/// Visual theme of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartStyle {
    #[default]
    Default,
    Yahoo,
    Night,
}

/// Read through [`ChartStyle::from_name`] so an unknown name in a config
/// file falls back instead of rejecting the whole file.
impl<'de> Deserialize<'de> for ChartStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        let style = ChartStyle::from_name(&name);
        if style.name() != name.trim().to_ascii_lowercase() {
            warn!("Unknown chart style '{}', using '{}'", name, style.name());
        }
        Ok(style)
    }
}

/// Colors a renderer applies for a [`ChartStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylePalette {
    pub background: Rgb,
    pub grid: Rgb,
    pub text: Rgb,
    pub dark: bool,
}

impl ChartStyle {
    pub const ALL: [ChartStyle; 3] = [ChartStyle::Default, ChartStyle::Yahoo, ChartStyle::Night];

    /// Unknown names fall back to the default style.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "yahoo" => ChartStyle::Yahoo,
            "night" => ChartStyle::Night,
            _ => ChartStyle::Default,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChartStyle::Default => "default",
            ChartStyle::Yahoo => "yahoo",
            ChartStyle::Night => "night",
        }
    }

    pub fn palette(self) -> StylePalette {
        match self {
            ChartStyle::Yahoo => StylePalette {
                background: Rgb(255, 255, 255),
                grid: Rgb(211, 211, 211),
                text: Rgb(40, 40, 40),
                dark: false,
            },
            ChartStyle::Night => StylePalette {
                background: Rgb(0, 0, 0),
                grid: Rgb(128, 128, 128),
                text: Rgb(230, 230, 230),
                dark: true,
            },
            ChartStyle::Default => StylePalette {
                background: Rgb(229, 236, 246),
                grid: Rgb(255, 255, 255),
                text: Rgb(42, 63, 95),
                dark: false,
            },
        }
    }
}

/// Indicator requested on a chart, with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Indicator {
    Sma { window: usize, column: String },
    Rsi { window: usize, column: String },
    Bollinger { window: usize, num_std: f64 },
    Macd { fast: usize, slow: usize, signal: usize },
}

impl Indicator {
    pub fn sma() -> Self {
        Indicator::Sma {
            window: DEFAULT_SMA_WINDOW,
            column: "Close".to_string(),
        }
    }

    pub fn rsi() -> Self {
        Indicator::Rsi {
            window: DEFAULT_RSI_WINDOW,
            column: "Close".to_string(),
        }
    }

    pub fn bollinger() -> Self {
        Indicator::Bollinger {
            window: DEFAULT_BOLLINGER_WINDOW,
            num_std: DEFAULT_BOLLINGER_STD,
        }
    }

    pub fn macd() -> Self {
        Indicator::Macd {
            fast: DEFAULT_MACD_FAST,
            slow: DEFAULT_MACD_SLOW,
            signal: DEFAULT_MACD_SIGNAL,
        }
    }

    /// Short name accepted by [`Indicator::from_str`].
    pub fn short_name(&self) -> &'static str {
        match self {
            Indicator::Sma { .. } => "sma",
            Indicator::Rsi { .. } => "rsi",
            Indicator::Bollinger { .. } => "bollinger",
            Indicator::Macd { .. } => "macd",
        }
    }

    /// Oscillators get their own row; everything else overlays the price row.
    pub fn is_oscillator(&self) -> bool {
        matches!(self, Indicator::Rsi { .. })
    }
}

impl FromStr for Indicator {
    type Err = ParseError;

    /// Parses the short names used in configuration (`sma`, `rsi`,
    /// `bollinger`/`bb`, `macd`) with default parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sma" => Ok(Indicator::sma()),
            "rsi" => Ok(Indicator::rsi()),
            "bollinger" | "bb" => Ok(Indicator::bollinger()),
            "macd" => Ok(Indicator::macd()),
            _ => Err(ParseError::Indicator(s.to_string())),
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indicator::Sma { window, .. } => write!(f, "SMA({})", window),
            Indicator::Rsi { window, .. } => write!(f, "RSI({})", window),
            Indicator::Bollinger { window, num_std } => write!(f, "BB({}, {})", window, num_std),
            Indicator::Macd { fast, slow, signal } => {
                write!(f, "MACD({}, {}, {})", fast, slow, signal)
            }
        }
    }
}

/// Contiguous runs of defined values as `[row, value]` points.
pub fn defined_segments(values: &[Option<f64>]) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();

    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) => current.push([i as f64, *v]),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Open/high/low/close columns of a price trace.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcSeries {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
}

impl OhlcSeries {
    /// Rows where all four prices are present, as `(row, o, h, l, c)`.
    pub fn bars(&self) -> impl Iterator<Item = (usize, f64, f64, f64, f64)> + '_ {
        (0..self.close.len()).filter_map(move |i| {
            Some((
                i,
                self.open[i]?,
                self.high[i]?,
                self.low[i]?,
                self.close[i]?,
            ))
        })
    }
}

/// A single drawable series.
#[derive(Debug, Clone, PartialEq)]
pub enum Trace {
    Candlestick { name: String, data: OhlcSeries },
    Ohlc { name: String, data: OhlcSeries },
    Bar { name: String, values: Vec<Option<f64>>, color: Rgb },
    Line { name: String, values: Vec<Option<f64>>, color: Rgb },
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Trace::Candlestick { name, .. }
            | Trace::Ohlc { name, .. }
            | Trace::Bar { name, .. }
            | Trace::Line { name, .. } => name,
        }
    }

    /// Min and max of all defined values, if any.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let values: Box<dyn Iterator<Item = f64> + '_> = match self {
            Trace::Candlestick { data, .. } | Trace::Ohlc { data, .. } => {
                Box::new(data.bars().flat_map(|(_, _, h, l, _)| [h, l]))
            }
            Trace::Bar { values, .. } => {
                Box::new(values.iter().flatten().copied().chain(std::iter::once(0.0)))
            }
            Trace::Line { values, .. } => Box::new(values.iter().flatten().copied()),
        };
        values.fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// One horizontal band of the chart sharing the x axis with the others.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub title: String,
    pub traces: Vec<Trace>,
}

impl ChartRow {
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.traces
            .iter()
            .filter_map(Trace::value_range)
            .reduce(|(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)))
    }
}

/// Complete chart request handed to a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub style: ChartStyle,
    pub x_labels: Vec<String>,
    pub rows: Vec<ChartRow>,
    pub row_height_px: u32,
    pub show_legend: bool,
}

impl ChartSpec {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Total canvas height: a fixed number of pixels per row.
    pub fn height_px(&self) -> u32 {
        self.row_height_px * self.rows.len() as u32
    }
}
