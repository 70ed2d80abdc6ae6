//! Chart Builder Module
//! Composes a declarative [`ChartSpec`] from a price table.

use crate::charts::spec::{
    ChartKind, ChartRow, ChartSpec, ChartStyle, Indicator, OhlcSeries, Trace, BLUE, CRIMSON,
    DEFAULT_ROW_HEIGHT_PX, ORANGE, PURPLE, SLATE, TEAL,
};
use crate::data::{PriceSchema, SchemaError, PRICE_COLUMNS, VOLUME_COLUMN};
use crate::indicators::{IndicatorCalculator, IndicatorError};
use polars::prelude::*;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ChartError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// Options for [`ChartBuilder::build_chart`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub title: String,
    pub style: ChartStyle,
    pub show_volume: bool,
    pub indicators: Vec<Indicator>,
    pub row_height_px: u32,
}

impl Default for ChartRequest {
    fn default() -> Self {
        Self {
            kind: ChartKind::Candlestick,
            title: "Financial Chart".to_string(),
            style: ChartStyle::Default,
            show_volume: false,
            indicators: Vec::new(),
            row_height_px: DEFAULT_ROW_HEIGHT_PX,
        }
    }
}

/// Traces contributed by one indicator.
struct IndicatorTraces {
    title: String,
    oscillator: bool,
    traces: Vec<Trace>,
}

/// Builds chart specifications; stateless.
pub struct ChartBuilder;

impl ChartBuilder {
    /// Compose the chart: price row, optional volume row, then one row per
    /// oscillator. Overlay indicators are drawn on the price row. A table
    /// without a volume column still gets the volume row, left empty.
    pub fn build_chart(df: &DataFrame, request: &ChartRequest) -> Result<ChartSpec, ChartError> {
        PriceSchema::validate(df, &PRICE_COLUMNS)?;

        let data = OhlcSeries {
            open: PriceSchema::numeric_column(df, "Open")?,
            high: PriceSchema::numeric_column(df, "High")?,
            low: PriceSchema::numeric_column(df, "Low")?,
            close: PriceSchema::numeric_column(df, "Close")?,
        };
        let price_trace = match request.kind {
            ChartKind::Candlestick => Trace::Candlestick {
                name: "Candlestick".to_string(),
                data,
            },
            ChartKind::Ohlc => Trace::Ohlc {
                name: "OHLC".to_string(),
                data,
            },
        };

        // Indicators are independent of each other.
        let computed = request
            .indicators
            .par_iter()
            .map(|indicator| Self::indicator_traces(df, indicator))
            .collect::<Result<Vec<_>, _>>()?;

        let mut price_row = ChartRow {
            title: request.title.clone(),
            traces: vec![price_trace],
        };
        let mut oscillator_rows = Vec::new();
        for indicator in computed {
            if indicator.oscillator {
                oscillator_rows.push(ChartRow {
                    title: indicator.title,
                    traces: indicator.traces,
                });
            } else {
                price_row.traces.extend(indicator.traces);
            }
        }

        let mut rows = vec![price_row];
        if request.show_volume {
            rows.push(Self::volume_row(df)?);
        }
        rows.extend(oscillator_rows);

        debug!(
            "Built chart '{}' with {} rows for {} bars",
            request.title,
            rows.len(),
            df.height()
        );

        Ok(ChartSpec {
            title: request.title.clone(),
            style: request.style,
            x_labels: PriceSchema::index_labels(df),
            rows,
            row_height_px: request.row_height_px,
            show_legend: true,
        })
    }

    fn volume_row(df: &DataFrame) -> Result<ChartRow, ChartError> {
        let mut row = ChartRow {
            title: "Volume".to_string(),
            traces: Vec::new(),
        };
        if df.column(VOLUME_COLUMN).is_err() {
            warn!("No '{}' column; volume row left empty", VOLUME_COLUMN);
            return Ok(row);
        }
        PriceSchema::validate(df, &[VOLUME_COLUMN])?;
        row.traces.push(Trace::Bar {
            name: "Volume".to_string(),
            values: PriceSchema::numeric_column(df, VOLUME_COLUMN)?,
            color: BLUE,
        });
        Ok(row)
    }

    fn indicator_traces(
        df: &DataFrame,
        indicator: &Indicator,
    ) -> Result<IndicatorTraces, ChartError> {
        let traces = match indicator {
            Indicator::Sma { window, column } => {
                let sma = IndicatorCalculator::compute_sma(df, *window, column)?;
                vec![Trace::Line {
                    name: "SMA".to_string(),
                    values: Self::series_values(&sma)?,
                    color: ORANGE,
                }]
            }
            Indicator::Rsi { window, column } => {
                let rsi = IndicatorCalculator::compute_rsi(df, *window, column)?;
                vec![Trace::Line {
                    name: "RSI".to_string(),
                    values: Self::series_values(&rsi)?,
                    color: PURPLE,
                }]
            }
            Indicator::Bollinger { window, num_std } => {
                let bands = IndicatorCalculator::bollinger_bands(df, *window, *num_std)?;
                vec![
                    Trace::Line {
                        name: format!("BB upper {}", window),
                        values: bands.upper,
                        color: SLATE,
                    },
                    Trace::Line {
                        name: format!("BB lower {}", window),
                        values: bands.lower,
                        color: SLATE,
                    },
                ]
            }
            Indicator::Macd { fast, slow, signal } => {
                let lines = IndicatorCalculator::macd_lines(df, *fast, *slow, *signal)?;
                vec![
                    Trace::Line {
                        name: "MACD".to_string(),
                        values: lines.macd,
                        color: TEAL,
                    },
                    Trace::Line {
                        name: "Signal".to_string(),
                        values: lines.signal,
                        color: CRIMSON,
                    },
                ]
            }
        };

        Ok(IndicatorTraces {
            title: indicator.to_string(),
            oscillator: indicator.is_oscillator(),
            traces,
        })
    }

    fn series_values(series: &Series) -> Result<Vec<Option<f64>>, ChartError> {
        let ca = series.f64().map_err(IndicatorError::from)?;
        Ok(ca.into_iter().collect())
    }
}
