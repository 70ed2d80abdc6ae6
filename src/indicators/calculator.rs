//! Indicator Calculator Module
//! Technical indicators computed over price table columns.

use crate::data::{PriceSchema, SchemaError, CLOSE_COLUMN};
use crate::indicators::rolling;
use polars::prelude::*;
use thiserror::Error;

pub const DEFAULT_SMA_WINDOW: usize = 20;
pub const DEFAULT_RSI_WINDOW: usize = 14;
pub const DEFAULT_BOLLINGER_WINDOW: usize = 20;
pub const DEFAULT_BOLLINGER_STD: f64 = 2.0;
pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;

pub const MACD_COLUMN: &str = "MACD";
pub const SIGNAL_COLUMN: &str = "Signal";

#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Window length must be at least 1")]
    InvalidWindow,
}

/// Output of Bollinger band computation, one value per row.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// MACD line and its signal line, one value per row.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

pub fn bollinger_upper_column(window: usize) -> String {
    format!("BB_upper_{}", window)
}

pub fn bollinger_lower_column(window: usize) -> String {
    format!("BB_lower_{}", window)
}

/// Computes indicator series from price tables.
pub struct IndicatorCalculator;

impl IndicatorCalculator {
    fn check_window(window: usize) -> Result<(), IndicatorError> {
        if window == 0 {
            return Err(IndicatorError::InvalidWindow);
        }
        Ok(())
    }

    /// Simple moving average of `column`.
    pub fn compute_sma(
        df: &DataFrame,
        window: usize,
        column: &str,
    ) -> Result<Series, IndicatorError> {
        Self::check_window(window)?;
        let values = PriceSchema::numeric_column(df, column)?;
        let sma = rolling::rolling_mean(&values, window);
        Ok(Series::new(format!("SMA_{}", window).into(), sma))
    }

    /// Relative strength index of `column`, in [0, 100].
    pub fn compute_rsi(
        df: &DataFrame,
        window: usize,
        column: &str,
    ) -> Result<Series, IndicatorError> {
        Self::check_window(window)?;
        let values = PriceSchema::numeric_column(df, column)?;
        let rsi = rolling::rsi(&values, window);
        Ok(Series::new(format!("RSI_{}", window).into(), rsi))
    }

    /// Bands at `num_std` sample standard deviations around the rolling mean
    /// of `Close`.
    pub fn bollinger_bands(
        df: &DataFrame,
        window: usize,
        num_std: f64,
    ) -> Result<BollingerBands, IndicatorError> {
        Self::check_window(window)?;
        let close = PriceSchema::numeric_column(df, CLOSE_COLUMN)?;
        let mean = rolling::rolling_mean(&close, window);
        let std = rolling::rolling_std(&close, window);

        let band = |sign: f64| -> Vec<Option<f64>> {
            mean.iter()
                .zip(&std)
                .map(|(m, s)| Some((*m)? + sign * num_std * (*s)?))
                .collect()
        };

        Ok(BollingerBands {
            upper: band(1.0),
            lower: band(-1.0),
        })
    }

    /// Adds `BB_upper_{window}` and `BB_lower_{window}` columns to `df`.
    pub fn compute_bollinger_bands(
        df: &mut DataFrame,
        window: usize,
        num_std: f64,
    ) -> Result<(), IndicatorError> {
        let bands = Self::bollinger_bands(df, window, num_std)?;
        df.with_column(Series::new(
            bollinger_upper_column(window).into(),
            bands.upper,
        ))?;
        df.with_column(Series::new(
            bollinger_lower_column(window).into(),
            bands.lower,
        ))?;
        Ok(())
    }

    /// Fast EWM minus slow EWM of `Close`, and the EWM of that difference.
    pub fn macd_lines(
        df: &DataFrame,
        fast: usize,
        slow: usize,
        signal: usize,
    ) -> Result<MacdLines, IndicatorError> {
        for span in [fast, slow, signal] {
            Self::check_window(span)?;
        }
        let close = PriceSchema::numeric_column(df, CLOSE_COLUMN)?;
        let macd = rolling::subtract(
            &rolling::ewm_mean(&close, fast),
            &rolling::ewm_mean(&close, slow),
        );
        let signal = rolling::ewm_mean(&macd, signal);
        Ok(MacdLines { macd, signal })
    }

    /// Adds `MACD` and `Signal` columns to `df`.
    pub fn compute_macd(
        df: &mut DataFrame,
        fast: usize,
        slow: usize,
        signal: usize,
    ) -> Result<(), IndicatorError> {
        let lines = Self::macd_lines(df, fast, slow, signal)?;
        df.with_column(Series::new(MACD_COLUMN.into(), lines.macd))?;
        df.with_column(Series::new(SIGNAL_COLUMN.into(), lines.signal))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closes(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn prices(n: usize) -> DataFrame {
        let close: Vec<f64> = (0..n)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1)
            .collect();
        df!(
            "Open" => close.clone(),
            "High" => close.iter().map(|c| c + 1.0).collect::<Vec<_>>(),
            "Low" => close.iter().map(|c| c - 1.0).collect::<Vec<_>>(),
            "Close" => close,
        )
        .unwrap()
    }

    #[test]
    fn sma_default_window() {
        let df = prices(40);
        let sma = IndicatorCalculator::compute_sma(&df, DEFAULT_SMA_WINDOW, "Close").unwrap();
        let values: Vec<Option<f64>> = sma.f64().unwrap().into_iter().collect();
        let close = closes(&df, "Close");

        assert_eq!(sma.len(), 40);
        assert_eq!(values.iter().filter(|v| v.is_none()).count(), 19);
        for i in 19..40 {
            let expected: f64 =
                close[i - 19..=i].iter().map(|v| v.unwrap()).sum::<f64>() / 20.0;
            assert!((values[i].unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn sma_missing_column() {
        let df = prices(5);
        let err = IndicatorCalculator::compute_sma(&df, 3, "Adj Close").unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::Schema(SchemaError::MissingColumn(ref c)) if c == "Adj Close"
        ));
    }

    #[test]
    fn zero_window_rejected() {
        let df = prices(5);
        assert!(matches!(
            IndicatorCalculator::compute_rsi(&df, 0, "Close"),
            Err(IndicatorError::InvalidWindow)
        ));
    }

    #[test]
    fn rsi_stays_in_range() {
        let df = prices(60);
        let rsi = IndicatorCalculator::compute_rsi(&df, DEFAULT_RSI_WINDOW, "Close").unwrap();
        let values: Vec<Option<f64>> = rsi.f64().unwrap().into_iter().collect();
        assert!(values[..13].iter().all(Option::is_none));
        for v in values[13..].iter() {
            let v = v.unwrap();
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn bollinger_adds_named_columns() {
        let mut df = prices(30);
        IndicatorCalculator::compute_bollinger_bands(&mut df, 20, 2.0).unwrap();
        let upper = closes(&df, "BB_upper_20");
        let lower = closes(&df, "BB_lower_20");
        assert_eq!(upper.iter().filter(|v| v.is_none()).count(), 19);
        for (u, l) in upper.iter().zip(&lower).skip(19) {
            assert!(u.unwrap() > l.unwrap());
        }
    }

    #[test]
    fn bollinger_band_width_is_symmetric() {
        let df = prices(25);
        let bands = IndicatorCalculator::bollinger_bands(&df, 5, 2.0).unwrap();
        let mean = rolling::rolling_mean(&closes(&df, "Close"), 5);
        for i in 4..25 {
            let up = bands.upper[i].unwrap() - mean[i].unwrap();
            let down = mean[i].unwrap() - bands.lower[i].unwrap();
            assert!((up - down).abs() < 1e-9);
        }
    }

    #[test]
    fn macd_adds_columns() {
        let mut df = prices(50);
        IndicatorCalculator::compute_macd(
            &mut df,
            DEFAULT_MACD_FAST,
            DEFAULT_MACD_SLOW,
            DEFAULT_MACD_SIGNAL,
        )
        .unwrap();
        let macd = closes(&df, MACD_COLUMN);
        let signal = closes(&df, SIGNAL_COLUMN);
        assert!(macd.iter().all(Option::is_some));
        assert!(signal.iter().all(Option::is_some));
        // Both EWMs start at the first close.
        assert!(macd[0].unwrap().abs() < 1e-12);
    }
}
