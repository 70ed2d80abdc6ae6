//! Indicators module - Rolling and exponentially weighted price indicators

mod calculator;
pub mod rolling;

pub use calculator::{
    IndicatorCalculator, IndicatorError, DEFAULT_BOLLINGER_STD, DEFAULT_BOLLINGER_WINDOW,
    DEFAULT_MACD_FAST, DEFAULT_MACD_SIGNAL, DEFAULT_MACD_SLOW, DEFAULT_RSI_WINDOW,
    DEFAULT_SMA_WINDOW,
};
