//! Application configuration.
//!
//! Loaded from JSON with every field optional; missing fields take defaults.

use crate::charts::{ChartKind, ChartRequest, ChartStyle, Indicator, DEFAULT_ROW_HEIGHT_PX};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Namespace of the settings store.
    pub organization: String,
    pub application: String,
    pub window: WindowConfig,
    pub chart: ChartConfig,
    /// Default `tracing` filter; `RUST_LOG` takes precedence.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            organization: "MyCompany".to_string(),
            application: "DockingSystem".to_string(),
            window: WindowConfig::default(),
            chart: ChartConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

/// Main window configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub min_width: f32,
    pub min_height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Dockable Window System".to_string(),
            width: 1400.0,
            height: 900.0,
            min_width: 800.0,
            min_height: 600.0,
        }
    }
}

/// Initial chart options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub title: String,
    pub kind: ChartKind,
    pub style: ChartStyle,
    pub show_volume: bool,
    /// Indicator short names: `sma`, `rsi`, `bollinger`, `macd`.
    pub indicators: Vec<String>,
    pub row_height_px: u32,
    /// Width of exported PNG images.
    pub export_width_px: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Financial Chart".to_string(),
            kind: ChartKind::Candlestick,
            style: ChartStyle::Default,
            show_volume: true,
            indicators: vec!["sma".to_string(), "rsi".to_string()],
            row_height_px: DEFAULT_ROW_HEIGHT_PX,
            export_width_px: 1200,
        }
    }
}

impl ChartConfig {
    /// Chart request with these defaults. Unknown indicator names are skipped.
    pub fn chart_request(&self) -> ChartRequest {
        let indicators = self
            .indicators
            .iter()
            .filter_map(|name| match name.parse::<Indicator>() {
                Ok(indicator) => Some(indicator),
                Err(e) => {
                    warn!("Ignoring configured indicator: {}", e);
                    None
                }
            })
            .collect();

        ChartRequest {
            kind: self.kind,
            title: self.title.clone(),
            style: self.style,
            show_volume: self.show_volume,
            indicators,
            row_height_px: self.row_height_px,
        }
    }
}

impl ChartConfig {
    /// Take over the options of `request`, keeping the export width.
    pub fn update_from_request(&mut self, request: &ChartRequest) {
        self.title = request.title.clone();
        self.kind = request.kind;
        self.style = request.style;
        self.show_volume = request.show_volume;
        self.indicators = request
            .indicators
            .iter()
            .map(|i| i.short_name().to_string())
            .collect();
        self.row_height_px = request.row_height_px;
    }
}

impl AppConfig {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from default locations.
    ///
    /// Searches in order:
    /// 1. `./config.json`
    /// 2. `<config_dir>/MyCompany/DockingSystem/config.json`
    ///
    /// Returns default config if no file found.
    pub fn load_default() -> Self {
        match Self::load(CONFIG_FILE) {
            Ok(config) => return config,
            Err(ConfigError::Parse(e)) => warn!("Ignoring invalid {}: {}", CONFIG_FILE, e),
            Err(ConfigError::Io(_)) => {}
        }

        let defaults = Self::default();
        if let Some(path) = defaults.user_config_path() {
            match Self::load(&path) {
                Ok(config) => return config,
                Err(ConfigError::Parse(e)) => warn!("Ignoring invalid config {:?}: {}", path, e),
                Err(ConfigError::Io(_)) => {}
            }
        }

        defaults
    }

    /// Save configuration to a file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `<config_dir>/<organization>/<application>/config.json`
    pub fn user_config_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(&self.organization)
                .join(&self.application)
                .join(CONFIG_FILE)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"chart": {"style": "night", "indicators": ["bb"]}, "log_filter": "debug"}"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.organization, "MyCompany");
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.chart.style, ChartStyle::Night);
        assert_eq!(config.chart.kind, ChartKind::Candlestick);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn unknown_style_keeps_rest_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"chart": {"style": "solarized", "show_volume": false}, "log_filter": "debug"}"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.chart.style, ChartStyle::Default);
        assert!(!config.chart.show_volume);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = AppConfig::default();
        config.chart.kind = ChartKind::Ohlc;
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn chart_options_saved_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let request = ChartRequest {
            kind: ChartKind::Ohlc,
            style: ChartStyle::Yahoo,
            show_volume: false,
            indicators: vec![Indicator::bollinger(), Indicator::rsi()],
            ..ChartRequest::default()
        };

        let mut config = AppConfig::default();
        config.chart.update_from_request(&request);
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.chart.indicators, vec!["bollinger", "rsi"]);
        assert_eq!(loaded.chart.chart_request(), request);
    }

    #[test]
    fn chart_request_skips_unknown_indicators() {
        let chart = ChartConfig {
            indicators: vec!["rsi".into(), "vwap".into(), "macd".into()],
            ..ChartConfig::default()
        };
        let request = chart.chart_request();
        assert_eq!(request.indicators, vec![Indicator::rsi(), Indicator::macd()]);
        assert!(request.show_volume);
    }
}
