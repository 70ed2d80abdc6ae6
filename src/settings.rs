//! Persistent key/value settings store.
//!
//! Values are opaque byte blobs, kept in a JSON document as hex strings under
//! `<config_dir>/<organization>/<application>/settings.json`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Settings value '{key}' is not valid hex: {source}")]
    Hex {
        key: String,
        source: hex::FromHexError,
    },
    #[error("No user configuration directory available")]
    NoConfigDir,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsDocument {
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// Settings namespaced by organization and application identifiers.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    values: BTreeMap<String, Vec<u8>>,
}

impl SettingsStore {
    /// Empty store that will be written to `path` on [`SettingsStore::sync`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: BTreeMap::new(),
        }
    }

    /// Settings file location for an organization/application pair.
    pub fn default_path(organization: &str, application: &str) -> Result<PathBuf, SettingsError> {
        let config_dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(config_dir
            .join(organization)
            .join(application)
            .join(SETTINGS_FILE))
    }

    /// Open the store for an organization/application pair.
    pub fn open(organization: &str, application: &str) -> Result<Self, SettingsError> {
        Self::at_path(Self::default_path(organization, application)?)
    }

    /// Load settings from `path`. A missing file yields an empty store.
    pub fn at_path(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings file at {:?}, starting empty", path);
                return Ok(Self::new(path));
            }
            Err(e) => return Err(e.into()),
        };

        let document: SettingsDocument = serde_json::from_str(&content)?;
        let values = document
            .values
            .into_iter()
            .map(|(key, encoded)| match hex::decode(&encoded) {
                Ok(bytes) => Ok((key, bytes)),
                Err(source) => Err(SettingsError::Hex { key, source }),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        info!("Loaded {} settings from {:?}", values.len(), path);
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn value(&self, key: &str) -> Option<&[u8]> {
        self.values.get(key).map(Vec::as_slice)
    }

    pub fn set_value(&mut self, key: &str, value: Vec<u8>) {
        self.values.insert(key.to_string(), value);
    }

    /// Write all values to disk, creating parent directories as needed.
    pub fn sync(&self) -> Result<(), SettingsError> {
        let document = SettingsDocument {
            values: self
                .values
                .iter()
                .map(|(k, v)| (k.clone(), hex::encode(v)))
                .collect(),
        };
        let json = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)?;
        info!("Saved settings to {:?}", self.path);
        Ok(())
    }
}
