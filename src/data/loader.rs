//! Price Data Loader Module
//! Loads OHLC price tables from CSV using Polars.

use crate::data::schema::{PriceSchema, SchemaError, PRICE_COLUMNS};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Invalid price table: {0}")]
    Schema(#[from] SchemaError),
    #[error("No data loaded")]
    NoData,
}

/// Holds the currently loaded price table.
pub struct PriceLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
}

impl Default for PriceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
        }
    }

    /// Read a CSV file into a validated price table.
    ///
    /// Column names are normalized so `close`/`CLOSE` are accepted as `Close`.
    pub fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let mut df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        PriceSchema::normalize_columns(&mut df)?;
        PriceSchema::validate(&df, &PRICE_COLUMNS)?;
        if df.height() == 0 {
            return Err(LoaderError::NoData);
        }

        info!("Loaded {} rows from {:?}", df.height(), path);
        Ok(df)
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Set DataFrame directly (used for async loading)
    pub fn set_dataframe(&mut self, df: DataFrame, path: PathBuf) {
        self.df = Some(df);
        self.file_path = Some(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_and_normalizes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(
            &path,
            "date,open,high,low,close,volume\n\
             2024-01-01,1,2,0.5,1.5,100\n\
             2024-01-02,1.5,2.5,1,2,150\n",
        )
        .unwrap();

        let df = PriceLoader::read_csv(&path).unwrap();
        assert_eq!(df.height(), 2);
        let columns: Vec<String> = df.get_column_names().iter().map(|c| c.to_string()).collect();
        assert!(columns.contains(&"Close".to_string()));
        assert!(columns.contains(&"Volume".to_string()));

        let mut loader = PriceLoader::new();
        loader.set_dataframe(df, path.clone());
        assert_eq!(loader.get_row_count(), 2);
        assert_eq!(loader.get_file_path(), Some(&path));
    }

    #[test]
    fn missing_price_column_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "Open,High,Low\n1,2,0.5\n").unwrap();

        let err = PriceLoader::read_csv(&path).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Schema(SchemaError::MissingColumn(ref c)) if c == "Close"
        ));
    }
}
