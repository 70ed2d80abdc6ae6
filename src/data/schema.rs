//! Price Table Schema Module
//! Column validation and numeric extraction for OHLC tables.

use polars::prelude::*;
use thiserror::Error;

/// Columns every price table must carry.
pub const PRICE_COLUMNS: [&str; 4] = ["Open", "High", "Low", "Close"];
pub const VOLUME_COLUMN: &str = "Volume";
pub const CLOSE_COLUMN: &str = "Close";

/// Candidate names for the time index, in priority order.
const INDEX_COLUMNS: [&str; 4] = ["Date", "Datetime", "Time", "Timestamp"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Input must be a table with at least one column")]
    NotTabular,
    #[error("Table must contain column '{0}'")]
    MissingColumn(String),
    #[error("Column '{0}' is not numeric")]
    NonNumeric(String),
}

/// Validates and reads price tables.
pub struct PriceSchema;

impl PriceSchema {
    /// Check that `df` is a table holding every column in `required`.
    ///
    /// Reports the first missing column in `required` order.
    pub fn validate(df: &DataFrame, required: &[&str]) -> Result<(), SchemaError> {
        if df.width() == 0 {
            return Err(SchemaError::NotTabular);
        }

        for name in required {
            let column = df
                .column(name)
                .map_err(|_| SchemaError::MissingColumn(name.to_string()))?;
            if !Self::is_numeric(column.dtype()) {
                return Err(SchemaError::NonNumeric(name.to_string()));
            }
        }
        Ok(())
    }

    fn is_numeric(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    /// Read a numeric column as `f64`; nulls and NaNs become `None`.
    pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, SchemaError> {
        Self::validate(df, &[name])?;
        let values = df
            .column(name)
            .and_then(|col| col.cast(&DataType::Float64))
            .map_err(|_| SchemaError::NonNumeric(name.to_string()))?;
        let ca = values
            .f64()
            .map_err(|_| SchemaError::NonNumeric(name.to_string()))?;

        Ok(ca
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    /// Rename columns matching the canonical price names case-insensitively
    /// (`close` -> `Close`, `VOLUME` -> `Volume`).
    pub fn normalize_columns(df: &mut DataFrame) -> PolarsResult<()> {
        let existing: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for canonical in PRICE_COLUMNS.iter().chain(std::iter::once(&VOLUME_COLUMN)) {
            if existing.iter().any(|name| name == canonical) {
                continue;
            }
            if let Some(found) = existing
                .iter()
                .find(|name| name.eq_ignore_ascii_case(canonical))
            {
                df.rename(found, (*canonical).into())?;
            }
        }
        Ok(())
    }

    /// Name of the time index column, if the table has one.
    pub fn index_column(df: &DataFrame) -> Option<String> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        INDEX_COLUMNS.iter().find_map(|candidate| {
            names
                .iter()
                .find(|name| name.eq_ignore_ascii_case(candidate))
                .cloned()
        })
    }

    /// X-axis labels: the index column rendered as text, or row numbers.
    pub fn index_labels(df: &DataFrame) -> Vec<String> {
        let Some(column) = Self::index_column(df).and_then(|name| df.column(&name).ok().cloned())
        else {
            return (0..df.height()).map(|i| i.to_string()).collect();
        };

        (0..df.height())
            .map(|i| {
                column
                    .get(i)
                    .map(|v| {
                        if v.is_null() {
                            String::new()
                        } else {
                            v.to_string().trim_matches('"').to_string()
                        }
                    })
                    .unwrap_or_default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ohlc() -> DataFrame {
        df!(
            "Date" => ["2024-01-01", "2024-01-02", "2024-01-03"],
            "Open" => [1.0, 2.0, 3.0],
            "High" => [1.5, 2.5, 3.5],
            "Low" => [0.5, 1.5, 2.5],
            "Close" => [1.2, 2.2, 3.2],
        )
        .unwrap()
    }

    #[test]
    fn validate_accepts_full_table() {
        assert!(PriceSchema::validate(&ohlc(), &PRICE_COLUMNS).is_ok());
    }

    #[test]
    fn validate_names_each_missing_column() {
        for missing in PRICE_COLUMNS {
            let df = ohlc().drop(missing).unwrap();
            assert_eq!(
                PriceSchema::validate(&df, &PRICE_COLUMNS),
                Err(SchemaError::MissingColumn(missing.to_string()))
            );
        }
    }

    #[test]
    fn validate_rejects_empty_frame() {
        assert_eq!(
            PriceSchema::validate(&DataFrame::empty(), &PRICE_COLUMNS),
            Err(SchemaError::NotTabular)
        );
    }

    #[test]
    fn validate_rejects_text_price_column() {
        let df = df!(
            "Open" => ["a", "b"],
            "High" => [1.0, 2.0],
            "Low" => [1.0, 2.0],
            "Close" => [1.0, 2.0],
        )
        .unwrap();
        assert_eq!(
            PriceSchema::validate(&df, &PRICE_COLUMNS),
            Err(SchemaError::NonNumeric("Open".to_string()))
        );
    }

    #[test]
    fn numeric_column_casts_integers() {
        let df = df!("Volume" => [10i64, 20, 30]).unwrap();
        assert_eq!(
            PriceSchema::numeric_column(&df, "Volume").unwrap(),
            vec![Some(10.0), Some(20.0), Some(30.0)]
        );
    }

    #[test]
    fn normalize_fixes_case() {
        let mut df = df!(
            "open" => [1.0],
            "HIGH" => [1.0],
            "low" => [1.0],
            "Close" => [1.0],
            "volume" => [5.0],
        )
        .unwrap();
        PriceSchema::normalize_columns(&mut df).unwrap();
        assert!(PriceSchema::validate(&df, &PRICE_COLUMNS).is_ok());
        assert!(PriceSchema::validate(&df, &[VOLUME_COLUMN]).is_ok());
    }

    #[test]
    fn labels_come_from_index_column() {
        assert_eq!(
            PriceSchema::index_labels(&ohlc()),
            vec!["2024-01-01", "2024-01-02", "2024-01-03"]
        );
        let df = ohlc().drop("Date").unwrap();
        assert_eq!(PriceSchema::index_labels(&df), vec!["0", "1", "2"]);
    }
}
