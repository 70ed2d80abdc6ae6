//! Data module - Price table loading and validation

mod loader;
mod schema;

pub use loader::PriceLoader;
pub use schema::{PriceSchema, SchemaError, CLOSE_COLUMN, PRICE_COLUMNS, VOLUME_COLUMN};
