
pub mod catalog;
mod config;
mod error;
mod execution;
mod export;
mod generation;
mod models;
mod postgres_client_wrapper;
mod schema_reader;
mod storage;

pub use catalog::{CatalogQueryExecutor, CatalogRow, CatalogValue};
pub use config::*;
pub use error::*;
pub use execution::*;
pub use export::*;
pub use generation::*;
pub use models::*;
pub use postgres_client_wrapper::PostgresClientWrapper;
pub use schema_reader::{extract_from_config, ExtractionOptions, ExtractionStats, SchemaReader};
pub use storage::*;
