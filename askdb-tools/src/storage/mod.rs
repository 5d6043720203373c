mod schema_cache;

pub use schema_cache::{load_schema, save_schema, DEFAULT_SCHEMA_CACHE_PATH};
