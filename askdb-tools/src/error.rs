use thiserror::Error;

#[derive(Error, Debug)]
pub enum AskDbError {
    #[error("Failed to connect to postgres: `{0}`")]
    Connection(#[source] tokio_postgres::Error),

    #[error("Error from postgres: `{0}`")]
    PostgresError(#[from] tokio_postgres::Error),

    #[error("Error from postgres: `{query}` when executing query: `{source}`")]
    PostgresErrorWithQuery {
        query: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("Catalog row does not contain a column `{0}`")]
    CatalogColumnMissing(String),

    #[error("Catalog column `{column}` has a value of type `{actual}`, expected `{expected}`")]
    CatalogTypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Column `{column}` has postgres type `{type_name}` which cannot be read as a catalog value")]
    UnsupportedColumnType {
        column: String,
        type_name: String,
    },

    #[error("Invalid database configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid ssl mode '{0}'. Must be one of: disable, allow, prefer, require, verify-ca, verify-full")]
    InvalidSslMode(String),

    #[error("io error: `{0}`")]
    IoError(#[from] std::io::Error),

    #[error("json error: `{0}`")]
    JsonError(#[from] serde_json::Error),

    #[error("Cached schema is inconsistent: {0}")]
    CorruptSchemaCache(String),

    #[error("http error: `{0}`")]
    HttpError(#[from] reqwest::Error),

    #[error("SQL generation failed: {0}")]
    Generation(String),

    #[error("Environment variable `{0}` is not set")]
    MissingApiKey(&'static str),
}

pub type Result<T = ()> = std::result::Result<T, AskDbError>;
