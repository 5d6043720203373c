use askdb_tools::{AskDbError, DatabaseConfig, Result, SslMode, DEFAULT_SCHEMA_CACHE_PATH};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub const ENV_FILE: &str = ".env";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about)]
#[command(propagate_version = true)]
/// Describes a Postgres database to a language model and turns questions into SQL.
///
/// `extract` reads the catalog into a cache file. The other commands work from
/// that cache or from the documents derived from it.
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Where the extracted schema is cached between runs
    #[arg(long, global = true, default_value = DEFAULT_SCHEMA_CACHE_PATH)]
    pub cache: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Read tables, columns and keys from the database catalog into the cache
    Extract {
        #[command(flatten)]
        db_args: DbArgs,

        /// Only extract these schemas. Can be repeated. Defaults to every non-system schema
        #[arg(long = "schema")]
        schemas: Vec<String>,

        /// Also read indexes
        #[arg(long)]
        include_indexes: bool,

        /// Also read check constraints
        #[arg(long)]
        include_check_constraints: bool,
    },
    /// Write the cached schema as the nested document given to the language model
    Format {
        #[arg(long, default_value = "data/llm_schema.json")]
        output: PathBuf,
    },
    /// Write the cached schema as a flat document keyed by table name
    Export {
        #[arg(long, default_value = "metadata/schema.json")]
        output: PathBuf,
    },
    /// Print foreign key relationships, for every table or one `schema.table`
    Relationships {
        table: Option<String>,
    },
    /// Prepare per-table text chunks and metadata for an embedding index
    Embeddings {
        /// The document written by `format`
        #[arg(long, default_value = "data/llm_schema.json")]
        schema_document: PathBuf,

        #[arg(long, default_value = "data")]
        output_dir: PathBuf,
    },
    /// Generate SQL for a question, and optionally run it
    Ask {
        question: String,

        /// The document written by `format`
        #[arg(long, default_value = "data/llm_schema.json")]
        schema_document: PathBuf,

        /// The OpenRouter model to use
        #[arg(long, default_value = askdb_tools::DEFAULT_MODEL)]
        model: String,

        /// Run the generated SQL against the database. Nothing stops destructive statements
        #[arg(long)]
        execute: bool,

        #[command(flatten)]
        db_args: DbArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// The host of the database
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// The port of the database
    #[arg(long, env = "DB_PORT", default_value_t = DatabaseConfig::DEFAULT_PORT)]
    pub db_port: u16,

    /// The name of the database
    #[arg(long, env = "DB_NAME", default_value = "")]
    pub db_name: String,

    /// The username to connect with
    #[arg(long, env = "DB_USER", default_value = "")]
    pub db_user: String,

    /// The password to connect with
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    /// One of disable, allow or prefer. The TLS-only modes are rejected
    #[arg(long, env = "DB_SSL_MODE", default_value = "prefer")]
    pub db_ssl_mode: SslMode,
}

impl DbArgs {
    pub(crate) fn to_config(&self) -> DatabaseConfig {
        let mut config = DatabaseConfig::new(&self.db_host, &self.db_name, &self.db_user, &self.db_password);
        config.port = self.db_port;
        config.ssl_mode = self.db_ssl_mode;
        config
    }
}

/// Loads `KEY=value` lines from `path` into the process environment so the
/// `DB_*` arguments can pick them up. Variables that are already set win, and
/// a missing file is not an error.
pub(crate) fn load_env_file(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(AskDbError::InvalidConfig(format!(
            "could not read {}: {}",
            path.display(),
            e
        ))),
    }
}
