use crate::cli::{Commands, DbArgs};
use askdb_tools::{
    execute_with_config, extract_from_config, load_schema, save_schema, EmbeddingSet,
    ExtractionOptions, FlatSchemaDocument, GeneratedSql, LlmSchemaDocument, OpenRouterGenerator,
    Result, SqlGenerator, REFUSAL_SENTENCE,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::load_env_file(Path::new(cli::ENV_FILE))?;

    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    run(cli).await?;

    Ok(())
}

#[instrument(skip_all)]
async fn run(cli: cli::Cli) -> Result<()> {
    match cli.command {
        Commands::Extract {
            db_args,
            schemas,
            include_indexes,
            include_check_constraints,
        } => {
            let options = ExtractionOptions {
                schemas: (!schemas.is_empty()).then(|| schemas.into_iter().collect()),
                include_indexes,
                include_check_constraints,
            };
            do_extract(db_args, options, &cli.cache).await?;
        }
        Commands::Format { output } => {
            let schema = load_schema(&cli.cache).await?;
            let document = LlmSchemaDocument::from_schema(&schema);
            write_file(&output, document.to_json_pretty()?).await?;
            info!(tables = document.table_count(), "LLM-ready schema saved to {}", output.display());
        }
        Commands::Export { output } => {
            let schema = load_schema(&cli.cache).await?;
            let document = FlatSchemaDocument::from_schema(&schema);
            write_file(&output, serde_json::to_string_pretty(&document)?).await?;
            info!("Exported schema to {}", output.display());
        }
        Commands::Relationships { table } => {
            let schema = load_schema(&cli.cache).await?;
            let json = match table {
                Some(table) => serde_json::to_string_pretty(&schema.related(&table))?,
                None => serde_json::to_string_pretty(&schema.relationships())?,
            };
            println!("{}", json);
        }
        Commands::Embeddings {
            schema_document,
            output_dir,
        } => {
            let document = read_llm_document(&schema_document).await?;
            EmbeddingSet::from_document(&document).write_to(&output_dir).await?;
        }
        Commands::Ask {
            question,
            schema_document,
            model,
            execute,
            db_args,
        } => {
            do_ask(question, schema_document, model, execute, db_args).await?;
        }
    }

    Ok(())
}

#[instrument(skip_all)]
async fn do_extract(db_args: DbArgs, options: ExtractionOptions, cache: &Path) -> Result<()> {
    let config = db_args.to_config();

    let (schema, stats) = extract_from_config(&config, &options).await?;
    save_schema(&schema, cache).await?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    info!("Schema cached at {}", cache.display());

    Ok(())
}

#[instrument(skip_all)]
async fn do_ask(
    question: String,
    schema_document: PathBuf,
    model: String,
    execute: bool,
    db_args: DbArgs,
) -> Result<()> {
    let document = read_llm_document(&schema_document).await?;
    let generator = OpenRouterGenerator::from_env()?.with_model(&model);

    let sql = match generator.generate_sql(&question, &document).await? {
        GeneratedSql::Sql(sql) => sql,
        GeneratedSql::Refused => {
            println!("{}", REFUSAL_SENTENCE);
            return Ok(());
        }
    };

    println!("{}", sql);

    if execute {
        let rows = execute_with_config(&db_args.to_config(), &sql).await?;
        println!("{}", serde_json::to_string_pretty(&rows)?);
    }

    Ok(())
}

async fn read_llm_document(path: &Path) -> Result<LlmSchemaDocument> {
    let json = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&json)?)
}

async fn write_file(path: &Path, contents: String) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}
