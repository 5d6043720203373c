use crate::{DatabaseSchema, Result};
use std::path::Path;
use tracing::{debug, instrument};

pub const DEFAULT_SCHEMA_CACHE_PATH: &str = "metadata/database_schema.json";

/// Writes the schema next to `path` first and renames it into place, so a
/// reader never sees a half written cache.
#[instrument(skip(schema))]
pub async fn save_schema(schema: &DatabaseSchema, path: &Path) -> Result {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bytes = serde_json::to_vec(schema)?;

    let mut temporary = path.as_os_str().to_owned();
    temporary.push(format!(".{}.tmp", uuid::Uuid::new_v4()));

    tokio::fs::write(&temporary, &bytes).await?;
    if let Err(e) = tokio::fs::rename(&temporary, path).await {
        let _ = tokio::fs::remove_file(&temporary).await;
        return Err(e.into());
    }

    debug!(bytes = bytes.len(), tables = schema.tables.len(), "Saved schema cache");
    Ok(())
}

#[instrument]
pub async fn load_schema(path: &Path) -> Result<DatabaseSchema> {
    let bytes = tokio::fs::read(path).await?;
    let schema: DatabaseSchema = serde_json::from_slice(&bytes)?;
    schema.validate()?;

    debug!(tables = schema.tables.len(), "Loaded schema cache");
    Ok(schema)
}
