use crate::export::LlmSchemaDocument;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

pub const EMBEDDING_CHUNKS_TEXT_FILE: &str = "embedding_chunks.txt";
pub const EMBEDDING_CHUNKS_JSONL_FILE: &str = "embedding_chunks.jsonl";
pub const EMBEDDING_METADATA_FILE: &str = "embedding_metadata.json";

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct EmbeddingMetadata {
    pub id: String,
    pub schema: String,
    pub table: String,
    pub columns: Vec<String>,
    pub synonyms: Vec<String>,
    pub ner_labels: Vec<String>,
    pub embedding_index: usize,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
struct EmbeddingChunkLine<'a> {
    id: usize,
    text: &'a str,
}

/// One text chunk per table, with metadata at the same position.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct EmbeddingSet {
    pub chunks: Vec<String>,
    pub metadata: Vec<EmbeddingMetadata>,
}

impl EmbeddingSet {
    pub fn from_document(document: &LlmSchemaDocument) -> Self {
        let mut set = EmbeddingSet::default();

        for (schema_name, schema) in &document.schemas {
            for (table_name, table) in &schema.tables {
                let columns: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();

                set.chunks.push(chunk_text(schema_name, table_name, &columns, &table.synonyms));
                set.metadata.push(EmbeddingMetadata {
                    id: format!("{}.{}", schema_name, table_name),
                    schema: schema_name.clone(),
                    table: table_name.clone(),
                    columns,
                    synonyms: table.synonyms.clone(),
                    ner_labels: vec![],
                    embedding_index: set.metadata.len(),
                });
            }
        }

        set
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn chunks_text(&self) -> String {
        self.chunks.iter().map(|c| format!("{}\n", c)).collect()
    }

    fn chunks_jsonl(&self) -> Result<String> {
        let mut out = String::new();
        for (id, text) in self.chunks.iter().enumerate() {
            out.push_str(&serde_json::to_string(&EmbeddingChunkLine { id, text })?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Writes the three embedding files into `directory`, creating it if needed.
    #[instrument(skip(self))]
    pub async fn write_to(&self, directory: &Path) -> Result {
        tokio::fs::create_dir_all(directory).await?;

        tokio::fs::write(directory.join(EMBEDDING_CHUNKS_TEXT_FILE), self.chunks_text()).await?;
        tokio::fs::write(directory.join(EMBEDDING_CHUNKS_JSONL_FILE), self.chunks_jsonl()?).await?;
        tokio::fs::write(
            directory.join(EMBEDDING_METADATA_FILE),
            serde_json::to_string_pretty(&self.metadata)?,
        )
        .await?;

        info!(chunks = self.len(), "Prepared embedding chunks and metadata");
        Ok(())
    }
}

fn chunk_text(schema_name: &str, table_name: &str, columns: &[String], synonyms: &[String]) -> String {
    let mut text = format!(
        "Schema: {}\nTable: {}\nColumns: {}",
        schema_name,
        table_name,
        columns.join(", ")
    );

    if !synonyms.is_empty() {
        text.push_str("\nSynonyms: ");
        text.push_str(&synonyms.join(", "));
    }

    text.trim().to_string()
}
