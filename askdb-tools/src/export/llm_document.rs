use crate::{ColumnInfo, DatabaseSchema, TableInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The nested schema → table → columns document handed to the language model.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct LlmSchemaDocument {
    pub schemas: BTreeMap<String, LlmSchemaEntry>,
}

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct LlmSchemaEntry {
    pub tables: BTreeMap<String, LlmTable>,
}

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct LlmTable {
    pub columns: Vec<LlmColumn>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct LlmColumn {
    pub name: String,
    pub data_type: String,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub references: Option<LlmReference>,
    /// Always empty for now. Reserved for later annotation.
    #[serde(default)]
    pub synonyms: Vec<String>,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct LlmReference {
    pub schema: String,
    pub table: String,
    pub column: String,
}

impl LlmSchemaDocument {
    pub fn from_schema(schema: &DatabaseSchema) -> Self {
        let mut schemas: BTreeMap<String, LlmSchemaEntry> = BTreeMap::new();

        for table in &schema.tables {
            schemas
                .entry(table.schema_name.clone())
                .or_default()
                .tables
                .insert(table.table_name.clone(), LlmTable::from_table(table));
        }

        LlmSchemaDocument { schemas }
    }

    pub fn table_count(&self) -> usize {
        self.schemas.values().map(|s| s.tables.len()).sum()
    }

    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl LlmTable {
    fn from_table(table: &TableInfo) -> Self {
        LlmTable {
            columns: table
                .columns
                .iter()
                .map(|c| LlmColumn::from_column(table, c))
                .collect(),
            synonyms: vec![],
        }
    }
}

impl LlmColumn {
    fn from_column(table: &TableInfo, column: &ColumnInfo) -> Self {
        let references = table.foreign_key_of(column).map(|fk| LlmReference {
            schema: fk.referenced_schema.clone(),
            table: fk.referenced_table.clone(),
            column: fk.referenced_column.clone(),
        });

        LlmColumn {
            name: column.column_name.clone(),
            data_type: column.data_type.clone(),
            is_primary_key: column.is_primary_key,
            is_foreign_key: column.is_foreign_key(),
            references,
            synonyms: vec![],
        }
    }
}
