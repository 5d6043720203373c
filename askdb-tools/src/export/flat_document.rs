use crate::{DatabaseSchema, TableInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A flat, fully-qualified-name keyed view of a schema. Meant for people
/// reading the export, not for the model.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct FlatSchemaDocument {
    pub extracted_at: DateTime<Utc>,
    pub tables: BTreeMap<String, FlatTable>,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct FlatTable {
    pub schema: String,
    pub table: String,
    pub columns: Vec<FlatColumn>,
    pub foreign_keys: Vec<FlatForeignKey>,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct FlatColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct FlatForeignKey {
    pub column: String,
    /// `schema.table(column)`
    pub references: String,
}

impl FlatSchemaDocument {
    pub fn from_schema(schema: &DatabaseSchema) -> Self {
        FlatSchemaDocument {
            extracted_at: schema.extracted_at,
            tables: schema
                .tables
                .iter()
                .map(|t| (t.full_name(), FlatTable::from_table(t)))
                .collect(),
        }
    }
}

impl FlatTable {
    fn from_table(table: &TableInfo) -> Self {
        FlatTable {
            schema: table.schema_name.clone(),
            table: table.table_name.clone(),
            columns: table
                .columns
                .iter()
                .map(|c| FlatColumn {
                    name: c.column_name.clone(),
                    data_type: c.data_type.clone(),
                    nullable: c.is_nullable,
                    default: c.column_default.clone(),
                    is_primary_key: c.is_primary_key,
                    is_foreign_key: c.is_foreign_key(),
                })
                .collect(),
            foreign_keys: table
                .foreign_keys
                .iter()
                .map(|fk| FlatForeignKey {
                    column: fk.column_name.clone(),
                    references: format!(
                        "{}({})",
                        fk.referenced_table_full_name(),
                        fk.referenced_column
                    ),
                })
                .collect(),
        }
    }
}
