use crate::models::table::{full_table_name, TableInfo};
use crate::{AskDbError, Result};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Everything one extraction run discovered. Tables are kept in the order the
/// column pass first saw them.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub tables: Vec<TableInfo>,
    pub extracted_at: DateTime<Utc>,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub constraint_name: String,
}

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct RelatedTables {
    /// Tables the given table points at.
    pub references_to: Vec<String>,
    /// Tables pointing at the given table.
    pub referenced_by: Vec<String>,
}

impl DatabaseSchema {
    pub fn new(tables: Vec<TableInfo>, extracted_at: DateTime<Utc>) -> Self {
        DatabaseSchema {
            tables,
            extracted_at,
        }
    }

    pub fn get_table(&self, schema_name: &str, table_name: &str) -> Option<&TableInfo> {
        self.tables
            .iter()
            .find(|t| t.schema_name == schema_name && t.table_name == table_name)
    }

    pub fn get_table_by_full_name(&self, full_name: &str) -> Option<&TableInfo> {
        self.tables
            .iter()
            .find(|t| t.full_name() == full_name)
    }

    pub fn get_tables_in_schema(&self, schema_name: &str) -> Vec<&TableInfo> {
        self.tables
            .iter()
            .filter(|t| t.schema_name == schema_name)
            .collect()
    }

    pub fn schema_names(&self) -> Vec<&str> {
        self.tables
            .iter()
            .map(|t| t.schema_name.as_str())
            .unique()
            .collect()
    }

    /// One record per foreign key column pair across every table.
    pub fn relationships(&self) -> Vec<Relationship> {
        self.tables
            .iter()
            .flat_map(|table| {
                let from_table = table.full_name();
                table.foreign_keys.iter().map(move |fk| Relationship {
                    from_table: from_table.clone(),
                    from_column: fk.column_name.clone(),
                    to_table: fk.referenced_table_full_name(),
                    to_column: fk.referenced_column.clone(),
                    constraint_name: fk.constraint_name.clone(),
                })
            })
            .collect()
    }

    /// Splits every foreign key in the schema by whether `table_full_name` is the
    /// referencing or the referenced side. A self reference lands on both sides.
    pub fn related(&self, table_full_name: &str) -> RelatedTables {
        let mut references_to = vec![];
        let mut referenced_by = vec![];

        for table in &self.tables {
            let from_table = table.full_name();
            for fk in &table.foreign_keys {
                let to_table = fk.referenced_table_full_name();

                if from_table == table_full_name {
                    references_to.push(to_table.clone());
                }

                if to_table == table_full_name {
                    referenced_by.push(from_table.clone());
                }
            }
        }

        RelatedTables {
            references_to: references_to.into_iter().unique().collect(),
            referenced_by: referenced_by.into_iter().unique().collect(),
        }
    }

    pub fn related_to(&self, schema_name: &str, table_name: &str) -> RelatedTables {
        self.related(&full_table_name(schema_name, table_name))
    }

    /// Checks that every column's foreign key back-reference is in range and
    /// names the column it hangs off, and that table names are unique.
    pub fn validate(&self) -> Result {
        let duplicate = self
            .tables
            .iter()
            .map(|t| (t.schema_name.as_str(), t.table_name.as_str()))
            .duplicates()
            .next();

        if let Some((schema_name, table_name)) = duplicate {
            return Err(AskDbError::CorruptSchemaCache(format!(
                "table {} appears more than once",
                full_table_name(schema_name, table_name)
            )));
        }

        for table in &self.tables {
            for column in &table.columns {
                let Some(idx) = column.foreign_key_index else {
                    continue;
                };

                match table.foreign_keys.get(idx) {
                    Some(fk) if fk.column_name == column.column_name => {}
                    Some(fk) => {
                        return Err(AskDbError::CorruptSchemaCache(format!(
                            "column {}.{} points at foreign key {} which belongs to column {}",
                            table.full_name(),
                            column.column_name,
                            fk.constraint_name,
                            fk.column_name
                        )))
                    }
                    None => {
                        return Err(AskDbError::CorruptSchemaCache(format!(
                            "column {}.{} points at foreign key #{} but the table only has {}",
                            table.full_name(),
                            column.column_name,
                            idx,
                            table.foreign_keys.len()
                        )))
                    }
                }
            }
        }

        Ok(())
    }
}
