use crate::models::check_constraint::CheckConstraintInfo;
use crate::models::column::ColumnInfo;
use crate::models::foreign_key::ForeignKeyInfo;
use crate::models::index::IndexInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Eq, PartialEq, Default, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub schema_name: String,
    pub table_name: String,
    /// In catalog declaration order.
    pub columns: Vec<ColumnInfo>,
    pub foreign_keys: Vec<ForeignKeyInfo>,
    pub indexes: Vec<IndexInfo>,
    pub check_constraints: Vec<CheckConstraintInfo>,
}

impl TableInfo {
    pub fn new(schema_name: &str, table_name: &str) -> Self {
        TableInfo {
            schema_name: schema_name.to_string(),
            table_name: table_name.to_string(),
            ..Default::default()
        }
    }

    pub fn full_name(&self) -> String {
        full_table_name(&self.schema_name, &self.table_name)
    }

    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.column_name.as_str())
            .collect()
    }

    pub fn foreign_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_foreign_key())
            .map(|c| c.column_name.as_str())
            .collect()
    }

    pub fn get_column(&self, column_name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.column_name == column_name)
    }

    /// The foreign key entry a column points at, if any.
    pub fn foreign_key_of(&self, column: &ColumnInfo) -> Option<&ForeignKeyInfo> {
        column
            .foreign_key_index
            .and_then(|idx| self.foreign_keys.get(idx))
    }

    pub fn get_foreign_key_for_column(&self, column_name: &str) -> Option<&ForeignKeyInfo> {
        self.get_column(column_name)
            .and_then(|c| self.foreign_key_of(c))
    }

    pub(crate) fn get_column_mut(&mut self, column_name: &str) -> Option<&mut ColumnInfo> {
        self.columns.iter_mut().find(|c| c.column_name == column_name)
    }

    /// Appends a foreign key and points the named local column at it. The key
    /// is kept even when the column is unknown.
    pub(crate) fn attach_foreign_key(&mut self, foreign_key: ForeignKeyInfo) {
        let idx = self.foreign_keys.len();
        let column_name = foreign_key.column_name.clone();
        self.foreign_keys.push(foreign_key);

        if let Some(column) = self.get_column_mut(&column_name) {
            column.foreign_key_index = Some(idx);
        }
    }
}

pub fn full_table_name(schema_name: &str, table_name: &str) -> String {
    format!("{}.{}", schema_name, table_name)
}
