use crate::schema_reader::check_constraint::CheckConstraintResult;
use crate::schema_reader::foreign_key_column::ForeignKeyColumnResult;
use crate::schema_reader::index::IndexResult;
use crate::schema_reader::primary_key::PrimaryKeyColumnResult;
use crate::schema_reader::table_column::TableColumnResult;
use crate::{DatabaseSchema, TableInfo};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Counters collected while reconciling. Skipped rows are constraint rows for
/// tables the column pass never saw.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct ExtractionStats {
    pub tables: usize,
    pub columns: usize,
    pub primary_key_rows: usize,
    pub skipped_primary_key_rows: usize,
    pub foreign_key_rows: usize,
    pub skipped_foreign_key_rows: usize,
    pub skipped_index_rows: usize,
    pub skipped_check_constraint_rows: usize,
}

/// The working map of one extraction. Only handed out as a finished
/// [`DatabaseSchema`].
#[derive(Debug, Default)]
pub(crate) struct SchemaBuilder {
    tables: Vec<TableInfo>,
    /// Keyed by `(schema, table)`. Names may themselves contain dots.
    positions: HashMap<(String, String), usize>,
    stats: ExtractionStats,
}

impl SchemaBuilder {
    fn table_mut(&mut self, schema_name: &str, table_name: &str) -> Option<&mut TableInfo> {
        let position = *self
            .positions
            .get(&(schema_name.to_string(), table_name.to_string()))?;
        self.tables.get_mut(position)
    }

    fn get_or_create_table_mut(&mut self, schema_name: &str, table_name: &str) -> &mut TableInfo {
        let key = (schema_name.to_string(), table_name.to_string());

        let position = match self.positions.get(&key) {
            Some(position) => *position,
            None => {
                self.tables.push(TableInfo::new(schema_name, table_name));
                let position = self.tables.len() - 1;
                self.positions.insert(key, position);
                position
            }
        };

        &mut self.tables[position]
    }

    pub fn add_column(&mut self, row: TableColumnResult) {
        let table = self.get_or_create_table_mut(&row.table_schema, &row.table_name);
        table.columns.push(row.into_column_info());
        self.stats.columns += 1;
    }

    pub fn mark_primary_key(&mut self, row: &PrimaryKeyColumnResult) {
        let Some(table) = self.table_mut(&row.table_schema, &row.table_name) else {
            self.stats.skipped_primary_key_rows += 1;
            return;
        };

        if let Some(column) = table.get_column_mut(&row.column_name) {
            column.is_primary_key = true;
        }
        self.stats.primary_key_rows += 1;
    }

    pub fn add_foreign_key(&mut self, row: ForeignKeyColumnResult) {
        let Some(table) = self.table_mut(&row.table_schema, &row.table_name) else {
            self.stats.skipped_foreign_key_rows += 1;
            return;
        };

        table.attach_foreign_key(row.into_foreign_key_info());
        self.stats.foreign_key_rows += 1;
    }

    pub fn add_index(&mut self, row: IndexResult) {
        let Some(table) = self.table_mut(&row.table_schema, &row.table_name) else {
            self.stats.skipped_index_rows += 1;
            return;
        };

        table.indexes.push(row.into_index_info());
    }

    pub fn add_check_constraint(&mut self, row: CheckConstraintResult) {
        let Some(table) = self.table_mut(&row.table_schema, &row.table_name) else {
            self.stats.skipped_check_constraint_rows += 1;
            return;
        };

        table.check_constraints.push(row.into_check_constraint_info());
    }

    pub fn build(self, extracted_at: DateTime<Utc>) -> (DatabaseSchema, ExtractionStats) {
        let mut stats = self.stats;
        stats.tables = self.tables.len();
        (DatabaseSchema::new(self.tables, extracted_at), stats)
    }
}
