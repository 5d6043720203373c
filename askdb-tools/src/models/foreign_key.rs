use serde::{Deserialize, Serialize};

/// One (local column, referenced column) pair of a foreign key constraint.
/// Composite keys are represented as several of these sharing a constraint name.
#[derive(Debug, Eq, PartialEq, Default, Clone, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    pub constraint_name: String,
    pub column_name: String,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

impl ForeignKeyInfo {
    pub fn referenced_table_full_name(&self) -> String {
        format!("{}.{}", self.referenced_schema, self.referenced_table)
    }
}
