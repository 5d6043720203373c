use serde::{Deserialize, Serialize};

#[derive(Debug, Eq, PartialEq, Default, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub column_name: String,
    pub ordinal_position: i32,
    pub data_type: String,
    pub is_nullable: bool,
    pub column_default: Option<String>,
    pub character_maximum_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
    pub is_primary_key: bool,
    /// Position of this column's foreign key in the owning table's
    /// `foreign_keys`. Resolve it through [`crate::TableInfo::foreign_key_of`].
    pub foreign_key_index: Option<usize>,
}

impl ColumnInfo {
    pub fn new(column_name: &str, data_type: &str) -> Self {
        ColumnInfo {
            column_name: column_name.to_string(),
            data_type: data_type.to_string(),
            is_nullable: true,
            ..Default::default()
        }
    }

    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key_index.is_some()
    }
}
