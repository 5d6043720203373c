use serde::{Deserialize, Serialize};

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct IndexInfo {
    pub index_name: String,
    pub is_unique: bool,
    pub is_primary: bool,
    /// Key columns in key order. Expression keys hold the expression text.
    pub columns: Vec<String>,
    pub index_type: String,
}

impl IndexInfo {
    pub const DEFAULT_INDEX_TYPE: &'static str = "btree";

    pub fn new(index_name: &str) -> Self {
        IndexInfo {
            index_name: index_name.to_string(),
            is_unique: false,
            is_primary: false,
            columns: vec![],
            index_type: Self::DEFAULT_INDEX_TYPE.to_string(),
        }
    }
}

impl Default for IndexInfo {
    fn default() -> Self {
        Self::new("")
    }
}
