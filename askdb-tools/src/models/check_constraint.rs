use serde::{Deserialize, Serialize};

#[derive(Debug, Eq, PartialEq, Default, Clone, Serialize, Deserialize)]
pub struct CheckConstraintInfo {
    pub constraint_name: String,
    pub check_clause: String,
}
