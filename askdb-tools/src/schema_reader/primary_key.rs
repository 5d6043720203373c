use crate::catalog::{CatalogRow, FromCatalogRow};
use crate::schema_reader::define_catalog_query;

#[derive(Debug, Eq, PartialEq)]
pub struct PrimaryKeyColumnResult {
    pub table_schema: String,
    pub table_name: String,
    pub column_name: String,
}

impl FromCatalogRow for PrimaryKeyColumnResult {
    fn from_catalog_row(row: CatalogRow) -> crate::Result<Self> {
        Ok(PrimaryKeyColumnResult {
            table_schema: row.try_get(0)?,
            table_name: row.try_get(1)?,
            column_name: row.try_get(2)?,
        })
    }
}

// Not filtered by schema; rows for tables outside the extracted set are skipped.
//language=postgresql
define_catalog_query!(get_primary_key_columns, PRIMARY_KEY_COLUMNS_QUERY, PrimaryKeyColumnResult, r#"
select kc.table_schema::text,
       kc.table_name::text,
       kc.column_name::text
from information_schema.table_constraints tc
         join information_schema.key_column_usage kc
              on kc.constraint_name = tc.constraint_name
                  and kc.table_schema = tc.table_schema
                  and kc.table_name = tc.table_name
where tc.constraint_type = 'PRIMARY KEY'
order by kc.table_schema, kc.table_name, kc.ordinal_position;
"#);
