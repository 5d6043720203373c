use crate::catalog::{CatalogRow, FromCatalogRow};
use crate::schema_reader::define_catalog_query;
use crate::ColumnInfo;

#[derive(Debug, Eq, PartialEq)]
pub struct TableColumnResult {
    pub table_schema: String,
    pub table_name: String,
    pub column_name: String,
    pub ordinal_position: i32,
    pub data_type: String,
    pub is_nullable: bool,
    pub column_default: Option<String>,
    pub character_maximum_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
}

impl FromCatalogRow for TableColumnResult {
    fn from_catalog_row(row: CatalogRow) -> crate::Result<Self> {
        Ok(TableColumnResult {
            table_schema: row.try_get(0)?,
            table_name: row.try_get(1)?,
            column_name: row.try_get(2)?,
            ordinal_position: row.try_get(3)?,
            data_type: row.try_get(4)?,
            is_nullable: row.try_get(5)?,
            column_default: row.try_get(6)?,
            character_maximum_length: row.try_get(7)?,
            numeric_precision: row.try_get(8)?,
            numeric_scale: row.try_get(9)?,
        })
    }
}

impl TableColumnResult {
    pub fn into_column_info(self) -> ColumnInfo {
        ColumnInfo {
            column_name: self.column_name,
            ordinal_position: self.ordinal_position,
            data_type: self.data_type,
            is_nullable: self.is_nullable,
            column_default: self.column_default,
            character_maximum_length: self.character_maximum_length,
            numeric_precision: self.numeric_precision,
            numeric_scale: self.numeric_scale,
            is_primary_key: false,
            foreign_key_index: None,
        }
    }
}

// $1 is a text[] of schema names, or null for every non-system schema.
//language=postgresql
define_catalog_query!(get_columns, COLUMNS_QUERY, TableColumnResult, r#"
select t.table_schema::text,
       t.table_name::text,
       c.column_name::text,
       c.ordinal_position::int4,
       c.data_type::text,
       c.is_nullable = 'YES'             as is_nullable,
       c.column_default::text,
       c.character_maximum_length::int4,
       c.numeric_precision::int4,
       c.numeric_scale::int4
from information_schema.tables t
         join information_schema.columns c
              on t.table_schema = c.table_schema
                  and t.table_name = c.table_name
where t.table_type = 'BASE TABLE'
  and t.table_schema not in ('information_schema', 'pg_catalog')
  and ($1::text[] is null or t.table_schema::text = any ($1::text[]))
order by t.table_schema, t.table_name, c.ordinal_position;
"#);
