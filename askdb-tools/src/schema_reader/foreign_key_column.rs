use crate::catalog::{CatalogRow, FromCatalogRow};
use crate::schema_reader::define_catalog_query;
use crate::ForeignKeyInfo;

/// One local/referenced column pair of a foreign key constraint.
#[derive(Debug, Eq, PartialEq)]
pub struct ForeignKeyColumnResult {
    pub constraint_name: String,
    pub table_schema: String,
    pub table_name: String,
    pub column_name: String,
    pub foreign_table_schema: String,
    pub foreign_table_name: String,
    pub foreign_column_name: String,
}

impl FromCatalogRow for ForeignKeyColumnResult {
    fn from_catalog_row(row: CatalogRow) -> crate::Result<Self> {
        Ok(ForeignKeyColumnResult {
            constraint_name: row.try_get(0)?,
            table_schema: row.try_get(1)?,
            table_name: row.try_get(2)?,
            column_name: row.try_get(3)?,
            foreign_table_schema: row.try_get(4)?,
            foreign_table_name: row.try_get(5)?,
            foreign_column_name: row.try_get(6)?,
        })
    }
}

impl ForeignKeyColumnResult {
    pub fn into_foreign_key_info(self) -> ForeignKeyInfo {
        ForeignKeyInfo {
            constraint_name: self.constraint_name,
            column_name: self.column_name,
            referenced_schema: self.foreign_table_schema,
            referenced_table: self.foreign_table_name,
            referenced_column: self.foreign_column_name,
        }
    }
}

// conkey and confkey are unnested side by side so a composite key yields one
// row per column pair, in key order.
//language=postgresql
define_catalog_query!(get_foreign_key_columns, FOREIGN_KEY_COLUMNS_QUERY, ForeignKeyColumnResult, r#"
select con.conname::text           as constraint_name,
       local_ns.nspname::text      as table_schema,
       local_table.relname::text   as table_name,
       local_attr.attname::text    as column_name,
       foreign_ns.nspname::text    as foreign_table_schema,
       foreign_table.relname::text as foreign_table_name,
       foreign_attr.attname::text  as foreign_column_name
from pg_catalog.pg_constraint con
         join pg_catalog.pg_class local_table on local_table.oid = con.conrelid
         join pg_catalog.pg_namespace local_ns on local_ns.oid = local_table.relnamespace
         join pg_catalog.pg_class foreign_table on foreign_table.oid = con.confrelid
         join pg_catalog.pg_namespace foreign_ns on foreign_ns.oid = foreign_table.relnamespace
         join unnest(con.conkey, con.confkey) with ordinality as cols (conkey, confkey, position) on true
         join pg_catalog.pg_attribute local_attr
              on local_attr.attrelid = con.conrelid and local_attr.attnum = cols.conkey
         join pg_catalog.pg_attribute foreign_attr
              on foreign_attr.attrelid = con.confrelid and foreign_attr.attnum = cols.confkey
where con.contype = 'f'
order by local_ns.nspname, local_table.relname, con.conname, cols.position;
"#);
